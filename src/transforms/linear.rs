//! Composition and decomposition of linear transform matrices.
//!
//! Matrices are in data (row, column) axis order, so a 2-D rotation by a
//! positive angle is the usual counter-clockwise matrix with both axes
//! reversed.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, ShapesError};

/// Rotation component of a linear transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Rotation {
    /// A single 2-D rotation angle.
    Angle(f64),
    /// Three angles for a 3-D rotation, applied as yaw, pitch, roll.
    Euler([f64; 3]),
    /// A full n-D rotation matrix.
    Matrix(DMatrix<f64>),
}

/// Shear component of a linear transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Shear {
    /// Shear of the first axis along the last one.
    Scalar(f64),
    /// Strictly upper triangular entries in row-major order.
    UpperTriangular(Vec<f64>),
    /// A full n-D shear matrix.
    Matrix(DMatrix<f64>),
}

fn rotation_2d(theta: f64) -> DMatrix<f64> {
    let (s, c) = theta.sin_cos();
    // counter-clockwise rotation with both axes reversed
    DMatrix::from_row_slice(2, 2, &[c, s, -s, c])
}

fn rotation_3d(alpha: f64, beta: f64, gamma: f64) -> DMatrix<f64> {
    let (sa, ca) = alpha.sin_cos();
    let (sb, cb) = beta.sin_cos();
    let (sg, cg) = gamma.sin_cos();
    let r_alpha = DMatrix::from_row_slice(3, 3, &[ca, sa, 0.0, -sa, ca, 0.0, 0.0, 0.0, 1.0]);
    let r_beta = DMatrix::from_row_slice(3, 3, &[cb, 0.0, sb, 0.0, 1.0, 0.0, -sb, 0.0, cb]);
    let r_gamma = DMatrix::from_row_slice(3, 3, &[1.0, 0.0, 0.0, 0.0, cg, -sg, 0.0, sg, cg]);
    reverse_axes(&(r_alpha * r_beta * r_gamma))
}

fn reverse_axes(m: &DMatrix<f64>) -> DMatrix<f64> {
    let (r, c) = m.shape();
    DMatrix::from_fn(r, c, |i, j| m[(r - 1 - i, c - 1 - j)])
}

/// Compose a linear matrix as `rotation * scale * shear`.
///
/// Components of lower dimensionality are embedded in the trailing block of
/// an identity matrix of the largest dimensionality.
pub fn compose_linear_matrix(
    rotation: &Rotation,
    scale: &[f64],
    shear: &Shear,
    degrees: bool,
) -> Result<DMatrix<f64>> {
    let to_rad = |a: f64| if degrees { a.to_radians() } else { a };

    let rotation_mat = match rotation {
        Rotation::Angle(theta) => rotation_2d(to_rad(*theta)),
        Rotation::Euler([a, b, g]) => rotation_3d(to_rad(*a), to_rad(*b), to_rad(*g)),
        Rotation::Matrix(m) => m.clone(),
    };
    let scale_mat = DMatrix::from_diagonal(&DVector::from_column_slice(scale));

    let shear_mat = match shear {
        Shear::Scalar(k) => {
            let n = scale_mat.nrows().max(rotation_mat.nrows());
            let mut m = DMatrix::identity(n, n);
            if n > 1 {
                m[(0, n - 1)] = *k;
            }
            m
        }
        Shear::UpperTriangular(values) if values.len() == 1 => {
            let n = scale_mat.nrows().max(rotation_mat.nrows());
            let mut m = DMatrix::identity(n, n);
            if n > 1 {
                m[(0, n - 1)] = values[0];
            }
            m
        }
        Shear::UpperTriangular(values) => expand_upper_triangular(values)?,
        Shear::Matrix(m) => m.clone(),
    };

    let ndim = scale_mat
        .nrows()
        .max(rotation_mat.nrows())
        .max(shear_mat.nrows());
    let full_rotation = embed_in_identity_matrix(&rotation_mat, ndim)?;
    let full_scale = embed_in_identity_matrix(&scale_mat, ndim)?;
    let full_shear = embed_in_identity_matrix(&shear_mat, ndim)?;
    Ok(full_rotation * full_scale * full_shear)
}

/// Expand strictly upper triangular entries into a unit upper triangular matrix.
pub fn expand_upper_triangular(values: &[f64]) -> Result<DMatrix<f64>> {
    let m = values.len();
    // m = n (n - 1) / 2
    let n = ((1.0 + (8.0 * m as f64 + 1.0).sqrt()) / 2.0).round() as usize;
    if n * (n - 1) / 2 != m {
        return Err(ShapesError::invalid_transform(format!(
            "{} is a strange number of shear elements",
            m
        )));
    }
    let mut out = DMatrix::identity(n, n);
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            out[(i, j)] = values[k];
            k += 1;
        }
    }
    Ok(out)
}

/// Embed an `M x M` matrix in the trailing block of an `N x N` identity.
pub fn embed_in_identity_matrix(matrix: &DMatrix<f64>, ndim: usize) -> Result<DMatrix<f64>> {
    let (r, c) = matrix.shape();
    if r != c {
        return Err(ShapesError::invalid_transform(format!(
            "improper transform matrix of shape {}x{}",
            r, c
        )));
    }
    if r > ndim {
        return Err(ShapesError::DimensionMismatch {
            expected: ndim,
            found: r,
        });
    }
    if r == ndim {
        return Ok(matrix.clone());
    }
    let mut full = DMatrix::identity(ndim, ndim);
    full.view_mut((ndim - r, ndim - r), (r, r)).copy_from(matrix);
    Ok(full)
}

/// Decomposed parts of a linear matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearParts {
    pub rotation: DMatrix<f64>,
    pub scale: DVector<f64>,
    /// Strictly upper triangular shear entries, row-major.
    pub shear: Vec<f64>,
}

/// Decompose a linear matrix into rotation, scale and shear.
///
/// Uses `upper = cholesky(MᵀM)ᵀ`, `scale = diag(upper)` and
/// `rotation = M · upper⁻¹`. When the rotation would be improper the sign of
/// `scale[0]` is flipped. The split between a negative scale and a rotation is
/// not unique; only the recomposed matrix is guaranteed to match.
pub fn decompose_linear_matrix(matrix: &DMatrix<f64>) -> Result<LinearParts> {
    let (n, c) = matrix.shape();
    if n != c {
        return Err(ShapesError::invalid_transform("matrix must be square"));
    }

    let gram = matrix.transpose() * matrix;
    let cholesky = gram.cholesky().ok_or(ShapesError::NotPositiveDefinite)?;
    let mut upper = cholesky.l().transpose();
    let mut scale = upper.diagonal();

    let normalized = DMatrix::from_fn(n, n, |i, j| upper[(i, j)] / scale[i]);

    let mut rotation = matrix * upper.clone().try_inverse().ok_or(ShapesError::SingularMatrix)?;
    if rotation.determinant() < 0.0 {
        scale[0] *= -1.0;
        for j in 0..n {
            upper[(0, j)] = -upper[(0, j)];
        }
        rotation = matrix * upper.try_inverse().ok_or(ShapesError::SingularMatrix)?;
    }

    let mut shear = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            shear.push(normalized[(i, j)]);
        }
    }

    Ok(LinearParts {
        rotation,
        scale,
        shear,
    })
}

/// Scale factors of a linear matrix (diagonal of its Cholesky factor).
pub fn linear_scale(matrix: &DMatrix<f64>) -> Result<DVector<f64>> {
    let gram = matrix.transpose() * matrix;
    let cholesky = gram.cholesky().ok_or(ShapesError::NotPositiveDefinite)?;
    Ok(cholesky.l().transpose().diagonal())
}
