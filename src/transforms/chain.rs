//! Coordinate transforms between data and world space.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::linear::{
    Rotation, Shear, compose_linear_matrix, decompose_linear_matrix, linear_scale,
};
use crate::error::{Result, ShapesError};

/// An affine transform `x -> a · x + b`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl Affine {
    /// Create an affine transform, checking that the parts agree in size.
    pub fn new(a: DMatrix<f64>, b: DVector<f64>) -> Result<Self> {
        if !a.is_square() {
            return Err(ShapesError::invalid_transform("linear part must be square"));
        }
        if a.nrows() != b.len() {
            return Err(ShapesError::DimensionMismatch {
                expected: a.nrows(),
                found: b.len(),
            });
        }
        Ok(Self { a, b })
    }

    pub fn identity(ndim: usize) -> Self {
        Self {
            a: DMatrix::identity(ndim, ndim),
            b: DVector::zeros(ndim),
        }
    }

    /// Build from rotation, scale, shear and translation parts.
    pub fn from_parts(
        rotation: &Rotation,
        scale: &[f64],
        shear: &Shear,
        translate: &[f64],
    ) -> Result<Self> {
        let a = compose_linear_matrix(rotation, scale, shear, true)?;
        let n = a.nrows().max(translate.len());
        let a = super::linear::embed_in_identity_matrix(&a, n)?;
        Self::new(a, DVector::from_vec(pad_vector(translate, n, 0.0)))
    }

    /// Build from an `(N + 1) x (N + 1)` augmented matrix.
    pub fn from_augmented(m: &DMatrix<f64>) -> Result<Self> {
        let (r, c) = m.shape();
        if r != c || r == 0 {
            return Err(ShapesError::invalid_transform(
                "augmented matrix must be square",
            ));
        }
        let n = r - 1;
        Self::new(
            m.view((0, 0), (n, n)).into_owned(),
            DVector::from_fn(n, |i, _| m[(i, n)]),
        )
    }

    pub fn ndim(&self) -> usize {
        self.b.len()
    }

    /// The `(N + 1) x (N + 1)` augmented matrix.
    pub fn augmented(&self) -> DMatrix<f64> {
        let n = self.ndim();
        let mut m = DMatrix::identity(n + 1, n + 1);
        m.view_mut((0, 0), (n, n)).copy_from(&self.a);
        m.view_mut((0, n), (n, 1)).copy_from(&self.b);
        m
    }

    /// `self ∘ other`: applies `other` first.
    pub fn compose(&self, other: &Affine) -> Result<Affine> {
        let n = self.ndim().max(other.ndim());
        let lhs = self.padded(n);
        let rhs = other.padded(n);
        Affine::new(&lhs.a * &rhs.a, &lhs.a * &rhs.b + &lhs.b)
    }

    pub fn inverse(&self) -> Result<Affine> {
        let a_inv = self
            .a
            .clone()
            .try_inverse()
            .ok_or(ShapesError::SingularMatrix)?;
        let b_inv = -(&a_inv * &self.b);
        Affine::new(a_inv, b_inv)
    }

    /// Scale factors of the linear part.
    pub fn scale(&self) -> Result<DVector<f64>> {
        linear_scale(&self.a)
    }

    /// Replace the scale factors while keeping rotation and shear.
    pub fn set_scale(&mut self, scale: &[f64]) -> Result<()> {
        if scale.len() != self.ndim() {
            return Err(ShapesError::DimensionMismatch {
                expected: self.ndim(),
                found: scale.len(),
            });
        }
        let parts = decompose_linear_matrix(&self.a)?;
        self.a = compose_linear_matrix(
            &Rotation::Matrix(parts.rotation),
            scale,
            &Shear::UpperTriangular(parts.shear),
            true,
        )?;
        Ok(())
    }

    fn padded(&self, ndim: usize) -> Affine {
        let n = self.ndim();
        if ndim <= n {
            return self.clone();
        }
        let pad = ndim - n;
        let mut a = DMatrix::identity(ndim, ndim);
        a.view_mut((pad, pad), (n, n)).copy_from(&self.a);
        let mut b = DVector::zeros(ndim);
        b.rows_mut(pad, n).copy_from(&self.b);
        Affine { a, b }
    }

    fn sliced(&self, axes: &[usize]) -> Result<Affine> {
        check_axes(axes, self.ndim())?;
        let k = axes.len();
        let a = DMatrix::from_fn(k, k, |i, j| self.a[(axes[i], axes[j])]);
        let b = DVector::from_fn(k, |i, _| self.b[axes[i]]);
        Ok(Affine { a, b })
    }
}

/// A transform of world coordinates.
///
/// Translations and scales shorter than the coordinates they are applied to
/// act on the trailing axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Identity,
    Translate(Vec<f64>),
    Scale(Vec<f64>),
    Affine(Affine),
}

impl Transform {
    pub fn ndim(&self) -> usize {
        match self {
            Transform::Identity => 0,
            Transform::Translate(t) => t.len(),
            Transform::Scale(s) => s.len(),
            Transform::Affine(affine) => affine.ndim(),
        }
    }

    /// Map a coordinate through the transform.
    pub fn map(&self, coords: &[f64]) -> Result<Vec<f64>> {
        let n = coords.len();
        if self.ndim() > n {
            return Err(ShapesError::DimensionMismatch {
                expected: self.ndim(),
                found: n,
            });
        }
        Ok(match self {
            Transform::Identity => coords.to_vec(),
            Transform::Translate(t) => {
                let t = pad_vector(t, n, 0.0);
                coords.iter().zip(t.iter()).map(|(c, t)| c + t).collect()
            }
            Transform::Scale(s) => {
                let s = pad_vector(s, n, 1.0);
                coords.iter().zip(s.iter()).map(|(c, s)| c * s).collect()
            }
            Transform::Affine(affine) => {
                let affine = affine.padded(n);
                let x = DVector::from_column_slice(coords);
                (&affine.a * x + &affine.b).iter().copied().collect()
            }
        })
    }

    pub fn inverse(&self) -> Result<Transform> {
        Ok(match self {
            Transform::Identity => Transform::Identity,
            Transform::Translate(t) => Transform::Translate(t.iter().map(|v| -v).collect()),
            Transform::Scale(s) => {
                if s.iter().any(|v| *v == 0.0) {
                    return Err(ShapesError::SingularMatrix);
                }
                Transform::Scale(s.iter().map(|v| 1.0 / v).collect())
            }
            Transform::Affine(affine) => Transform::Affine(affine.inverse()?),
        })
    }

    /// Restrict the transform to a subset of axes.
    pub fn set_slice(&self, axes: &[usize]) -> Result<Transform> {
        Ok(match self {
            Transform::Identity => Transform::Identity,
            Transform::Translate(t) => Transform::Translate(pick_axes(t, axes)?),
            Transform::Scale(s) => Transform::Scale(pick_axes(s, axes)?),
            Transform::Affine(affine) => Transform::Affine(affine.sliced(axes)?),
        })
    }

    /// Prepend `count` identity axes.
    pub fn set_pad(&self, count: usize) -> Transform {
        match self {
            Transform::Identity => Transform::Identity,
            Transform::Translate(t) => Transform::Translate(pad_vector(t, t.len() + count, 0.0)),
            Transform::Scale(s) => Transform::Scale(pad_vector(s, s.len() + count, 1.0)),
            Transform::Affine(affine) => Transform::Affine(affine.padded(affine.ndim() + count)),
        }
    }

    /// Equivalent affine transform with `ndim` axes.
    pub fn to_affine(&self, ndim: usize) -> Result<Affine> {
        if self.ndim() > ndim {
            return Err(ShapesError::DimensionMismatch {
                expected: ndim,
                found: self.ndim(),
            });
        }
        Ok(match self {
            Transform::Identity => Affine::identity(ndim),
            Transform::Translate(t) => Affine {
                a: DMatrix::identity(ndim, ndim),
                b: DVector::from_vec(pad_vector(t, ndim, 0.0)),
            },
            Transform::Scale(s) => Affine {
                a: DMatrix::from_diagonal(&DVector::from_vec(pad_vector(s, ndim, 1.0))),
                b: DVector::zeros(ndim),
            },
            Transform::Affine(affine) => affine.padded(ndim),
        })
    }
}

/// A sequence of transforms applied in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformChain {
    transforms: Vec<Transform>,
}

impl TransformChain {
    pub fn new(transforms: Vec<Transform>) -> Self {
        Self { transforms }
    }

    pub fn push(&mut self, transform: Transform) {
        self.transforms.push(transform);
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn map(&self, coords: &[f64]) -> Result<Vec<f64>> {
        self.transforms
            .iter()
            .try_fold(coords.to_vec(), |acc, t| t.map(&acc))
    }

    /// Inverse chain, each transform inverted and in reverse order.
    pub fn inverse(&self) -> Result<TransformChain> {
        let transforms = self
            .transforms
            .iter()
            .rev()
            .map(Transform::inverse)
            .collect::<Result<Vec<_>>>()?;
        Ok(TransformChain { transforms })
    }

    pub fn set_slice(&self, axes: &[usize]) -> Result<TransformChain> {
        let transforms = self
            .transforms
            .iter()
            .map(|t| t.set_slice(axes))
            .collect::<Result<Vec<_>>>()?;
        Ok(TransformChain { transforms })
    }

    /// Collapse the chain into a single affine transform.
    pub fn simplified(&self, ndim: usize) -> Result<Affine> {
        self.transforms
            .iter()
            .try_fold(Affine::identity(ndim), |acc, t| {
                t.to_affine(ndim)?.compose(&acc)
            })
    }
}

fn pad_vector(values: &[f64], ndim: usize, fill: f64) -> Vec<f64> {
    let pad = ndim.saturating_sub(values.len());
    (0..ndim)
        .map(|i| if i < pad { fill } else { values[i - pad] })
        .collect()
}

fn pick_axes(values: &[f64], axes: &[usize]) -> Result<Vec<f64>> {
    check_axes(axes, values.len())?;
    Ok(axes.iter().map(|&a| values[a]).collect())
}

fn check_axes(axes: &[usize], ndim: usize) -> Result<()> {
    match axes.iter().find(|&&a| a >= ndim) {
        Some(&a) => Err(ShapesError::AxisOutOfRange {
            axis: a as isize,
            ndim,
        }),
        None => Ok(()),
    }
}
