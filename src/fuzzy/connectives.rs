//! Elementwise fuzzy connectives: negations, t-norms, t-conorms, implications.
//!
//! Binary operators broadcast their operands against each other; callers
//! normally pass tensors already aligned by the grounding engine.

use candle_core::{Result, Tensor};

use super::{pi_0, pi_1, DEFAULT_EPS};

/// A unary truth function (negation).
pub trait UnaryOp {
    fn apply(&self, x: &Tensor) -> Result<Tensor>;
}

/// A binary truth function (conjunction, disjunction, implication, ...).
pub trait BinaryOp {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor>;
}

impl<O: UnaryOp + ?Sized> UnaryOp for Box<O> {
    fn apply(&self, x: &Tensor) -> Result<Tensor> {
        (**self).apply(x)
    }
}

impl<O: BinaryOp + ?Sized> BinaryOp for Box<O> {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        (**self).apply(x, y)
    }
}

/// Broadcast two operands to a common shape (needed by `where_cond`).
fn aligned(x: &Tensor, y: &Tensor) -> Result<(Tensor, Tensor)> {
    if x.dims() == y.dims() {
        return Ok((x.clone(), y.clone()));
    }
    let shape = x.shape().broadcast_shape_binary_op(y.shape(), "fuzzy connective")?;
    Ok((x.broadcast_as(shape.clone())?, y.broadcast_as(shape)?))
}

/// Stable-variant settings shared by product-based operators.
macro_rules! stable_op {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            pub stable: bool,
            pub eps: f64,
        }

        impl $name {
            pub fn new(stable: bool) -> Self {
                Self { stable, eps: DEFAULT_EPS }
            }

            pub fn with_eps(mut self, eps: f64) -> Self {
                self.eps = eps;
                self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(true)
            }
        }
    };
}

// Negations

/// Standard negation: `1 - x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotStandard;

impl UnaryOp for NotStandard {
    fn apply(&self, x: &Tensor) -> Result<Tensor> {
        x.affine(-1.0, 1.0)
    }
}

/// Gödel negation: `1` if `x == 0`, else `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotGodel;

impl UnaryOp for NotGodel {
    fn apply(&self, x: &Tensor) -> Result<Tensor> {
        x.eq(&x.zeros_like()?)?.to_dtype(x.dtype())
    }
}

// Conjunctions

/// Gödel t-norm: `min(x, y)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndMin;

impl BinaryOp for AndMin {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.broadcast_minimum(y)
    }
}

stable_op!(
    /// Product t-norm: `x * y`.
    AndProd
);

impl BinaryOp for AndProd {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        if self.stable {
            pi_0(x, self.eps)?.broadcast_mul(&pi_0(y, self.eps)?)
        } else {
            x.broadcast_mul(y)
        }
    }
}

/// Łukasiewicz t-norm: `max(x + y - 1, 0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AndLuk;

impl BinaryOp for AndLuk {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.broadcast_add(y)?.affine(1.0, -1.0)?.relu()
    }
}

// Disjunctions

/// Gödel t-conorm: `max(x, y)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrMax;

impl BinaryOp for OrMax {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.broadcast_maximum(y)
    }
}

stable_op!(
    /// Probabilistic sum: `x + y - x * y`.
    OrProbSum
);

impl BinaryOp for OrProbSum {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let (x, y) = if self.stable {
            (pi_1(x, self.eps)?, pi_1(y, self.eps)?)
        } else {
            (x.clone(), y.clone())
        };
        x.broadcast_add(&y)?.broadcast_sub(&x.broadcast_mul(&y)?)
    }
}

/// Łukasiewicz t-conorm: `min(x + y, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrLuk;

impl BinaryOp for OrLuk {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.broadcast_add(y)?.minimum(1.0)
    }
}

// Implications

/// Kleene-Dienes implication: `max(1 - x, y)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpliesKleeneDienes;

impl BinaryOp for ImpliesKleeneDienes {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.affine(-1.0, 1.0)?.broadcast_maximum(y)
    }
}

/// Gödel implication: `1` if `x <= y`, else `y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpliesGodel;

impl BinaryOp for ImpliesGodel {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let (x, y) = aligned(x, y)?;
        x.le(&y)?.where_cond(&y.ones_like()?, &y)
    }
}

stable_op!(
    /// Reichenbach implication: `1 - x + x * y`.
    ImpliesReichenbach
);

impl BinaryOp for ImpliesReichenbach {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let (x, y) = if self.stable {
            (pi_0(x, self.eps)?, pi_1(y, self.eps)?)
        } else {
            (x.clone(), y.clone())
        };
        x.broadcast_mul(&y)?.broadcast_sub(&x)?.affine(1.0, 1.0)
    }
}

stable_op!(
    /// Goguen implication: `1` if `x <= y`, else `y / x`.
    ///
    /// Use the stable variant in training: the `y / x` branch is evaluated
    /// everywhere and divides by zero at `x = 0` otherwise.
    ImpliesGoguen
);

impl BinaryOp for ImpliesGoguen {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let x = if self.stable { pi_0(x, self.eps)? } else { x.clone() };
        let (x, y) = aligned(&x, y)?;
        x.le(&y)?.where_cond(&y.ones_like()?, &y.div(&x)?)
    }
}

/// Łukasiewicz implication: `min(1 - x + y, 1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpliesLuk;

impl BinaryOp for ImpliesLuk {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        x.affine(-1.0, 1.0)?.broadcast_add(y)?.minimum(1.0)
    }
}

// Equivalence

/// Equivalence as the conjunction of both implications.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equiv<A, I> {
    and: A,
    implies: I,
}

impl<A: BinaryOp, I: BinaryOp> Equiv<A, I> {
    pub fn new(and: A, implies: I) -> Self {
        Self { and, implies }
    }
}

impl<A: BinaryOp, I: BinaryOp> BinaryOp for Equiv<A, I> {
    fn apply(&self, x: &Tensor, y: &Tensor) -> Result<Tensor> {
        let xy = self.implies.apply(x, y)?;
        let yx = self.implies.apply(y, x)?;
        self.and.apply(&xy, &yx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    fn t(v: &[f32]) -> Tensor {
        Tensor::new(v, &Device::Cpu).unwrap()
    }

    fn close(got: Tensor, want: &[f32]) {
        let got = got.to_vec1::<f32>().unwrap();
        assert_eq!(got.len(), want.len());
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-5, "got {:?}, want {:?}", got, want);
        }
    }

    #[test]
    fn test_negations() {
        close(NotStandard.apply(&t(&[0.0, 0.3, 1.0])).unwrap(), &[1.0, 0.7, 0.0]);
        close(NotGodel.apply(&t(&[0.0, 0.3, 1.0])).unwrap(), &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_conjunctions() {
        let x = t(&[0.2, 0.5, 1.0]);
        let y = t(&[0.6, 0.5, 0.3]);
        close(AndMin.apply(&x, &y).unwrap(), &[0.2, 0.5, 0.3]);
        close(AndProd::new(false).apply(&x, &y).unwrap(), &[0.12, 0.25, 0.3]);
        close(AndLuk.apply(&x, &y).unwrap(), &[0.0, 0.0, 0.3]);
    }

    #[test]
    fn test_stable_product_avoids_zero() {
        let zero = t(&[0.0]);
        let v = AndProd::default().apply(&zero, &zero).unwrap().to_vec1::<f32>().unwrap();
        assert!(v[0] > 0.0);
    }

    #[test]
    fn test_disjunctions() {
        let x = t(&[0.2, 0.5, 1.0]);
        let y = t(&[0.6, 0.5, 0.3]);
        close(OrMax.apply(&x, &y).unwrap(), &[0.6, 0.5, 1.0]);
        close(OrProbSum::new(false).apply(&x, &y).unwrap(), &[0.68, 0.75, 1.0]);
        close(OrLuk.apply(&x, &y).unwrap(), &[0.8, 1.0, 1.0]);
    }

    #[test]
    fn test_implications() {
        let x = t(&[0.2, 0.8, 1.0, 0.0]);
        let y = t(&[0.6, 0.4, 0.0, 0.0]);
        close(ImpliesKleeneDienes.apply(&x, &y).unwrap(), &[0.8, 0.4, 0.0, 1.0]);
        close(ImpliesGodel.apply(&x, &y).unwrap(), &[1.0, 0.4, 0.0, 1.0]);
        close(ImpliesReichenbach::new(false).apply(&x, &y).unwrap(), &[0.92, 0.52, 0.0, 1.0]);
        close(ImpliesGoguen::new(false).apply(&x, &y).unwrap(), &[1.0, 0.5, 0.0, 1.0]);
        close(ImpliesLuk.apply(&x, &y).unwrap(), &[1.0, 0.6, 0.0, 1.0]);
    }

    #[test]
    fn test_godel_implication_broadcasts_scalar() {
        let x = Tensor::new(0.5f32, &Device::Cpu).unwrap();
        close(ImpliesGodel.apply(&x, &t(&[0.2, 0.7])).unwrap(), &[0.2, 1.0]);
    }

    #[test]
    fn test_equivalence() {
        let equiv = Equiv::new(AndProd::new(false), ImpliesGoguen::new(false));
        let x = t(&[0.5, 1.0, 0.2]);
        let y = t(&[0.5, 0.0, 0.4]);
        close(equiv.apply(&x, &y).unwrap(), &[1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_boxed_ops() {
        let not: Box<dyn UnaryOp> = Box::new(NotStandard);
        let and: Box<dyn BinaryOp> = Box::new(AndMin);
        close(not.apply(&t(&[0.25])).unwrap(), &[0.75]);
        close(and.apply(&t(&[0.25]), &t(&[0.5])).unwrap(), &[0.25]);
    }
}
