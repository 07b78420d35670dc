//! Fuzzy-logic operators on truth tensors.
//!
//! Connective operators are elementwise functions on `[0, 1]`; aggregation
//! operators reduce one axis. Operators that can produce vanishing or
//! exploding gradients at the borders of `[0, 1]` have a `stable` variant that
//! first projects their inputs into the open interval:
//!
//! - `pi_0(x) = (1 - eps) * x + eps` moves away from 0,
//! - `pi_1(x) = (1 - eps) * x` moves away from 1.

mod aggregators;
mod connectives;

pub use aggregators::{AggregMax, AggregMean, AggregMin, AggregOp, AggregPMean, AggregPMeanError};
pub use connectives::{
    AndLuk, AndMin, AndProd, BinaryOp, Equiv, ImpliesGodel, ImpliesGoguen, ImpliesKleeneDienes, ImpliesLuk,
    ImpliesReichenbach, NotGodel, NotStandard, OrLuk, OrMax, OrProbSum, UnaryOp,
};

use candle_core::{Result, Tensor};

/// Default projection margin for stable operators.
pub const DEFAULT_EPS: f64 = 1e-4;

/// Project away from 0.
pub fn pi_0(x: &Tensor, eps: f64) -> Result<Tensor> {
    x.affine(1.0 - eps, eps)
}

/// Project away from 1.
pub fn pi_1(x: &Tensor, eps: f64) -> Result<Tensor> {
    x.affine(1.0 - eps, 0.0)
}
