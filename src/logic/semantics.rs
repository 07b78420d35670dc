//! Ready-made operator bundles for the common fuzzy semantics.

use crate::fuzzy::{
    AggregMax, AggregMin, AggregOp, AggregPMean, AggregPMeanError, AndLuk, AndMin, AndProd,
    BinaryOp, Equiv, ImpliesGodel, ImpliesLuk, ImpliesReichenbach, NotStandard, OrLuk, OrMax,
    OrProbSum, UnaryOp,
};

use super::{BinaryConnective, Quantifier, UnaryConnective};

pub type BoxedUnary = UnaryConnective<Box<dyn UnaryOp>>;
pub type BoxedBinary = BinaryConnective<Box<dyn BinaryOp>>;
pub type BoxedQuantifier = Quantifier<Box<dyn AggregOp>>;

/// One choice of negation, connectives and quantifiers.
///
/// ```
/// use candle_core::{Device, Tensor};
/// use ltn::{FuzzySemantics, Grounding};
///
/// let sem = FuzzySemantics::godel();
/// let a = Grounding::closed(Tensor::new(0.3f32, &Device::Cpu).unwrap());
/// let b = Grounding::closed(Tensor::new(0.8f32, &Device::Cpu).unwrap());
/// let v = sem.and.apply(&a, &b).unwrap();
/// assert_eq!(v.tensor().to_scalar::<f32>().unwrap(), 0.3);
/// ```
pub struct FuzzySemantics {
    pub not: BoxedUnary,
    pub and: BoxedBinary,
    pub or: BoxedBinary,
    pub implies: BoxedBinary,
    pub equiv: BoxedBinary,
    pub forall: BoxedQuantifier,
    pub exists: BoxedQuantifier,
}

fn unary(op: impl UnaryOp + 'static) -> BoxedUnary {
    let op: Box<dyn UnaryOp> = Box::new(op);
    UnaryConnective::new(op)
}

fn binary(op: impl BinaryOp + 'static) -> BoxedBinary {
    let op: Box<dyn BinaryOp> = Box::new(op);
    BinaryConnective::new(op)
}

fn forall(agg: impl AggregOp + 'static) -> BoxedQuantifier {
    let agg: Box<dyn AggregOp> = Box::new(agg);
    Quantifier::forall(agg)
}

fn exists(agg: impl AggregOp + 'static) -> BoxedQuantifier {
    let agg: Box<dyn AggregOp> = Box::new(agg);
    Quantifier::exists(agg)
}

impl FuzzySemantics {
    /// Stable product configuration: product t-norm, probabilistic sum,
    /// Reichenbach implication, p-mean quantifiers with `p = 2`.
    pub fn product() -> Self {
        Self {
            not: unary(NotStandard),
            and: binary(AndProd::default()),
            or: binary(OrProbSum::default()),
            implies: binary(ImpliesReichenbach::default()),
            equiv: binary(Equiv::new(AndProd::default(), ImpliesReichenbach::default())),
            forall: forall(AggregPMeanError::new(2.0)),
            exists: exists(AggregPMean::new(2.0)),
        }
    }

    /// Łukasiewicz connectives with p-mean quantifiers.
    pub fn lukasiewicz() -> Self {
        Self {
            not: unary(NotStandard),
            and: binary(AndLuk),
            or: binary(OrLuk),
            implies: binary(ImpliesLuk),
            equiv: binary(Equiv::new(AndLuk, ImpliesLuk)),
            forall: forall(AggregPMeanError::new(2.0)),
            exists: exists(AggregPMean::new(2.0)),
        }
    }

    /// Gödel (min/max) semantics. Gradients only reach the extremal operand.
    pub fn godel() -> Self {
        Self {
            not: unary(NotStandard),
            and: binary(AndMin),
            or: binary(OrMax),
            implies: binary(ImpliesGodel),
            equiv: binary(Equiv::new(AndMin, ImpliesGodel)),
            forall: forall(AggregMin),
            exists: exists(AggregMax),
        }
    }
}

impl Default for FuzzySemantics {
    fn default() -> Self {
        Self::product()
    }
}
