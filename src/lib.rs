//! LTN: Logic Tensor Networks on candle
//!
//! Formulas of a typed first-order logic are grounded as tensors: every free
//! variable of a formula owns one leading axis of its truth tensor, connectives
//! broadcast over the union of their operands' variables, and quantifiers
//! aggregate the axes of the variables they bind.
//!
//! # Key Insight
//!
//! `Forall x, y: P(x) -> Q(x, y)` is a tensor program. `P` and `Q` are neural
//! models evaluated on the cross product of the individuals bound to `x` and
//! `y`; the implication is elementwise; `Forall` is a differentiable mean.
//! Maximising the satisfaction of a knowledge base trains the models.

pub mod error;
pub mod fuzzy;
pub mod grounding;
pub mod logic;
pub mod symbol;
pub mod tensor;

pub use error::{LtnError, Result};
pub use fuzzy::{
    pi_0, pi_1, AggregMax, AggregMean, AggregMin, AggregOp, AggregPMean, AggregPMeanError, AndLuk,
    AndMin, AndProd, BinaryOp, Equiv, ImpliesGodel, ImpliesGoguen, ImpliesKleeneDienes, ImpliesLuk,
    ImpliesReichenbach, NotGodel, NotStandard, OrLuk, OrMax, OrProbSum, UnaryOp, DEFAULT_EPS,
};
pub use grounding::{Constant, Domain, Grounding, Variable, RESERVED_PREFIX};
pub use logic::{
    BinaryConnective, FuzzySemantics, KnowledgeBase, Mask, Quantification, Quantifier,
    QuantifierOptions, SatAgg, UnaryConnective,
};
pub use symbol::{Function, Head, LambdaModel, Mlp, Model, Predicate};
pub use tensor::{cross_grounding_values, default_device, dims0_of, Crossed};
