//! Formula construction: connectives, quantifiers and knowledge-base satisfaction.

mod connective;
mod quantifier;
mod satisfaction;
mod semantics;

pub use connective::{BinaryConnective, UnaryConnective};
pub use quantifier::{Mask, MaskFn, Quantification, Quantifier, QuantifierOptions};
pub use satisfaction::{KnowledgeBase, SatAgg};
pub use semantics::{BoxedBinary, BoxedQuantifier, BoxedUnary, FuzzySemantics};
