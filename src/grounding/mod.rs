//! Groundings: the tensor interpretation of logical terms.
//!
//! A grounding pairs a tensor with the ordered list of variable labels
//! ("active domains") that own its leading axes. Constants have no active
//! domains, variables have exactly one, and compound terms carry the
//! first-seen union of their operands' labels.

mod domain;
mod leaf;
mod term;

pub use domain::Domain;
pub use leaf::{Constant, Variable, RESERVED_PREFIX};
pub use term::Grounding;
