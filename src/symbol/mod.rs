//! Non-logical symbols: predicates and functions wrapping a [`Model`].
//!
//! Both share the same evaluation path: cross the input groundings over the
//! union of their free variables, flatten to one batch axis, call the model,
//! and fold the batch axis back into one axis per variable.

mod function;
mod model;
mod predicate;

pub use function::Function;
pub use model::{Head, LambdaModel, Mlp, Model};
pub use predicate::Predicate;

use candle_core::Tensor;

use crate::error::{LtnError, Result};
use crate::grounding::Grounding;
use crate::tensor::{cross_grounding_values, Crossed};

/// Run `model` over the cross product of `inputs`.
///
/// Returns the raw model output (leading axis = flattened batch) together
/// with the canonical domains it must be folded back into.
fn call_model(model: &dyn Model, inputs: &[&Grounding]) -> Result<(Tensor, Crossed)> {
    if inputs.is_empty() {
        return Err(LtnError::InvalidArgument("symbol evaluated with no arguments".into()));
    }
    let crossed = cross_grounding_values(inputs, true)?;
    let outputs = model.forward(&crossed.tensors)?;

    let rows = crossed.flat_len();
    if outputs.rank() == 0 || outputs.dims()[0] != rows {
        return Err(LtnError::ShapeMismatch {
            expected: format!("model output with {} rows", rows),
            got: format!("{:?}", outputs.dims()),
        });
    }

    Ok((outputs, crossed))
}
