//! Functions: mappings from n-ary individuals to individuals of a codomain.

use candle_core::Tensor;
use candle_nn::VarBuilder;
use tracing::debug;

use super::{call_model, Head, LambdaModel, Mlp, Model};
use crate::error::{LtnError, Result};
use crate::grounding::{Domain, Grounding};

/// A function symbol grounded by a (fixed or learnable) model.
///
/// Same broadcasting as [`crate::Predicate`], but each output row keeps its
/// value axes: on variables with `n1..nk` individuals the result has shape
/// `[n1, ..., nk, *codomain_shape]`.
pub struct Function {
    model: Box<dyn Model>,
    codomain: Option<Domain>,
}

impl Function {
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
            codomain: None,
        }
    }

    /// A fixed function from a closure over the flattened arguments.
    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&[Tensor]) -> candle_core::Result<Tensor> + 'static,
    {
        Self::new(LambdaModel::new(f))
    }

    /// A trainable function: ELU hidden layers and a linear output.
    pub fn mlp(layer_dims: &[usize], vb: VarBuilder) -> Result<Self> {
        Ok(Self::new(Mlp::new(layer_dims, Head::Identity, vb)?))
    }

    /// Declare the codomain; outputs are then checked against its shape.
    pub fn with_codomain(mut self, codomain: Domain) -> Self {
        self.codomain = Some(codomain);
        self
    }

    pub fn codomain(&self) -> Option<&Domain> {
        self.codomain.as_ref()
    }

    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    /// Evaluate the function on one or more argument groundings.
    pub fn evaluate(&self, inputs: &[&Grounding]) -> Result<Grounding> {
        let (outputs, crossed) = call_model(self.model.as_ref(), inputs)?;

        let value_shape = &outputs.dims()[1..];
        if let Some(codomain) = &self.codomain {
            if value_shape != codomain.shape() {
                return Err(LtnError::ShapeMismatch {
                    expected: format!("{:?} per output individual of {}", codomain.shape(), codomain),
                    got: format!("{:?}", value_shape),
                });
            }
        }

        let mut shape = crossed.dims0.clone();
        shape.extend_from_slice(value_shape);
        let tensor = outputs.reshape(shape)?;
        debug!(doms = ?crossed.doms, shape = ?tensor.dims(), "function evaluated");

        Ok(Grounding::from_parts(tensor, crossed.doms))
    }

    /// Evaluate a unary function.
    pub fn evaluate_one(&self, input: &Grounding) -> Result<Grounding> {
        self.evaluate(&[input])
    }
}
