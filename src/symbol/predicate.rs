//! Predicates: mappings from n-ary individuals to truth degrees.

use candle_core::Tensor;
use candle_nn::VarBuilder;
use tracing::debug;

use super::{call_model, Head, LambdaModel, Mlp, Model};
use crate::error::{LtnError, Result};
use crate::grounding::Grounding;

/// A predicate symbol grounded by a (fixed or learnable) model.
///
/// Evaluating a predicate on variables `x1..xk` with `n1..nk` individuals
/// yields a truth tensor of shape `[n1, ..., nk]` whose axes follow the
/// first-seen order of the variables across the arguments. The model is
/// responsible for producing values in `[0, 1]`; nothing here clamps them.
pub struct Predicate {
    model: Box<dyn Model>,
}

impl Predicate {
    /// Wrap an arbitrary model returning `[batch]` or `[batch, 1]` truth degrees.
    pub fn new(model: impl Model + 'static) -> Self {
        Self {
            model: Box::new(model),
        }
    }

    /// A fixed predicate from a closure over the flattened arguments.
    ///
    /// # Example
    /// ```
    /// use candle_core::{DType, Device, Tensor};
    /// use ltn::{Domain, Predicate, Variable};
    ///
    /// let eq = Predicate::lambda(|xs: &[Tensor]| xs[0].eq(&xs[1])?.to_dtype(DType::F32));
    /// let d = Domain::scalar("n");
    /// let x = Variable::new("x", &d, Tensor::new(&[0f32, 1., 2.], &Device::Cpu).unwrap()).unwrap();
    /// let y = Variable::new("y", &d, Tensor::new(&[0f32, 1.], &Device::Cpu).unwrap()).unwrap();
    ///
    /// let out = eq.evaluate(&[x.grounding(), y.grounding()]).unwrap();
    /// assert_eq!(
    ///     out.tensor().to_vec2::<f32>().unwrap(),
    ///     vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.0, 0.0]]
    /// );
    /// ```
    pub fn lambda<F>(f: F) -> Self
    where
        F: Fn(&[Tensor]) -> candle_core::Result<Tensor> + 'static,
    {
        Self::new(LambdaModel::new(f))
    }

    /// A trainable predicate: ELU hidden layers and a sigmoid output.
    ///
    /// The last entry of `layer_dims` is normally 1.
    pub fn mlp(layer_dims: &[usize], vb: VarBuilder) -> Result<Self> {
        Ok(Self::new(Mlp::new(layer_dims, Head::Sigmoid, vb)?))
    }

    /// The wrapped model, without broadcasting.
    pub fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    /// Evaluate the predicate on one or more argument groundings.
    pub fn evaluate(&self, inputs: &[&Grounding]) -> Result<Grounding> {
        let (outputs, crossed) = call_model(self.model.as_ref(), inputs)?;

        let rows = crossed.flat_len();
        if outputs.elem_count() != rows {
            return Err(LtnError::ShapeMismatch {
                expected: format!("one truth degree per row ([{}] or [{}, 1])", rows, rows),
                got: format!("{:?}", outputs.dims()),
            });
        }

        // Closed formulas collapse to a rank-0 truth value.
        let tensor = outputs.reshape(crossed.dims0.clone())?;
        debug!(doms = ?crossed.doms, shape = ?tensor.dims(), "predicate evaluated");

        Ok(Grounding::from_parts(tensor, crossed.doms))
    }

    /// Evaluate a unary predicate.
    pub fn evaluate_one(&self, input: &Grounding) -> Result<Grounding> {
        self.evaluate(&[input])
    }
}
