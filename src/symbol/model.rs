//! Wrapped mappings: the differentiable functions behind predicates and functions.
//!
//! A model only ever sees flattened inputs: one tensor per argument, each of
//! shape `[batch, *argument_shape]`, where `batch` is the size of the cross
//! product of all free variables. Broadcasting back to per-variable axes is
//! done by the caller.

use candle_core::{Tensor, D};
use candle_nn::{Linear, Module, VarBuilder};

use crate::error::{LtnError, Result};

/// A mapping from flattened argument tensors to one output row per batch row.
pub trait Model {
    fn forward(&self, inputs: &[Tensor]) -> candle_core::Result<Tensor>;
}

impl<M: Model + ?Sized> Model for Box<M> {
    fn forward(&self, inputs: &[Tensor]) -> candle_core::Result<Tensor> {
        (**self).forward(inputs)
    }
}

/// A fixed (non-trainable) mapping given as a closure.
///
/// Suited for small mathematical operations such as similarity measures.
pub struct LambdaModel<F> {
    f: F,
}

impl<F> LambdaModel<F>
where
    F: Fn(&[Tensor]) -> candle_core::Result<Tensor>,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Model for LambdaModel<F>
where
    F: Fn(&[Tensor]) -> candle_core::Result<Tensor>,
{
    fn forward(&self, inputs: &[Tensor]) -> candle_core::Result<Tensor> {
        (self.f)(inputs)
    }
}

/// Output activation of an [`Mlp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Head {
    /// Truth degrees in (0, 1)
    Sigmoid,
    /// Class probabilities over the last axis
    Softmax,
    /// Raw values (function outputs)
    Identity,
}

/// A feed-forward network with ELU hidden activations.
///
/// Parameters are created through the given [`VarBuilder`], so they land in
/// the caller's `VarMap` and are picked up by its optimizer.
pub struct Mlp {
    layers: Vec<Linear>,
    head: Head,
}

impl Mlp {
    /// Build a network with `layer_dims = [input, hidden..., output]`.
    ///
    /// # Example
    /// ```
    /// use candle_core::{DType, Device};
    /// use candle_nn::{VarBuilder, VarMap};
    /// use ltn::{Head, Mlp};
    ///
    /// let varmap = VarMap::new();
    /// let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    /// let mlp = Mlp::new(&[2, 16, 16, 1], Head::Sigmoid, vb).unwrap();
    /// assert_eq!(varmap.all_vars().len(), 6);
    /// ```
    pub fn new(layer_dims: &[usize], head: Head, vb: VarBuilder) -> Result<Self> {
        if layer_dims.len() < 2 {
            return Err(LtnError::InvalidArgument(format!(
                "an MLP needs at least input and output widths, got {:?}",
                layer_dims
            )));
        }

        let layers = layer_dims
            .windows(2)
            .enumerate()
            .map(|(i, w)| candle_nn::linear(w[0], w[1], vb.pp(format!("layer{}", i))))
            .collect::<candle_core::Result<Vec<_>>>()?;

        Ok(Self { layers, head })
    }

    pub fn head(&self) -> Head {
        self.head
    }
}

impl Model for Mlp {
    fn forward(&self, inputs: &[Tensor]) -> candle_core::Result<Tensor> {
        let mut x = concat_features(inputs)?;
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(&x)?;
            if i < last {
                x = x.elu(1.0)?;
            }
        }
        match self.head {
            Head::Sigmoid => candle_nn::ops::sigmoid(&x),
            Head::Softmax => candle_nn::ops::softmax(&x, D::Minus1),
            Head::Identity => Ok(x),
        }
    }
}

/// Flatten every argument to `[batch, features]` and join them along axis 1.
fn concat_features(inputs: &[Tensor]) -> candle_core::Result<Tensor> {
    if inputs.is_empty() {
        return Err(candle_core::Error::Msg("model called with no arguments".into()));
    }
    let features = inputs
        .iter()
        .map(|t| match t.rank() {
            0 => t.reshape((1, 1)),
            1 => t.unsqueeze(1),
            _ => t.flatten_from(1),
        })
        .collect::<candle_core::Result<Vec<_>>>()?;
    match features.as_slice() {
        [single] => Ok(single.clone()),
        _ => Tensor::cat(&features, 1),
    }
}
