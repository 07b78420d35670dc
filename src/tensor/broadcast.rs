//! Cross-product broadcasting of groundings.
//!
//! Given groundings over different sets of variables, produce tensors that all
//! share one axis per variable in the union, in first-seen order:
//!
//! ```text
//! P(x) : [n]        ─┐
//!                    ├─>  x,y : [n, m]  (P repeated along y, Q along x)
//! Q(y) : [m]        ─┘
//! ```
//!
//! With `flatten_dim0` the variable axes are collapsed into one batch axis of
//! size `n * m`, which is what a wrapped model consumes.

use candle_core::Tensor;
use indexmap::IndexMap;
use tracing::trace;

use crate::error::{LtnError, Result};
use crate::grounding::Grounding;

/// Aligned operands produced by [`cross_grounding_values`].
#[derive(Debug, Clone)]
pub struct Crossed {
    /// One tensor per input grounding, in input order
    pub tensors: Vec<Tensor>,
    /// Canonical variable order shared by every tensor's leading axes
    pub doms: Vec<String>,
    /// Individual count of each variable in `doms`
    pub dims0: Vec<usize>,
}

impl Crossed {
    /// Number of rows of the flattened batch axis.
    pub fn flat_len(&self) -> usize {
        self.dims0.iter().product()
    }

    /// Re-attach the canonical domains to each (non-flattened) tensor.
    pub fn into_groundings(self) -> Vec<Grounding> {
        let doms = self.doms;
        self.tensors
            .into_iter()
            .map(|t| Grounding::from_parts(t, doms.clone()))
            .collect()
    }
}

/// Canonical variable order and individual counts over a set of groundings.
///
/// Labels keep the order in which they are first seen, scanning operands left
/// to right. A label bound to different counts in two operands is an error.
pub fn dims0_of(groundings: &[&Grounding]) -> Result<IndexMap<String, usize>> {
    let mut doms_to_dim0: IndexMap<String, usize> = IndexMap::new();

    for grounding in groundings {
        for (axis, dom) in grounding.active_doms().iter().enumerate() {
            let n = grounding.dims()[axis];
            match doms_to_dim0.get(dom) {
                Some(&first) if first != n => {
                    return Err(LtnError::DomainConflict {
                        label: dom.clone(),
                        first,
                        second: n,
                    });
                }
                Some(_) => {}
                None => {
                    doms_to_dim0.insert(dom.clone(), n);
                }
            }
        }
    }

    Ok(doms_to_dim0)
}

/// Broadcast groundings against each other over the union of their variables.
///
/// Every returned tensor has shape `[dims0..., value_shape...]` where the
/// leading axes follow `doms`. With `flatten_dim0` the leading axes become a
/// single axis of size `dims0.product()`.
///
/// # Example
/// ```
/// use candle_core::{Device, Tensor};
/// use ltn::{cross_grounding_values, Domain, Variable};
///
/// let d = Domain::scalar("n");
/// let x = Variable::new("x", &d, Tensor::new(&[0f32, 1., 2.], &Device::Cpu).unwrap()).unwrap();
/// let y = Variable::new("y", &d, Tensor::new(&[5f32, 6.], &Device::Cpu).unwrap()).unwrap();
///
/// let crossed = cross_grounding_values(&[x.grounding(), y.grounding()], false).unwrap();
/// assert_eq!(crossed.doms, vec!["x", "y"]);
/// assert_eq!(crossed.tensors[1].dims(), &[3, 2]);
/// ```
pub fn cross_grounding_values(groundings: &[&Grounding], flatten_dim0: bool) -> Result<Crossed> {
    let doms_to_dim0 = dims0_of(groundings)?;

    let tensors = groundings
        .iter()
        .map(|g| align(g, &doms_to_dim0, flatten_dim0))
        .collect::<Result<Vec<_>>>()?;

    let (doms, dims0): (Vec<String>, Vec<usize>) = doms_to_dim0.into_iter().unzip();
    trace!(?doms, ?dims0, flatten_dim0, operands = groundings.len(), "crossed groundings");

    Ok(Crossed {
        tensors,
        doms,
        dims0,
    })
}

/// Expand one grounding to the canonical variable axes.
fn align(grounding: &Grounding, canonical: &IndexMap<String, usize>, flatten_dim0: bool) -> Result<Tensor> {
    let mut tensor = grounding.tensor().clone();
    let mut present: Vec<&str> = grounding.active_doms().iter().map(String::as_str).collect();

    // New variable axes go right after the existing ones, before value axes.
    for (dom, &n) in canonical {
        if present.contains(&dom.as_str()) {
            continue;
        }
        let axis = present.len();
        tensor = tensor.unsqueeze(axis)?;
        let mut shape = tensor.dims().to_vec();
        shape[axis] = n;
        tensor = tensor.broadcast_as(shape)?;
        present.push(dom.as_str());
    }

    let n_doms = present.len();
    let mut perm = canonical
        .keys()
        .map(|dom| {
            present.iter().position(|p| *p == dom.as_str()).ok_or_else(|| {
                LtnError::BroadcastShape(format!("domain '{}' missing after expansion of {}", dom, grounding))
            })
        })
        .collect::<Result<Vec<usize>>>()?;
    perm.extend(n_doms..tensor.rank());

    if perm.iter().enumerate().any(|(i, &p)| i != p) {
        tensor = tensor.permute(perm)?;
    }
    let tensor = tensor.contiguous()?;

    if !flatten_dim0 {
        return Ok(tensor);
    }

    let mut flat_shape = vec![canonical.values().product::<usize>()];
    flat_shape.extend_from_slice(&tensor.dims()[n_doms..]);
    Ok(tensor.reshape(flat_shape)?)
}
