//! The grounding value type: a tensor plus its active-domain labels.

use std::fmt;

use candle_core::Tensor;

use crate::error::{LtnError, Result};

/// A tensor annotated with the variable labels of its leading axes.
///
/// Axis `i < active_doms.len()` enumerates the individuals bound to
/// `active_doms[i]`; the remaining axes are the term's own value axes (empty
/// for a truth value, the domain shape for an individual).
#[derive(Debug, Clone)]
pub struct Grounding {
    tensor: Tensor,
    active_doms: Vec<String>,
}

impl Grounding {
    /// Pair a tensor with its active domains.
    ///
    /// Fails with [`LtnError::BroadcastShape`] if there are more labels than
    /// axes or a label appears twice.
    pub fn new(tensor: Tensor, active_doms: Vec<String>) -> Result<Self> {
        if active_doms.len() > tensor.rank() {
            return Err(LtnError::BroadcastShape(format!(
                "{} active domains {:?} for a tensor of rank {}",
                active_doms.len(),
                active_doms,
                tensor.rank()
            )));
        }
        for (i, dom) in active_doms.iter().enumerate() {
            if active_doms[..i].contains(dom) {
                return Err(LtnError::BroadcastShape(format!(
                    "active domain '{}' appears twice in {:?}",
                    dom, active_doms
                )));
            }
        }
        Ok(Self {
            tensor,
            active_doms,
        })
    }

    /// A grounding with no free variables.
    pub fn closed(tensor: Tensor) -> Self {
        Self {
            tensor,
            active_doms: Vec::new(),
        }
    }

    /// Callers guarantee the labels are unique and fit the tensor rank.
    pub(crate) fn from_parts(tensor: Tensor, active_doms: Vec<String>) -> Self {
        debug_assert!(active_doms.len() <= tensor.rank());
        Self {
            tensor,
            active_doms,
        }
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    pub fn into_tensor(self) -> Tensor {
        self.tensor
    }

    pub fn active_doms(&self) -> &[String] {
        &self.active_doms
    }

    pub fn dims(&self) -> &[usize] {
        self.tensor.dims()
    }

    /// True when no variable is free in this grounding.
    pub fn is_closed(&self) -> bool {
        self.active_doms.is_empty()
    }

    /// Number of individuals bound to `label`, if it is active here.
    pub fn dim0_of(&self, label: &str) -> Option<usize> {
        self.active_doms
            .iter()
            .position(|d| d == label)
            .map(|axis| self.tensor.dims()[axis])
    }

    /// Trailing axes that are not owned by any variable.
    pub fn value_shape(&self) -> &[usize] {
        &self.tensor.dims()[self.active_doms.len()..]
    }

    /// Apply a tensor operation, keeping the active domains.
    ///
    /// The operation must leave the leading (active-domain) axes untouched;
    /// only value axes may change.
    pub fn map<F>(&self, f: F) -> Result<Self>
    where
        F: FnOnce(&Tensor) -> candle_core::Result<Tensor>,
    {
        let tensor = f(&self.tensor)?;
        let n = self.active_doms.len();
        if tensor.rank() < n || tensor.dims()[..n] != self.tensor.dims()[..n] {
            return Err(LtnError::BroadcastShape(format!(
                "operation changed the active-domain axes of {:?}: {:?} -> {:?}",
                self.active_doms,
                self.tensor.dims(),
                tensor.dims()
            )));
        }
        Ok(Self {
            tensor,
            active_doms: self.active_doms.clone(),
        })
    }
}

impl AsRef<Grounding> for Grounding {
    fn as_ref(&self) -> &Grounding {
        self
    }
}

impl fmt::Display for Grounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Grounding(active_doms={:?}, shape={:?})",
            self.active_doms,
            self.tensor.dims()
        )
    }
}
