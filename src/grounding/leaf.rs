//! Leaf terms: constants (single individuals) and variables (sequences of individuals).

use std::fmt;

use candle_core::{Device, Tensor, Var};

use super::{Domain, Grounding};
use crate::error::{LtnError, Result};

/// Labels with this prefix are reserved for diagonal-alignment variables.
pub const RESERVED_PREFIX: &str = "diag";

/// An individual grounded as a tensor of its domain's shape.
///
/// The individual is either fixed data (detached from any computation graph)
/// or a learnable embedding backed by a [`Var`].
pub struct Constant {
    name: String,
    domain: Domain,
    grounding: Grounding,
    /// Backing parameter when trainable
    var: Option<Var>,
}

impl Constant {
    /// Create a constant whose value must have exactly the domain's shape.
    ///
    /// # Arguments
    /// * `name` - Constant name
    /// * `domain` - Domain of the individual
    /// * `value` - Grounding of the individual, shape = `domain.shape()`
    /// * `trainable` - Whether the value participates in gradient computation
    pub fn new(name: impl Into<String>, domain: &Domain, value: Tensor, trainable: bool) -> Result<Self> {
        let name = name.into();
        if value.dims() != domain.shape() {
            return Err(LtnError::ShapeMismatch {
                expected: format!("{:?} for constant '{}' of {}", domain.shape(), name, domain),
                got: format!("{:?}", value.dims()),
            });
        }

        let (tensor, var) = if trainable {
            let var = Var::from_tensor(&value)?;
            (var.as_tensor().clone(), Some(var))
        } else {
            (value.detach(), None)
        };

        Ok(Self {
            name,
            domain: domain.clone(),
            grounding: Grounding::closed(tensor),
            var,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn grounding(&self) -> &Grounding {
        &self.grounding
    }

    pub fn is_trainable(&self) -> bool {
        self.var.is_some()
    }

    /// The parameter to hand to an optimizer, if trainable.
    ///
    /// Optimizer updates write into the same storage the grounding reads, so
    /// the constant always sees the latest value.
    pub fn var(&self) -> Option<&Var> {
        self.var.as_ref()
    }
}

impl AsRef<Grounding> for Constant {
    fn as_ref(&self) -> &Grounding {
        &self.grounding
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constant")
            .field("name", &self.name)
            .field("domain", &self.domain)
            .field("trainable", &self.is_trainable())
            .finish()
    }
}

/// A logical variable grounded as a sequence of individuals.
///
/// Axis 0 is the batch axis: `grounding().tensor().get(i)` is the i-th
/// individual. Variables are cheap to rebuild, e.g. once per minibatch.
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    domain: Domain,
    grounding: Grounding,
}

impl Variable {
    /// Bind a variable to the individuals stacked along axis 0 of `individuals`.
    ///
    /// A tensor with exactly the domain's shape is a single individual and
    /// gets a leading axis of size 1.
    pub fn new(name: impl Into<String>, domain: &Domain, individuals: Tensor) -> Result<Self> {
        let name = name.into();
        check_label(&name)?;

        let dims = individuals.dims();
        let tensor = if dims == domain.shape() {
            individuals.unsqueeze(0)?
        } else if dims.len() == domain.rank() + 1 && &dims[1..] == domain.shape() {
            individuals
        } else {
            return Err(LtnError::ShapeMismatch {
                expected: format!("[n, {:?}] for variable '{}' of {}", domain.shape(), name, domain),
                got: format!("{:?}", dims),
            });
        };

        Ok(Self {
            grounding: Grounding::from_parts(tensor, vec![name.clone()]),
            name,
            domain: domain.clone(),
        })
    }

    /// Bind a variable to a sequence of individual tensors.
    pub fn from_individuals(name: impl Into<String>, domain: &Domain, individuals: &[Tensor]) -> Result<Self> {
        let name = name.into();
        check_label(&name)?;

        if individuals.is_empty() {
            return Err(LtnError::ShapeMismatch {
                expected: format!("at least one individual for variable '{}'", name),
                got: "an empty sequence".into(),
            });
        }
        if let Some(bad) = individuals.iter().find(|t| t.dims() != domain.shape()) {
            return Err(LtnError::ShapeMismatch {
                expected: format!("{:?} for each individual of '{}'", domain.shape(), name),
                got: format!("{:?}", bad.dims()),
            });
        }

        let stacked = Tensor::stack(individuals, 0)?;
        Self::new(name, domain, stacked)
    }

    /// A variable over the indices `0..n` of a scalar domain (class labels, clusters).
    pub fn from_indices(name: impl Into<String>, domain: &Domain, n: usize, device: &Device) -> Result<Self> {
        if domain.rank() != 0 {
            return Err(LtnError::ShapeMismatch {
                expected: "a scalar domain for index individuals".into(),
                got: format!("{}", domain),
            });
        }
        let indices = Tensor::arange(0u32, n as u32, device)?.to_dtype(candle_core::DType::F32)?;
        Self::new(name, domain, indices)
    }

    /// The variable label.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn grounding(&self) -> &Grounding {
        &self.grounding
    }

    /// Number of individuals bound to the variable.
    pub fn len(&self) -> usize {
        self.grounding.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AsRef<Grounding> for Variable {
    fn as_ref(&self) -> &Grounding {
        &self.grounding
    }
}

fn check_label(name: &str) -> Result<()> {
    if name.starts_with(RESERVED_PREFIX) {
        return Err(LtnError::ReservedName(name.to_string()));
    }
    Ok(())
}
