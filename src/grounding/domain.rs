//! Domains describe the space an individual lives in.

use std::fmt;

use crate::error::{LtnError, Result};

/// The type of a constant, variable, function argument or predicate argument.
///
/// A domain named `points` with shape `[2]` is grounded as the set of
/// 2-vectors; every individual of that domain is a tensor of shape `[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    name: String,
    shape: Vec<usize>,
}

impl Domain {
    /// Create a domain from a name and a shape.
    ///
    /// # Example
    /// ```
    /// use ltn::Domain;
    ///
    /// let points = Domain::new("points", [2]).unwrap();
    /// assert_eq!(points.shape(), &[2]);
    /// assert!(Domain::new("bad", [2, -1]).is_err());
    /// ```
    pub fn new<I>(name: impl Into<String>, shape: I) -> Result<Self>
    where
        I: IntoIterator<Item = i64>,
    {
        let name = name.into();
        let shape = shape
            .into_iter()
            .map(|d| {
                usize::try_from(d).map_err(|_| LtnError::InvalidDomain {
                    name: name.clone(),
                    message: format!("dimension {} is negative", d),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { name, shape })
    }

    /// A domain whose individuals are scalars (rank 0), e.g. class indices.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shape: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of scalars in one individual.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain({}, R^{:?})", self.name, self.shape)
    }
}
