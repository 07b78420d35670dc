//! Satisfaction of a knowledge base: many closed axioms reduced to one truth value.

use candle_core::{DType, Tensor};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::{LtnError, Result};
use crate::fuzzy::{AggregOp, AggregPMeanError};
use crate::grounding::Grounding;

/// Aggregates closed axiom groundings into a scalar satisfaction level.
#[derive(Debug, Clone)]
pub struct SatAgg<A> {
    aggregator: A,
}

impl<A: AggregOp> SatAgg<A> {
    pub fn new(aggregator: A) -> Self {
        Self { aggregator }
    }

    /// Satisfaction level of `axioms` as a rank-0 tensor.
    pub fn aggregate(&self, axioms: &[&Grounding]) -> Result<Tensor> {
        let named: Vec<(String, &Grounding)> = axioms
            .iter()
            .enumerate()
            .map(|(i, g)| (format!("#{}", i), *g))
            .collect();
        self.aggregate_named(&named)
    }

    fn aggregate_named(&self, axioms: &[(String, &Grounding)]) -> Result<Tensor> {
        if axioms.is_empty() {
            return Err(LtnError::InvalidArgument("no axioms to aggregate".into()));
        }
        let mut values = Vec::with_capacity(axioms.len());
        for (name, axiom) in axioms {
            if !axiom.is_closed() {
                return Err(LtnError::UnquantifiedAxiom {
                    axiom: name.clone(),
                    free: axiom.active_doms().to_vec(),
                });
            }
            values.push(axiom.tensor().flatten_all()?);
        }
        let stacked = Tensor::cat(&values, 0)?;
        if stacked.dim(0)? != axioms.len() {
            return Err(LtnError::ShapeMismatch {
                expected: format!("{} scalar truth values", axioms.len()),
                got: format!("{:?}", stacked.dims()),
            });
        }
        Ok(self.aggregator.aggregate(&stacked, 0, None, None, 1.0)?)
    }
}

impl Default for SatAgg<AggregPMeanError> {
    fn default() -> Self {
        Self::new(AggregPMeanError::new(2.0))
    }
}

/// Named axioms grounded for one training step.
///
/// Axioms keep their insertion order, so reports are stable across steps.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    axioms: IndexMap<String, Grounding>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self {
            axioms: IndexMap::new(),
        }
    }

    /// Add or replace an axiom.
    pub fn insert(&mut self, name: impl Into<String>, axiom: Grounding) {
        self.axioms.insert(name.into(), axiom);
    }

    pub fn get(&self, name: &str) -> Option<&Grounding> {
        self.axioms.get(name)
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.axioms.keys().map(String::as_str)
    }

    /// Satisfaction level of all axioms.
    pub fn sat_level<A: AggregOp>(&self, agg: &SatAgg<A>) -> Result<Tensor> {
        let named: Vec<(String, &Grounding)> = self.axioms.iter().map(|(k, v)| (k.clone(), v)).collect();
        let sat = agg.aggregate_named(&named)?;
        debug!(axioms = self.axioms.len(), "knowledge base aggregated");
        Ok(sat)
    }

    /// `1 - sat_level`, the quantity to minimise.
    pub fn loss<A: AggregOp>(&self, agg: &SatAgg<A>) -> Result<Tensor> {
        Ok(self.sat_level(agg)?.affine(-1.0, 1.0)?)
    }

    /// Truth value of every axiom, in insertion order.
    pub fn report(&self) -> Result<IndexMap<String, f32>> {
        let mut out = IndexMap::with_capacity(self.axioms.len());
        for (name, axiom) in &self.axioms {
            if !axiom.is_closed() {
                return Err(LtnError::UnquantifiedAxiom {
                    axiom: name.clone(),
                    free: axiom.active_doms().to_vec(),
                });
            }
            let value = axiom.tensor().flatten_all()?.to_dtype(DType::F32)?.to_vec1::<f32>()?;
            out.insert(name.clone(), value.first().copied().unwrap_or(f32::NAN));
        }
        Ok(out)
    }
}
