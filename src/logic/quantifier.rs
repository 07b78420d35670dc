//! Quantifiers: aggregate a formula over the axes of quantified variables.
//!
//! All quantified axes are reduced at once: they are moved to the end,
//! flattened into a single axis and aggregated, so the result does not depend
//! on a reduction order. A guard (mask) restricts which tuples of individuals
//! take part in the aggregation.

use candle_core::{DType, Tensor};
use tracing::{debug, trace, warn};

use crate::error::{LtnError, Result};
use crate::fuzzy::AggregOp;
use crate::grounding::{Grounding, Variable};
use crate::tensor::cross_grounding_values;

/// Which logical quantifier an aggregator implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantification {
    Forall,
    Exists,
}

impl Quantification {
    /// Truth value of the quantifier over an empty set of individuals.
    pub fn empty_value(self) -> f64 {
        match self {
            Quantification::Forall => 1.0,
            Quantification::Exists => 0.0,
        }
    }
}

/// Boolean-valued guard over the raw groundings of some variables.
pub type MaskFn<'a> = Box<dyn Fn(&[Tensor]) -> candle_core::Result<Tensor> + 'a>;

/// A guard: tuples where `predicate` is false (zero) are left out.
///
/// The predicate receives the crossed, flattened groundings of `vars`, one
/// tensor per variable with one row per tuple, and returns one value per row.
pub struct Mask<'a> {
    vars: Vec<&'a Grounding>,
    predicate: MaskFn<'a>,
}

impl<'a> Mask<'a> {
    pub fn new<F>(vars: &[&'a Grounding], predicate: F) -> Self
    where
        F: Fn(&[Tensor]) -> candle_core::Result<Tensor> + 'a,
    {
        Self {
            vars: vars.to_vec(),
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard as a 0/1 grounding over the mask variables.
    fn evaluate(&self, dtype: DType) -> Result<Grounding> {
        let crossed = cross_grounding_values(&self.vars, true)?;
        let raw = (self.predicate)(&crossed.tensors)?;
        let rows = crossed.flat_len();
        if raw.elem_count() != rows {
            return Err(LtnError::ShapeMismatch {
                expected: format!("one mask value per tuple ({})", rows),
                got: format!("{:?}", raw.dims()),
            });
        }
        let keep = raw.ne(&raw.zeros_like()?)?.to_dtype(dtype)?;
        let tensor = keep.reshape(crossed.dims0.clone())?;
        Ok(Grounding::from_parts(tensor, crossed.doms))
    }
}

/// Per-call quantifier settings.
#[derive(Default)]
pub struct QuantifierOptions<'a> {
    /// Aggregation exponent override (annealing schedules raise it over training)
    pub p: Option<f64>,
    pub mask: Option<Mask<'a>>,
}

impl<'a> QuantifierOptions<'a> {
    pub fn with_p(mut self, p: f64) -> Self {
        self.p = Some(p);
        self
    }

    pub fn with_mask(mut self, mask: Mask<'a>) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// A quantifier backed by an aggregation operator.
#[derive(Debug, Clone)]
pub struct Quantifier<A> {
    aggregator: A,
    kind: Quantification,
}

impl<A: AggregOp> Quantifier<A> {
    pub fn new(aggregator: A, kind: Quantification) -> Self {
        Self { aggregator, kind }
    }

    pub fn forall(aggregator: A) -> Self {
        Self::new(aggregator, Quantification::Forall)
    }

    pub fn exists(aggregator: A) -> Self {
        Self::new(aggregator, Quantification::Exists)
    }

    pub fn kind(&self) -> Quantification {
        self.kind
    }

    pub fn aggregator(&self) -> &A {
        &self.aggregator
    }

    /// Quantify `formula` over `vars` with default options.
    pub fn apply(&self, vars: &[&Variable], formula: &Grounding) -> Result<Grounding> {
        self.apply_with(vars, formula, QuantifierOptions::default())
    }

    /// Quantify `formula` over `vars`.
    ///
    /// # Example
    /// ```
    /// use candle_core::{Device, Tensor};
    /// use ltn::{AggregPMeanError, Domain, Mask, Quantifier, QuantifierOptions, Variable, Grounding};
    ///
    /// let d = Domain::scalar("n");
    /// let x = Variable::new("x", &d, Tensor::new(&[0f32, 1.], &Device::Cpu).unwrap()).unwrap();
    /// let y = Variable::new("y", &d, Tensor::new(&[0f32, 1.], &Device::Cpu).unwrap()).unwrap();
    /// let p = Grounding::new(
    ///     Tensor::new(&[[1f32, 0.], [0., 1.]], &Device::Cpu).unwrap(),
    ///     vec!["x".into(), "y".into()],
    /// ).unwrap();
    ///
    /// // forall x, y with x == y: P(x, y)
    /// let forall = Quantifier::forall(AggregPMeanError::new(2.0));
    /// let mask = Mask::new(&[x.grounding(), y.grounding()], |v: &[Tensor]| v[0].eq(&v[1]));
    /// let sat = forall
    ///     .apply_with(&[&x, &y], &p, QuantifierOptions::default().with_mask(mask))
    ///     .unwrap();
    /// assert!(sat.tensor().to_scalar::<f32>().unwrap() > 0.99);
    /// ```
    pub fn apply_with(&self, vars: &[&Variable], formula: &Grounding, options: QuantifierOptions<'_>) -> Result<Grounding> {
        let labels: Vec<&str> = vars.iter().map(|v| v.name()).collect();
        self.apply_labels(&labels, formula, options)
    }

    /// Quantify `formula` over the variables named by `labels`.
    pub fn apply_labels(&self, labels: &[&str], formula: &Grounding, options: QuantifierOptions<'_>) -> Result<Grounding> {
        if !formula.value_shape().is_empty() {
            return Err(LtnError::InvalidArgument(format!(
                "quantified formula must be truth-valued, got value axes {:?}",
                formula.value_shape()
            )));
        }

        let (formula, mask) = match &options.mask {
            Some(mask) => {
                let guard = mask.evaluate(formula.tensor().dtype())?;
                let crossed = cross_grounding_values(&[formula, &guard], false)?;
                let doms = crossed.doms.clone();
                let mut aligned = crossed.tensors.into_iter();
                match (aligned.next(), aligned.next()) {
                    (Some(f), Some(m)) => {
                        trace!(?doms, guard_doms = ?guard.active_doms(), "mask applied");
                        (Grounding::from_parts(f, doms), Some(m))
                    }
                    _ => return Err(LtnError::BroadcastShape("mask alignment lost an operand".into())),
                }
            }
            None => (formula.clone(), None),
        };

        let doms = formula.active_doms();
        let mut quantified: Vec<usize> = Vec::new();
        for label in labels {
            match doms.iter().position(|d| d == label) {
                Some(axis) if !quantified.contains(&axis) => quantified.push(axis),
                Some(_) => {}
                None => warn!(label, ?doms, "quantified variable is not free in the formula"),
            }
        }
        if quantified.is_empty() {
            return Ok(formula);
        }
        quantified.sort_unstable();

        let kept: Vec<usize> = (0..doms.len()).filter(|a| !quantified.contains(a)).collect();
        let dims = formula.dims();
        let kept_dims: Vec<usize> = kept.iter().map(|&a| dims[a]).collect();
        let reduced_len: usize = quantified.iter().map(|&a| dims[a]).product();
        let kept_doms: Vec<String> = kept.iter().map(|&a| doms[a].clone()).collect();

        if reduced_len == 0 {
            let tensor = Tensor::ones(kept_dims, formula.tensor().dtype(), formula.tensor().device())?
                .affine(self.kind.empty_value(), 0.0)?;
            return Ok(Grounding::from_parts(tensor, kept_doms));
        }

        let perm: Vec<usize> = kept.iter().chain(quantified.iter()).copied().collect();
        let mut flat_shape = kept_dims.clone();
        flat_shape.push(reduced_len);
        let flatten = |t: &Tensor| -> Result<Tensor> { Ok(t.permute(perm.clone())?.contiguous()?.reshape(flat_shape.clone())?) };

        let xs = flatten(formula.tensor())?;
        let mask = mask.as_ref().map(flatten).transpose()?;
        let tensor = self
            .aggregator
            .aggregate(&xs, kept_dims.len(), mask.as_ref(), options.p, self.kind.empty_value())?;

        debug!(kind = ?self.kind, quantified = ?labels, remaining = ?kept_doms, p = ?options.p, "quantifier applied");
        Ok(Grounding::from_parts(tensor, kept_doms))
    }
}
