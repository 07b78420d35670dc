//! Aggregation operators: reduce one axis of a truth tensor.
//!
//! Every aggregator accepts an optional mask of the same shape as its input
//! (`1.0` = the entry counts, `0.0` = excluded). Excluded entries are dropped
//! from the reduction, not scored. A slice with no counting entry evaluates
//! to the caller-supplied `empty` value, and contributes no gradient.

use candle_core::{Result, Tensor};

use super::{pi_0, pi_1, DEFAULT_EPS};

/// A reduction along one axis.
pub trait AggregOp {
    /// Reduce `xs` along `dim`.
    ///
    /// # Arguments
    /// * `xs` - Truth values
    /// * `dim` - Axis to remove
    /// * `mask` - Optional 0/1 weights, same shape as `xs`
    /// * `p` - Exponent override for p-mean aggregators (ignored by others)
    /// * `empty` - Value of a slice where the mask excludes everything
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, p: Option<f64>, empty: f64)
        -> Result<Tensor>;
}

impl<A: AggregOp + ?Sized> AggregOp for Box<A> {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, p: Option<f64>, empty: f64) -> Result<Tensor> {
        (**self).aggregate(xs, dim, mask, p, empty)
    }
}

/// Mean over counting entries; empty slices read as 1 so later powers stay finite.
fn masked_mean(xs: &Tensor, dim: usize, mask: Option<&Tensor>) -> Result<(Tensor, Option<Tensor>)> {
    match mask {
        None => Ok((xs.mean(dim)?, None)),
        Some(mask) => {
            let count = mask.sum(dim)?;
            let nonempty = count.gt(&count.zeros_like()?)?;
            let mean = xs.mul(mask)?.sum(dim)?.div(&count.clamp(1.0, f64::INFINITY)?)?;
            let safe = nonempty.where_cond(&mean, &mean.ones_like()?)?;
            Ok((safe, Some(nonempty)))
        }
    }
}

/// Replace empty slices by `empty`.
fn fill_empty(out: Tensor, nonempty: Option<Tensor>, empty: f64) -> Result<Tensor> {
    match nonempty {
        None => Ok(out),
        Some(nonempty) => {
            let fallback = out.ones_like()?.affine(empty, 0.0)?;
            nonempty.where_cond(&out, &fallback)
        }
    }
}

/// Excluded entries take `fill`, which cannot win the min/max.
fn masked_fill(xs: &Tensor, mask: &Tensor, fill: f64) -> Result<Tensor> {
    let keep = mask.gt(&mask.zeros_like()?)?;
    keep.where_cond(xs, &xs.ones_like()?.affine(fill, 0.0)?)
}

fn nonempty_of(mask: Option<&Tensor>, dim: usize) -> Result<Option<Tensor>> {
    mask.map(|m| {
        let count = m.sum(dim)?;
        count.gt(&count.zeros_like()?)
    })
    .transpose()
}

/// Minimum (Gödel universal quantifier).
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregMin;

impl AggregOp for AggregMin {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, _p: Option<f64>, empty: f64) -> Result<Tensor> {
        let out = match mask {
            Some(m) => masked_fill(xs, m, 1.0)?.min(dim)?,
            None => xs.min(dim)?,
        };
        fill_empty(out, nonempty_of(mask, dim)?, empty)
    }
}

/// Maximum (Gödel existential quantifier).
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregMax;

impl AggregOp for AggregMax {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, _p: Option<f64>, empty: f64) -> Result<Tensor> {
        let out = match mask {
            Some(m) => masked_fill(xs, m, 0.0)?.max(dim)?,
            None => xs.max(dim)?,
        };
        fill_empty(out, nonempty_of(mask, dim)?, empty)
    }
}

/// Arithmetic mean.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregMean;

impl AggregOp for AggregMean {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, _p: Option<f64>, empty: f64) -> Result<Tensor> {
        let (mean, nonempty) = masked_mean(xs, dim, mask)?;
        fill_empty(mean, nonempty, empty)
    }
}

/// Generalized mean `(mean x^p)^(1/p)`: a soft maximum for existential quantification.
///
/// Larger `p` moves towards the maximum; `p = 1` is the arithmetic mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregPMean {
    pub p: f64,
    pub stable: bool,
    pub eps: f64,
}

impl AggregPMean {
    pub fn new(p: f64) -> Self {
        Self {
            p,
            stable: true,
            eps: DEFAULT_EPS,
        }
    }

    pub fn with_stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

impl Default for AggregPMean {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl AggregOp for AggregPMean {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, p: Option<f64>, empty: f64) -> Result<Tensor> {
        let p = p.unwrap_or(self.p);
        let xs = if self.stable { pi_0(xs, self.eps)? } else { xs.clone() };
        let (mean, nonempty) = masked_mean(&xs.powf(p)?, dim, mask)?;
        fill_empty(mean.powf(1.0 / p)?, nonempty, empty)
    }
}

/// Error-corrected generalized mean `1 - (mean (1-x)^p)^(1/p)`: a soft minimum
/// for universal quantification.
///
/// Larger `p` moves towards the minimum, i.e. penalizes outliers harder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregPMeanError {
    pub p: f64,
    pub stable: bool,
    pub eps: f64,
}

impl AggregPMeanError {
    pub fn new(p: f64) -> Self {
        Self {
            p,
            stable: true,
            eps: DEFAULT_EPS,
        }
    }

    pub fn with_stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }

    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }
}

impl Default for AggregPMeanError {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl AggregOp for AggregPMeanError {
    fn aggregate(&self, xs: &Tensor, dim: usize, mask: Option<&Tensor>, p: Option<f64>, empty: f64) -> Result<Tensor> {
        let p = p.unwrap_or(self.p);
        let xs = if self.stable { pi_1(xs, self.eps)? } else { xs.clone() };
        let errors = xs.affine(-1.0, 1.0)?.powf(p)?;
        let (mean, nonempty) = masked_mean(&errors, dim, mask)?;
        fill_empty(mean.powf(1.0 / p)?.affine(-1.0, 1.0)?, nonempty, empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::{Device, Var};

    fn t2(v: &[[f32; 3]; 2]) -> Tensor {
        Tensor::new(v, &Device::Cpu).unwrap()
    }

    fn close(got: &Tensor, want: &[f32]) {
        let got = got.to_vec1::<f32>().unwrap();
        for (g, w) in got.iter().zip(want) {
            assert!((g - w).abs() < 1e-4, "got {:?}, want {:?}", got, want);
        }
    }

    #[test]
    fn test_min_max_mean() {
        let xs = t2(&[[0.2, 0.8, 0.5], [1.0, 0.4, 0.4]]);
        close(&AggregMin.aggregate(&xs, 1, None, None, 1.0).unwrap(), &[0.2, 0.4]);
        close(&AggregMax.aggregate(&xs, 1, None, None, 0.0).unwrap(), &[0.8, 1.0]);
        close(&AggregMean.aggregate(&xs, 1, None, None, 1.0).unwrap(), &[0.5, 0.6]);
        close(&AggregMean.aggregate(&xs, 0, None, None, 1.0).unwrap(), &[0.6, 0.6, 0.45]);
    }

    #[test]
    fn test_pmean_p1_is_mean() {
        let xs = t2(&[[0.2, 0.8, 0.5], [1.0, 0.4, 0.4]]);
        let agg = AggregPMean::new(1.0).with_stable(false);
        close(&agg.aggregate(&xs, 1, None, None, 0.0).unwrap(), &[0.5, 0.6]);
        let err = AggregPMeanError::new(1.0).with_stable(false);
        close(&err.aggregate(&xs, 1, None, None, 1.0).unwrap(), &[0.5, 0.6]);
    }

    #[test]
    fn test_pmean_values() {
        let xs = Tensor::new(&[0.0f32, 1.0], &Device::Cpu).unwrap();
        // sqrt((0 + 1) / 2)
        let v = AggregPMean::new(2.0).with_stable(false).aggregate(&xs, 0, None, None, 0.0).unwrap();
        assert!((v.to_scalar::<f32>().unwrap() - 0.5f32.sqrt()).abs() < 1e-5);
        // 1 - sqrt((1 + 0) / 2)
        let v = AggregPMeanError::new(2.0).with_stable(false).aggregate(&xs, 0, None, None, 1.0).unwrap();
        assert!((v.to_scalar::<f32>().unwrap() - (1.0 - 0.5f32.sqrt())).abs() < 1e-5);
    }

    #[test]
    fn test_p_override_moves_towards_extremes() {
        let xs = Tensor::new(&[0.1f32, 0.9, 0.9, 0.9], &Device::Cpu).unwrap();
        let agg = AggregPMeanError::new(1.0);
        let soft = agg.aggregate(&xs, 0, None, None, 1.0).unwrap().to_scalar::<f32>().unwrap();
        let hard = agg.aggregate(&xs, 0, None, Some(10.0), 1.0).unwrap().to_scalar::<f32>().unwrap();
        assert!(hard < soft);
        let agg = AggregPMean::new(1.0);
        let soft = agg.aggregate(&xs, 0, None, None, 0.0).unwrap().to_scalar::<f32>().unwrap();
        let hard = agg.aggregate(&xs, 0, None, Some(10.0), 0.0).unwrap().to_scalar::<f32>().unwrap();
        assert!(hard > soft);
    }

    #[test]
    fn test_mask_excludes_rather_than_penalizes() {
        let xs = t2(&[[1.0, 0.0, 1.0], [0.0, 0.0, 0.0]]);
        let mask = t2(&[[1.0, 0.0, 1.0], [0.0, 0.0, 0.0]]);
        let agg = AggregPMeanError::new(2.0);
        let out = agg.aggregate(&xs, 1, Some(&mask), None, 1.0).unwrap().to_vec1::<f32>().unwrap();
        assert!(out[0] > 0.99, "excluded zero must not lower the row: {:?}", out);
        assert_eq!(out[1], 1.0);

        let out = AggregPMean::new(2.0).aggregate(&xs, 1, Some(&mask), None, 0.0).unwrap();
        assert_eq!(out.to_vec1::<f32>().unwrap()[1], 0.0);
    }

    #[test]
    fn test_masked_min_max() {
        let xs = t2(&[[0.1, 0.7, 0.9], [0.3, 0.2, 0.6]]);
        let mask = t2(&[[0.0, 1.0, 1.0], [0.0, 0.0, 0.0]]);
        close(&AggregMin.aggregate(&xs, 1, Some(&mask), None, 1.0).unwrap(), &[0.7, 1.0]);
        close(&AggregMax.aggregate(&xs, 1, Some(&mask), None, 0.0).unwrap(), &[0.9, 0.0]);
    }

    #[test]
    fn test_empty_mask_gradients_are_finite() {
        let var = Var::from_tensor(&t2(&[[0.3, 0.0, 1.0], [0.5, 0.5, 0.5]])).unwrap();
        let mask = t2(&[[1.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        for agg in [
            Box::new(AggregPMean::new(2.0)) as Box<dyn AggregOp>,
            Box::new(AggregPMeanError::new(2.0)),
            Box::new(AggregMean),
        ] {
            let out = agg.aggregate(var.as_tensor(), 1, Some(&mask), None, 1.0).unwrap();
            let grads = out.sum_all().unwrap().backward().unwrap();
            let g = grads.get(var.as_tensor()).unwrap().to_vec2::<f32>().unwrap();
            for row in &g {
                for v in row {
                    assert!(v.is_finite(), "non-finite gradient {:?}", g);
                }
            }
            assert_eq!(g[1], vec![0.0, 0.0, 0.0]);
        }
    }
}
