//! Connectives lifted from truth tensors to groundings.

use candle_core::Tensor;
use tracing::trace;

use crate::error::{LtnError, Result};
use crate::fuzzy::{BinaryOp, UnaryOp};
use crate::grounding::Grounding;
use crate::tensor::cross_grounding_values;

/// A negation applied to a formula grounding; the active domains are kept.
#[derive(Debug, Clone, Default)]
pub struct UnaryConnective<O> {
    op: O,
}

impl<O: UnaryOp> UnaryConnective<O> {
    pub fn new(op: O) -> Self {
        Self { op }
    }

    pub fn op(&self) -> &O {
        &self.op
    }

    pub fn apply(&self, formula: &Grounding) -> Result<Grounding> {
        formula.map(|t| self.op.apply(t))
    }
}

/// A binary connective applied over the union of both operands' variables.
///
/// `And(P(x), Q(y))` on `n` and `m` individuals yields an `[n, m]` grounding.
#[derive(Debug, Clone, Default)]
pub struct BinaryConnective<O> {
    op: O,
}

impl<O: BinaryOp> BinaryConnective<O> {
    pub fn new(op: O) -> Self {
        Self { op }
    }

    pub fn op(&self) -> &O {
        &self.op
    }

    pub fn apply(&self, lhs: &Grounding, rhs: &Grounding) -> Result<Grounding> {
        let crossed = cross_grounding_values(&[lhs, rhs], false)?;
        let [a, b]: [Tensor; 2] = crossed
            .tensors
            .try_into()
            .map_err(|_| LtnError::BroadcastShape("connective expected two aligned operands".into()))?;
        let tensor = self.op.apply(&a, &b)?;
        trace!(doms = ?crossed.doms, shape = ?tensor.dims(), "connective applied");
        Grounding::new(tensor, crossed.doms)
    }

    /// Left fold over two or more operands, e.g. `And(a, b, c) = And(And(a, b), c)`.
    pub fn fold(&self, operands: &[&Grounding]) -> Result<Grounding> {
        match operands {
            [] | [_] => Err(LtnError::InvalidArgument(format!(
                "binary connective needs at least two operands, got {}",
                operands.len()
            ))),
            [first, rest @ ..] => rest
                .iter()
                .try_fold((*first).clone(), |acc, next| self.apply(&acc, next)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{AndProd, NotStandard, OrMax};
    use candle_core::Device;

    fn g1(label: &str, v: &[f32]) -> Grounding {
        Grounding::new(Tensor::new(v, &Device::Cpu).unwrap(), vec![label.to_string()]).unwrap()
    }

    #[test]
    fn test_not_keeps_domains() {
        let not = UnaryConnective::new(NotStandard);
        let out = not.apply(&g1("x", &[0.25, 1.0])).unwrap();
        assert_eq!(out.active_doms(), &["x".to_string()]);
        assert_eq!(out.tensor().to_vec1::<f32>().unwrap(), vec![0.75, 0.0]);
    }

    #[test]
    fn test_and_over_disjoint_variables() {
        let and = BinaryConnective::new(AndProd::new(false));
        let out = and.apply(&g1("x", &[0.5, 1.0, 0.0]), &g1("y", &[0.5, 0.2])).unwrap();
        assert_eq!(out.active_doms(), &["x".to_string(), "y".to_string()]);
        assert_eq!(
            out.tensor().to_vec2::<f32>().unwrap(),
            vec![vec![0.25, 0.1], vec![0.5, 0.2], vec![0.0, 0.0]]
        );
    }

    #[test]
    fn test_shared_variable_stays_one_axis() {
        let and = BinaryConnective::new(AndProd::new(false));
        let out = and.apply(&g1("x", &[0.5, 1.0]), &g1("x", &[0.5, 0.2])).unwrap();
        assert_eq!(out.dims(), &[2]);
        assert_eq!(out.tensor().to_vec1::<f32>().unwrap(), vec![0.25, 0.2]);
    }

    #[test]
    fn test_closed_with_open() {
        let or = BinaryConnective::new(OrMax);
        let closed = Grounding::closed(Tensor::new(0.6f32, &Device::Cpu).unwrap());
        let out = or.apply(&closed, &g1("x", &[0.5, 0.9])).unwrap();
        assert_eq!(out.active_doms(), &["x".to_string()]);
        assert_eq!(out.tensor().to_vec1::<f32>().unwrap(), vec![0.6, 0.9]);
    }

    #[test]
    fn test_conflicting_rebinding() {
        let and = BinaryConnective::new(AndProd::default());
        let err = and.apply(&g1("x", &[0.5, 1.0]), &g1("x", &[0.5, 0.2, 0.1])).unwrap_err();
        assert!(matches!(err, LtnError::DomainConflict { .. }));
    }

    #[test]
    fn test_fold() {
        let and = BinaryConnective::new(AndProd::new(false));
        let (a, b, c) = (g1("x", &[0.5]), g1("y", &[0.5, 1.0]), g1("z", &[1.0, 0.5, 0.0]));
        let out = and.fold(&[&a, &b, &c]).unwrap();
        assert_eq!(out.dims(), &[1, 2, 3]);
        assert!(and.fold(&[&a]).is_err());
    }
}
