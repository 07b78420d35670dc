//! End-to-end training: learn a predicate from two universally quantified axioms.

use candle_core::{DType, Device, Tensor};
use candle_nn::optim::{AdamW, Optimizer, ParamsAdamW};
use candle_nn::{VarBuilder, VarMap};
use ltn::{Constant, Domain, FuzzySemantics, KnowledgeBase, Predicate, SatAgg, Variable};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Points of a 10x10 grid over the unit square, split by the disc of radius
/// 0.3 around the centre.
fn grid() -> (Vec<f32>, Vec<f32>) {
    let (mut inside, mut outside) = (Vec::new(), Vec::new());
    for i in 0..10 {
        for j in 0..10 {
            let (x, y) = (i as f32 / 9.0, j as f32 / 9.0);
            let d = ((x - 0.5).powi(2) + (y - 0.5).powi(2)).sqrt();
            let bucket = if d < 0.3 { &mut inside } else { &mut outside };
            bucket.extend([x, y]);
        }
    }
    (inside, outside)
}

fn points(v: Vec<f32>) -> Tensor {
    let n = v.len() / 2;
    Tensor::from_vec(v, (n, 2), &Device::Cpu).unwrap()
}

#[test]
fn test_training_increases_satisfaction() {
    init_tracing();
    let dev = Device::Cpu;
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &dev);
    let a = Predicate::mlp(&[2, 16, 16, 1], vb.pp("A")).unwrap();

    let space = Domain::new("points", [2]).unwrap();
    let (inside, outside) = grid();
    let x_a = Variable::new("x_A", &space, points(inside)).unwrap();
    let x_not_a = Variable::new("x_not_A", &space, points(outside)).unwrap();

    let sem = FuzzySemantics::product();
    let sat_agg = SatAgg::default();
    let build = || -> ltn::Result<KnowledgeBase> {
        let mut kb = KnowledgeBase::new();
        let pos = a.evaluate(&[x_a.grounding()])?;
        kb.insert("A(x_A)", sem.forall.apply(&[&x_a], &pos)?);
        let neg = sem.not.apply(&a.evaluate(&[x_not_a.grounding()])?)?;
        kb.insert("not A(x_not_A)", sem.forall.apply(&[&x_not_a], &neg)?);
        Ok(kb)
    };

    let initial = build().unwrap().sat_level(&sat_agg).unwrap().to_scalar::<f32>().unwrap();

    let params = ParamsAdamW {
        lr: 0.01,
        ..Default::default()
    };
    let mut opt = AdamW::new(varmap.all_vars(), params).unwrap();
    for _ in 0..300 {
        let loss = build().unwrap().loss(&sat_agg).unwrap();
        opt.backward_step(&loss).unwrap();
    }

    let kb = build().unwrap();
    let last = kb.sat_level(&sat_agg).unwrap().to_scalar::<f32>().unwrap();
    assert!(last > initial, "satisfaction went from {initial} to {last}");
    assert!(last.is_finite() && last <= 1.0);

    let report = kb.report().unwrap();
    assert_eq!(report.len(), 2);
    assert!(report.values().all(|v| (0.0..=1.0).contains(v)));
}

#[test]
fn test_trainable_constant_moves_towards_truth() {
    init_tracing();
    let dev = Device::Cpu;
    let space = Domain::new("points", [2]).unwrap();
    let c = Constant::new("c", &space, Tensor::new(&[0.0f32, 0.0], &dev).unwrap(), true).unwrap();

    // Fixed predicate: close to the point (1, 1).
    let near = Predicate::lambda(|xs: &[Tensor]| {
        let d = xs[0].affine(1.0, -1.0)?.sqr()?.sum(1)?;
        d.affine(-1.0, 0.0)?.exp()
    });

    let sat_agg = SatAgg::default();
    let build = || -> ltn::Result<KnowledgeBase> {
        let mut kb = KnowledgeBase::new();
        kb.insert("near(c)", near.evaluate_one(c.grounding())?);
        Ok(kb)
    };

    let before = build().unwrap().sat_level(&sat_agg).unwrap().to_scalar::<f32>().unwrap();
    let vars = c.var().into_iter().cloned().collect::<Vec<_>>();
    let mut opt = AdamW::new(vars, ParamsAdamW { lr: 0.05, ..Default::default() }).unwrap();
    for _ in 0..50 {
        let loss = build().unwrap().loss(&sat_agg).unwrap();
        opt.backward_step(&loss).unwrap();
    }
    let after = build().unwrap().sat_level(&sat_agg).unwrap().to_scalar::<f32>().unwrap();
    assert!(after > before, "near(c) went from {before} to {after}");
}
