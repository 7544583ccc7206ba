//! The Hénon map `x' = 1 - a x² + y`, `y' = b x`, started from a small box
//! around the origin. Its two coupled variables share noise symbols, which
//! makes it the smallest interesting input for the joint-range plots.

use tracing::info;

use crate::core::trace::{TraceDir, TraceWriter};
use crate::error::Result;
use crate::sim::arith::{AffineArith, Arith, FloatArith, IntervalArith, Reduction};
use crate::sim::Backend;

#[derive(Clone, Debug)]
pub struct HenonParams {
    pub a: f64,
    pub b: f64,
    pub x0: f64,
    pub y0: f64,
    /// Initial uncertainty of both coordinates.
    pub radius: f64,
    pub steps: usize,
}

impl Default for HenonParams {
    fn default() -> Self {
        Self {
            a: 1.057,
            b: 0.3,
            x0: 0.0,
            y0: 0.0,
            radius: 1e-5,
            steps: 500,
        }
    }
}

/// All iterates `(x_k, y_k)`, `k = 1..=steps`.
pub fn iterate<A: Arith>(params: &HenonParams, arith: &mut A) -> Vec<(A::Value, A::Value)> {
    let mut x = arith.uncertain(params.x0, params.radius);
    let mut y = arith.uncertain(params.y0, params.radius);
    let mut out = Vec::with_capacity(params.steps);
    for step in 0..params.steps {
        arith.begin_step();
        let xx = arith.mul(&x, &x);
        let axx = arith.scale(&xx, params.a);
        let one = arith.constant(1.0);
        let x_new = arith.sub(&one, &axx);
        let mut x_new = arith.add(&x_new, &y);
        let mut y_new = arith.scale(&x, params.b);
        arith.settle(&mut x_new, step);
        arith.settle(&mut y_new, step);
        x = x_new;
        y = y_new;
        out.push((x.clone(), y.clone()));
    }
    out
}

/// Iterate and write `henon_x`, `henon_y` and `time_000` (the iteration
/// index) into `dir`.
pub fn write<A: Arith>(params: &HenonParams, arith: &mut A, dir: &TraceDir) -> Result<()> {
    info!(backend = arith.name(), a = params.a, steps = params.steps, "iterating Hénon map");
    let mut wx = TraceWriter::<A::Value>::create(dir, "henon_x")?;
    let mut wy = TraceWriter::<A::Value>::create(dir, "henon_y")?;
    let mut wt = TraceWriter::<A::Value>::create(dir, "time_000")?;
    for (k, (x, y)) in iterate(params, arith).iter().enumerate() {
        wx.write(x)?;
        wy.write(y)?;
        wt.write(&arith.constant((k + 1) as f64))?;
    }
    wx.finish()?;
    wy.finish()?;
    wt.finish()
}

pub fn write_backend(
    params: &HenonParams,
    backend: Backend,
    reduction: Reduction,
    dir: &TraceDir,
) -> Result<()> {
    match backend {
        Backend::Float => write(params, &mut FloatArith, dir),
        Backend::Interval => write(params, &mut IntervalArith, dir),
        Backend::Affine => write(params, &mut AffineArith::new(reduction), dir),
    }
}
