//! Directory layouts consumed by the experiments.
//!
//! ```text
//! ensemble/            sweep/
//!   i_0/ .. i_<n-1>/     in_0_freq_0/
//!   ascending/           in_0_freq_2/
//!   descending/          ...
//!   mpfi/
//!   arpra/
//! ```

use std::path::Path;

use tracing::info;

use crate::core::trace::TraceDir;
use crate::error::Result;
use crate::sim::arith::{AffineArith, Arith, FloatArith, IntervalArith, Reduction};
use crate::sim::morris_lecar::{MorrisLecar, MorrisLecarParams, SumOrder, TraceRecorder};
use crate::sim::Backend;

pub const ASCENDING_DIR: &str = "ascending";
pub const DESCENDING_DIR: &str = "descending";
pub const INTERVAL_DIR: &str = "mpfi";
pub const AFFINE_DIR: &str = "arpra";

/// Directory of the `k`-th shuffled float run.
pub fn member_dir(k: usize) -> String {
    format!("i_{k}")
}

/// Directory of one sweep cell.
pub fn sweep_dir(inputs: usize, freq: usize) -> String {
    format!("in_{inputs}_freq_{freq}")
}

/// Run `model` with `arith` and write its traces to `dir`.
pub fn write_run<A: Arith>(
    model: &MorrisLecar,
    arith: &mut A,
    order: SumOrder,
    dir: &TraceDir,
    synapses: usize,
) -> Result<()> {
    let synapses = synapses.min(model.params().inputs);
    let mut rec = TraceRecorder::<A::Value>::create(dir, synapses)?;
    model.run(arith, order, &mut rec)?;
    rec.finish()?;
    info!(dir = %dir.path().display(), backend = arith.name(), "run written");
    Ok(())
}

/// Single run with a backend chosen at runtime.
pub fn write_backend_run(
    model: &MorrisLecar,
    backend: Backend,
    order: SumOrder,
    reduction: Reduction,
    dir: &TraceDir,
    synapses: usize,
) -> Result<()> {
    match backend {
        Backend::Float => write_run(model, &mut FloatArith, order, dir, synapses),
        Backend::Interval => write_run(model, &mut IntervalArith, order, dir, synapses),
        Backend::Affine => {
            write_run(model, &mut AffineArith::new(reduction), order, dir, synapses)
        }
    }
}

#[derive(Clone, Debug)]
pub struct EnsembleSpec {
    pub samples: usize,
    /// Model seed; shuffle seeds are `seed + 1 + k`.
    pub seed: u64,
    pub synapses: usize,
    pub reduction: Reduction,
}

/// Float ensemble with shuffled summation, the two sorted orders, and one
/// interval and one affine run, all of the same model.
pub fn ensemble(params: &MorrisLecarParams, spec: &EnsembleSpec, root: &Path) -> Result<()> {
    let model = MorrisLecar::new(params.clone(), spec.seed)?;
    let root = TraceDir::new(root);
    info!(samples = spec.samples, spikes = model.spike_count(), "writing ensemble");
    for k in 0..spec.samples {
        let order = SumOrder::Shuffled(spec.seed.wrapping_add(1 + k as u64));
        write_run(&model, &mut FloatArith, order, &root.subdir(&member_dir(k)), spec.synapses)?;
    }
    let runs = [
        (ASCENDING_DIR, Backend::Float, SumOrder::Ascending),
        (DESCENDING_DIR, Backend::Float, SumOrder::Descending),
        (INTERVAL_DIR, Backend::Interval, SumOrder::AsIs),
        (AFFINE_DIR, Backend::Affine, SumOrder::AsIs),
    ];
    for (name, backend, order) in runs {
        write_backend_run(&model, backend, order, spec.reduction, &root.subdir(name), spec.synapses)?;
    }
    Ok(())
}

#[derive(Clone, Debug)]
pub struct SweepSpec {
    /// Cells per axis.
    pub size: usize,
    pub input_step: usize,
    pub freq_step: usize,
    pub seed: u64,
    pub reduction: Reduction,
}

/// Affine runs over a grid of input counts and input rates.
pub fn sweep(params: &MorrisLecarParams, spec: &SweepSpec, root: &Path) -> Result<()> {
    let root = TraceDir::new(root);
    for i in 0..spec.size {
        for j in 0..spec.size {
            let (inputs, freq) = (i * spec.input_step, j * spec.freq_step);
            let cell = MorrisLecarParams {
                inputs,
                freq: freq as f64,
                ..params.clone()
            };
            let model = MorrisLecar::new(cell, spec.seed)?;
            let dir = root.subdir(&sweep_dir(inputs, freq));
            write_run(&model, &mut AffineArith::new(spec.reduction), SumOrder::AsIs, &dir, 0)?;
        }
    }
    Ok(())
}
