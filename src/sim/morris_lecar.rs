//! Class-1 Morris–Lecar neuron driven by Poisson excitatory synapses.
//!
//! Each input is a presynaptic spike train at `freq` Hz feeding one synapse
//! with transmitter release `R` and binding `S`:
//!
//! ```text
//! dR/dt = a Q(VPre) - b R        Q(v) = 1 / (1 + exp(-k (v - thr)))
//! dS/dt = a R - b S
//! dN/dt = (N_ss(V) - N) / tau(V)
//! dV/dt = (Σ I_i - GL (V - VL) - GCa M_ss(V) (V - VCa) - GK N (V - VK)) / C
//! I_i   = (VSyn - V) GSyn_i S_i
//! ```
//!
//! integrated with forward Euler or Heun's method. The spike raster and the synaptic
//! conductances are drawn once from the model seed, so every backend and every
//! summation order integrates the same system.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::{debug, info};

use crate::core::trace::{TraceDir, TraceWriter};
use crate::error::{Result, TraceError};
use crate::sim::arith::Arith;
use crate::sim::ode::Stepper;

#[derive(Clone, Debug)]
pub struct MorrisLecarParams {
    /// Step size (ms).
    pub h: f64,
    pub steps: usize,
    /// Number of Poisson inputs.
    pub inputs: usize,
    /// Input rate (Hz).
    pub freq: f64,
    /// Presynaptic potential when silent / spiking (mV).
    pub v_lo: f64,
    pub v_hi: f64,
    pub v0: f64,
    pub n0: f64,
    pub gl: f64,
    pub gca: f64,
    pub gk: f64,
    pub vl: f64,
    pub vca: f64,
    pub vk: f64,
    pub v1: f64,
    pub v2: f64,
    pub v3: f64,
    pub v4: f64,
    pub phi: f64,
    pub c: f64,
    pub gsyn_mean: f64,
    pub gsyn_std: f64,
    pub vsyn: f64,
    pub thr: f64,
    pub a: f64,
    pub b: f64,
    pub k: f64,
    pub stepper: Stepper,
}

impl Default for MorrisLecarParams {
    fn default() -> Self {
        Self {
            h: 0.5,
            steps: 1000,
            inputs: 50,
            freq: 5.0,
            v_lo: -60.0,
            v_hi: 20.0,
            v0: -60.0,
            n0: 0.0,
            gl: 2.0,
            gca: 4.0,
            gk: 8.0,
            vl: -60.0,
            vca: 120.0,
            vk: -80.0,
            v1: -1.2,
            v2: 18.0,
            v3: 12.0,
            v4: 17.4,
            phi: 1.0 / 15.0,
            c: 20.0,
            gsyn_mean: 3.0,
            gsyn_std: 0.5,
            vsyn: 0.0,
            thr: -50.0,
            a: 0.25,
            b: 0.15,
            k: 1.0e6,
            stepper: Stepper::Euler,
        }
    }
}

/// Order in which synaptic currents are summed each step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SumOrder {
    AsIs,
    /// Fisher–Yates shuffle every step, seeded.
    Shuffled(u64),
    /// By increasing centre value.
    Ascending,
    /// By decreasing centre value.
    Descending,
}

/// Model state at the end of a step.
#[derive(Clone, Debug)]
pub struct State<V> {
    pub t: V,
    pub v: V,
    pub n: V,
    pub r: Vec<V>,
    pub s: Vec<V>,
}

impl<V: Clone> State<V> {
    /// `[V, N, R.., S..]`, the layout the stepper integrates.
    fn pack(&self) -> Vec<V> {
        let mut x = Vec::with_capacity(2 + self.r.len() + self.s.len());
        x.push(self.v.clone());
        x.push(self.n.clone());
        x.extend_from_slice(&self.r);
        x.extend_from_slice(&self.s);
        x
    }

    fn unpack(&mut self, x: Vec<V>) {
        let inputs = self.r.len();
        let mut it = x.into_iter();
        if let (Some(v), Some(n)) = (it.next(), it.next()) {
            self.v = v;
            self.n = n;
        }
        self.r = it.by_ref().take(inputs).collect();
        self.s = it.collect();
    }
}

pub trait Recorder<V> {
    fn record(&mut self, step: usize, state: &State<V>) -> Result<()>;
}

/// Keeps time, `V` and `N` in memory.
#[derive(Clone, Debug)]
pub struct MemoryRecorder<V> {
    pub t: Vec<V>,
    pub v: Vec<V>,
    pub n: Vec<V>,
}

impl<V> Default for MemoryRecorder<V> {
    fn default() -> Self {
        Self {
            t: Vec::new(),
            v: Vec::new(),
            n: Vec::new(),
        }
    }
}

impl<V: Clone> Recorder<V> for MemoryRecorder<V> {
    fn record(&mut self, _step: usize, state: &State<V>) -> Result<()> {
        self.t.push(state.t.clone());
        self.v.push(state.v.clone());
        self.n.push(state.n.clone());
        Ok(())
    }
}

/// Writes `time_000`, `nrn1_V_000`, `nrn1_N_000` and the first few
/// `syn_exc_R_<j>` / `syn_exc_S_<j>` traces.
pub struct TraceRecorder<V: crate::core::trace::TraceValue> {
    time: TraceWriter<V>,
    v: TraceWriter<V>,
    n: TraceWriter<V>,
    r: Vec<TraceWriter<V>>,
    s: Vec<TraceWriter<V>>,
}

impl<V: crate::core::trace::TraceValue> TraceRecorder<V> {
    pub fn create(dir: &TraceDir, synapses: usize) -> Result<Self> {
        let mut r = Vec::with_capacity(synapses);
        let mut s = Vec::with_capacity(synapses);
        for j in 0..synapses {
            r.push(TraceWriter::create(dir, &format!("syn_exc_R_{j:03}"))?);
            s.push(TraceWriter::create(dir, &format!("syn_exc_S_{j:03}"))?);
        }
        Ok(Self {
            time: TraceWriter::create(dir, "time_000")?,
            v: TraceWriter::create(dir, "nrn1_V_000")?,
            n: TraceWriter::create(dir, "nrn1_N_000")?,
            r,
            s,
        })
    }

    pub fn finish(self) -> Result<()> {
        self.time.finish()?;
        self.v.finish()?;
        self.n.finish()?;
        for w in self.r.into_iter().chain(self.s) {
            w.finish()?;
        }
        Ok(())
    }
}

impl<V: crate::core::trace::TraceValue> Recorder<V> for TraceRecorder<V> {
    fn record(&mut self, _step: usize, state: &State<V>) -> Result<()> {
        self.time.write(&state.t)?;
        self.v.write(&state.v)?;
        self.n.write(&state.n)?;
        for (w, r) in self.r.iter_mut().zip(&state.r) {
            w.write(r)?;
        }
        for (w, s) in self.s.iter_mut().zip(&state.s) {
            w.write(s)?;
        }
        Ok(())
    }
}

pub struct MorrisLecar {
    params: MorrisLecarParams,
    gsyn: Vec<f64>,
    /// `raster[step][input]`: whether the input is spiking during the step.
    raster: Vec<Vec<bool>>,
}

impl MorrisLecar {
    pub fn new(params: MorrisLecarParams, seed: u64) -> Result<Self> {
        if !(params.h > 0.0) {
            return Err(TraceError::Model(format!("step size must be positive, got {}", params.h)));
        }
        let normal = Normal::new(params.gsyn_mean, params.gsyn_std)
            .map_err(|e| TraceError::Model(format!("synaptic conductance: {e}")))?;
        let mut rng = StdRng::seed_from_u64(seed);
        let gsyn: Vec<f64> = (0..params.inputs).map(|_| normal.sample(&mut rng)).collect();

        // Probability that an input stays silent for one step.
        let p0 = (-(params.freq / 1000.0) * params.h).exp();
        let raster = (0..params.steps)
            .map(|_| {
                (0..params.inputs)
                    .map(|_| rng.random::<f64>() >= p0)
                    .collect()
            })
            .collect();
        Ok(Self {
            params,
            gsyn,
            raster,
        })
    }

    pub fn params(&self) -> &MorrisLecarParams {
        &self.params
    }

    pub fn gsyn(&self) -> &[f64] {
        &self.gsyn
    }

    pub fn raster(&self) -> &[Vec<bool>] {
        &self.raster
    }

    pub fn spike_count(&self) -> usize {
        self.raster.iter().flatten().filter(|&&f| f).count()
    }

    /// Transmitter release drive for a presynaptic potential.
    fn release(&self, spiking: bool) -> f64 {
        let p = &self.params;
        let v_pre = if spiking { p.v_hi } else { p.v_lo };
        1.0 / (1.0 + (-p.k * (v_pre - p.thr)).exp())
    }

    /// Integrate for `params.steps` steps, handing every state to `rec`.
    pub fn run<A, R>(&self, arith: &mut A, order: SumOrder, rec: &mut R) -> Result<State<A::Value>>
    where
        A: Arith,
        R: Recorder<A::Value>,
    {
        let p = &self.params;
        info!(
            backend = arith.name(),
            steps = p.steps,
            inputs = p.inputs,
            freq = p.freq,
            ?order,
            stepper = ?p.stepper,
            "running Morris-Lecar"
        );
        let mut shuffle_rng = match order {
            SumOrder::Shuffled(seed) => Some(StdRng::seed_from_u64(seed)),
            _ => None,
        };
        let zero = arith.constant(0.0);
        let mut st = State {
            t: zero.clone(),
            v: arith.constant(p.v0),
            n: arith.constant(p.n0),
            r: vec![zero.clone(); p.inputs],
            s: vec![zero; p.inputs],
        };
        let gsyn: Vec<A::Value> = self.gsyn.iter().map(|g| arith.constant(*g)).collect();
        let release = (self.release(false), self.release(true));

        for step in 0..p.steps {
            if step % 20 == 0 {
                debug!(step, v = arith.centre(&st.v), "step");
            }
            arith.begin_step();

            let spikes = &self.raster[step];
            let mut rhs = |arith: &mut A, _t: &A::Value, x: &[A::Value]| {
                self.derivative(arith, x, spikes, release, &gsyn, order, shuffle_rng.as_mut())
            };
            let x = p.stepper.step(arith, &mut rhs, &st.t, &st.pack(), p.h);
            st.unpack(x);
            st.t = arith.add_scalar(&st.t, p.h);

            arith.settle(&mut st.n, step);
            arith.settle(&mut st.v, step);
            for x in st.r.iter_mut().chain(st.s.iter_mut()) {
                arith.settle(x, step);
            }
            rec.record(step, &st)?;
        }
        info!(backend = arith.name(), v = arith.centre(&st.v), "finished");
        Ok(st)
    }

    /// `d[V, N, R.., S..]/dt` with the inputs of one step's spike column.
    #[allow(clippy::too_many_arguments)]
    fn derivative<A: Arith>(
        &self,
        arith: &mut A,
        x: &[A::Value],
        spikes: &[bool],
        (q_lo, q_hi): (f64, f64),
        gsyn: &[A::Value],
        order: SumOrder,
        shuffle_rng: Option<&mut StdRng>,
    ) -> Vec<A::Value> {
        let p = &self.params;
        let (v, n) = (&x[0], &x[1]);
        let (r, s) = x[2..].split_at(p.inputs);

        let dn = self.d_n(arith, v, n);
        let dv = self.d_v(arith, v, n, s, gsyn, order, shuffle_rng);
        let mut dx = Vec::with_capacity(x.len());
        dx.push(dv);
        dx.push(dn);
        let mut ds = Vec::with_capacity(p.inputs);
        for (j, spiking) in spikes.iter().enumerate() {
            let q = if *spiking { q_hi } else { q_lo };
            let rise = arith.constant(p.a * q);
            let decay = arith.scale(&r[j], p.b);
            dx.push(arith.sub(&rise, &decay));
            let rise = arith.scale(&r[j], p.a);
            let decay = arith.scale(&s[j], p.b);
            ds.push(arith.sub(&rise, &decay));
        }
        dx.extend(ds);
        dx
    }

    /// `(N_ss(V) - N) / tau(V)`.
    fn d_n<A: Arith>(&self, arith: &mut A, v: &A::Value, n: &A::Value) -> A::Value {
        let p = &self.params;
        let dv3 = arith.add_scalar(v, -p.v3);
        let n_ss = steady_state(arith, &dv3, p.v4);

        let w = div_scalar(arith, &dv3, 2.0 * p.v4);
        let minus_w = arith.neg(&w);
        let e_neg = arith.exp(&minus_w);
        let e_pos = arith.exp(&w);
        let cosh = arith.add(&e_neg, &e_pos);
        let cosh = div_scalar(arith, &cosh, 2.0);
        let rate = arith.scale(&cosh, p.phi);
        let one = arith.constant(1.0);
        let tau = arith.div(&one, &rate);

        let gap = arith.sub(&n_ss, n);
        arith.div(&gap, &tau)
    }

    #[allow(clippy::too_many_arguments)]
    fn d_v<A: Arith>(
        &self,
        arith: &mut A,
        v: &A::Value,
        n: &A::Value,
        s: &[A::Value],
        gsyn: &[A::Value],
        order: SumOrder,
        shuffle_rng: Option<&mut StdRng>,
    ) -> A::Value {
        let p = &self.params;
        let dv1 = arith.add_scalar(v, -p.v1);
        let m_ss = steady_state(arith, &dv1, p.v2);

        let minus_v = arith.neg(v);
        let drive = arith.add_scalar(&minus_v, p.vsyn);
        let mut currents: Vec<A::Value> = gsyn
            .iter()
            .zip(s)
            .map(|(g, sj)| {
                let i = arith.mul(&drive, g);
                arith.mul(&i, sj)
            })
            .collect();
        match order {
            SumOrder::AsIs => {}
            SumOrder::Shuffled(_) => {
                if let Some(rng) = shuffle_rng {
                    currents.shuffle(rng);
                }
            }
            SumOrder::Ascending => {
                currents.sort_by(|a, b| arith.centre(a).total_cmp(&arith.centre(b)));
            }
            SumOrder::Descending => {
                currents.sort_by(|a, b| arith.centre(b).total_cmp(&arith.centre(a)));
            }
        }
        let mut total = arith.sum(&currents);

        let leak = arith.add_scalar(v, -p.vl);
        let leak = arith.scale(&leak, p.gl);
        total = arith.sub(&total, &leak);

        let ca = arith.add_scalar(v, -p.vca);
        let ca = arith.scale(&ca, p.gca);
        let ca = arith.mul(&ca, &m_ss);
        total = arith.sub(&total, &ca);

        let k = arith.add_scalar(v, -p.vk);
        let k = arith.scale(&k, p.gk);
        let k = arith.mul(&k, n);
        total = arith.sub(&total, &k);

        div_scalar(arith, &total, p.c)
    }
}

fn div_scalar<A: Arith>(arith: &mut A, x: &A::Value, k: f64) -> A::Value {
    let k = arith.constant(k);
    arith.div(x, &k)
}

/// `1 / (1 + exp(-2 d / slope))` for `d = V - V_half`.
fn steady_state<A: Arith>(arith: &mut A, d: &A::Value, slope: f64) -> A::Value {
    let x = arith.scale(d, -2.0);
    let x = div_scalar(arith, &x, slope);
    let e = arith.exp(&x);
    let denom = arith.add_scalar(&e, 1.0);
    let one = arith.constant(1.0);
    arith.div(&one, &denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arith::{AffineArith, FloatArith, IntervalArith, Reduction};

    fn short() -> MorrisLecarParams {
        MorrisLecarParams {
            steps: 200,
            ..MorrisLecarParams::default()
        }
    }

    #[test]
    fn raster_and_conductances_are_seeded() {
        let a = MorrisLecar::new(short(), 7).unwrap();
        let b = MorrisLecar::new(short(), 7).unwrap();
        assert_eq!(a.raster(), b.raster());
        assert_eq!(a.gsyn(), b.gsyn());
        assert_eq!(a.gsyn().len(), 50);
    }

    #[test]
    fn release_saturates_at_threshold() {
        let m = MorrisLecar::new(short(), 1).unwrap();
        assert_eq!(m.release(false), 0.0);
        assert_eq!(m.release(true), 1.0);
    }

    #[test]
    fn silent_inputs_leave_neuron_at_rest() {
        let params = MorrisLecarParams {
            freq: 0.0,
            steps: 50,
            ..MorrisLecarParams::default()
        };
        let m = MorrisLecar::new(params, 3).unwrap();
        assert_eq!(m.spike_count(), 0);
        let mut rec = MemoryRecorder::default();
        let st = m.run(&mut FloatArith, SumOrder::AsIs, &mut rec).unwrap();
        assert_eq!(rec.v.len(), 50);
        assert!((rec.t[0] - 0.5).abs() < 1e-12);
        // Leak reversal equals the initial potential; only the Ca++/K+
        // currents move V, and only slightly.
        assert!((st.v + 60.0).abs() < 1.0, "V drifted to {}", st.v);
        assert!(st.s.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn interval_and_affine_runs_enclose_the_float_run() {
        let m = MorrisLecar::new(
            MorrisLecarParams {
                steps: 40,
                freq: 50.0,
                ..MorrisLecarParams::default()
            },
            11,
        )
        .unwrap();
        let mut f = MemoryRecorder::default();
        m.run(&mut FloatArith, SumOrder::AsIs, &mut f).unwrap();
        let mut i = MemoryRecorder::default();
        m.run(&mut IntervalArith, SumOrder::AsIs, &mut i).unwrap();
        let mut a = MemoryRecorder::default();
        m.run(&mut AffineArith::new(Reduction::default()), SumOrder::AsIs, &mut a)
            .unwrap();
        for k in 0..40 {
            let tol = 1e-9 * (1.0 + f.v[k].abs());
            let iv = i.v[k];
            assert!(iv.lo - tol <= f.v[k] && f.v[k] <= iv.hi + tol, "step {k}: {iv}");
            let av = a.v[k].bounds();
            assert!(av.lo - tol <= f.v[k] && f.v[k] <= av.hi + tol, "step {k}: {av}");
        }
    }

    #[test]
    fn sum_orders_differ_only_by_rounding() {
        let m = MorrisLecar::new(
            MorrisLecarParams {
                steps: 100,
                freq: 40.0,
                ..MorrisLecarParams::default()
            },
            5,
        )
        .unwrap();
        let run = |order| {
            let mut rec = MemoryRecorder::default();
            m.run(&mut FloatArith, order, &mut rec).unwrap();
            rec.v
        };
        let asc = run(SumOrder::Ascending);
        let desc = run(SumOrder::Descending);
        let shuf = run(SumOrder::Shuffled(9));
        for k in 0..100 {
            assert!((asc[k] - desc[k]).abs() < 1e-6);
            assert!((asc[k] - shuf[k]).abs() < 1e-6);
        }
    }

    #[test]
    fn heun_runs_enclose_the_float_run() {
        let params = MorrisLecarParams {
            steps: 40,
            freq: 40.0,
            stepper: Stepper::Rk2,
            ..MorrisLecarParams::default()
        };
        let m = MorrisLecar::new(params.clone(), 11).unwrap();
        let mut f = MemoryRecorder::default();
        m.run(&mut FloatArith, SumOrder::AsIs, &mut f).unwrap();
        let mut a = MemoryRecorder::default();
        m.run(&mut AffineArith::new(Reduction::default()), SumOrder::AsIs, &mut a)
            .unwrap();
        for k in 0..40 {
            let tol = 1e-9 * (1.0 + f.v[k].abs());
            let av = a.v[k].bounds();
            assert!(av.lo - tol <= f.v[k] && f.v[k] <= av.hi + tol, "step {k}: {av}");
        }

        let euler = MorrisLecar::new(
            MorrisLecarParams {
                stepper: Stepper::Euler,
                ..params
            },
            11,
        )
        .unwrap();
        let mut e = MemoryRecorder::default();
        euler.run(&mut FloatArith, SumOrder::AsIs, &mut e).unwrap();
        assert_eq!(e.t, f.t);
        assert!(e.v.iter().zip(&f.v).any(|(x, y)| x != y));
    }
}
