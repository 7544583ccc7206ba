//! Number backends for the simulations.
//!
//! Models are written once against [`Arith`] and run in plain `f64`, interval
//! or affine arithmetic. Backends own whatever state their values need (the
//! affine backend owns the noise-symbol counter).

use crate::core::affine::{AffineForm, Symbol, SymbolSource};
use crate::core::interval::Interval;
use crate::core::trace::TraceValue;

pub trait Arith {
    type Value: Clone + TraceValue;

    /// Directory-friendly backend name.
    fn name(&self) -> &'static str;

    fn constant(&mut self, x: f64) -> Self::Value;

    /// `centre ± radius`. Backends without a notion of width return the centre.
    fn uncertain(&mut self, centre: f64, radius: f64) -> Self::Value;

    fn add(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn sub(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn mul(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn div(&mut self, a: &Self::Value, b: &Self::Value) -> Self::Value;
    fn neg(&mut self, a: &Self::Value) -> Self::Value;
    fn exp(&mut self, a: &Self::Value) -> Self::Value;

    fn scale(&mut self, a: &Self::Value, k: f64) -> Self::Value {
        let k = self.constant(k);
        self.mul(a, &k)
    }

    fn add_scalar(&mut self, a: &Self::Value, k: f64) -> Self::Value {
        let k = self.constant(k);
        self.add(a, &k)
    }

    /// Left-to-right sum in the order given.
    fn sum(&mut self, terms: &[Self::Value]) -> Self::Value {
        let mut acc = self.constant(0.0);
        for t in terms {
            acc = self.add(&acc, t);
        }
        acc
    }

    /// Representative point, used to order summands.
    fn centre(&self, a: &Self::Value) -> f64;

    /// Called before a step's arithmetic.
    fn begin_step(&mut self) {}

    /// Called on every state variable after the step's update.
    fn settle(&mut self, _value: &mut Self::Value, _step: usize) {}
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FloatArith;

impl Arith for FloatArith {
    type Value = f64;

    fn name(&self) -> &'static str {
        "float"
    }

    fn constant(&mut self, x: f64) -> f64 {
        x
    }

    fn uncertain(&mut self, centre: f64, _radius: f64) -> f64 {
        centre
    }

    fn add(&mut self, a: &f64, b: &f64) -> f64 {
        a + b
    }

    fn sub(&mut self, a: &f64, b: &f64) -> f64 {
        a - b
    }

    fn mul(&mut self, a: &f64, b: &f64) -> f64 {
        a * b
    }

    fn div(&mut self, a: &f64, b: &f64) -> f64 {
        a / b
    }

    fn neg(&mut self, a: &f64) -> f64 {
        -a
    }

    fn exp(&mut self, a: &f64) -> f64 {
        a.exp()
    }

    fn scale(&mut self, a: &f64, k: f64) -> f64 {
        a * k
    }

    fn add_scalar(&mut self, a: &f64, k: f64) -> f64 {
        a + k
    }

    fn centre(&self, a: &f64) -> f64 {
        *a
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IntervalArith;

impl Arith for IntervalArith {
    type Value = Interval;

    fn name(&self) -> &'static str {
        "interval"
    }

    fn constant(&mut self, x: f64) -> Interval {
        Interval::point(x)
    }

    fn uncertain(&mut self, centre: f64, radius: f64) -> Interval {
        Interval::from_centre_radius(centre, radius)
    }

    fn add(&mut self, a: &Interval, b: &Interval) -> Interval {
        a.add(b)
    }

    fn sub(&mut self, a: &Interval, b: &Interval) -> Interval {
        a.sub(b)
    }

    fn mul(&mut self, a: &Interval, b: &Interval) -> Interval {
        a.mul(b)
    }

    fn div(&mut self, a: &Interval, b: &Interval) -> Interval {
        a.div(b)
    }

    fn neg(&mut self, a: &Interval) -> Interval {
        a.neg()
    }

    fn exp(&mut self, a: &Interval) -> Interval {
        a.exp()
    }

    fn scale(&mut self, a: &Interval, k: f64) -> Interval {
        a.scale(k)
    }

    fn centre(&self, a: &Interval) -> f64 {
        a.centre()
    }
}

/// Term-reduction policy for affine runs.
#[derive(Clone, Copy, Debug)]
pub struct Reduction {
    /// Apply `reduce_small` every this many steps; 0 disables it.
    pub epoch: usize,
    pub min_fraction: f64,
    /// Merge the terms created during a step into one.
    pub merge_step_terms: bool,
    /// Hard cap on terms per form; 0 means unlimited.
    pub max_terms: usize,
}

impl Default for Reduction {
    fn default() -> Self {
        Self {
            epoch: 50,
            min_fraction: 0.3,
            merge_step_terms: true,
            max_terms: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AffineArith {
    src: SymbolSource,
    reduction: Reduction,
    step_mark: Symbol,
}

impl AffineArith {
    pub fn new(reduction: Reduction) -> Self {
        Self {
            src: SymbolSource::new(),
            reduction,
            step_mark: 0,
        }
    }

    pub fn symbols_issued(&self) -> Symbol {
        self.src.peek()
    }
}

impl Arith for AffineArith {
    type Value = AffineForm;

    fn name(&self) -> &'static str {
        "affine"
    }

    fn constant(&mut self, x: f64) -> AffineForm {
        AffineForm::constant(x)
    }

    fn uncertain(&mut self, centre: f64, radius: f64) -> AffineForm {
        AffineForm::with_radius(centre, radius, &mut self.src)
    }

    fn add(&mut self, a: &AffineForm, b: &AffineForm) -> AffineForm {
        a.add(b, &mut self.src)
    }

    fn sub(&mut self, a: &AffineForm, b: &AffineForm) -> AffineForm {
        a.sub(b, &mut self.src)
    }

    fn mul(&mut self, a: &AffineForm, b: &AffineForm) -> AffineForm {
        a.mul(b, &mut self.src)
    }

    fn div(&mut self, a: &AffineForm, b: &AffineForm) -> AffineForm {
        a.div(b, &mut self.src)
    }

    fn neg(&mut self, a: &AffineForm) -> AffineForm {
        a.neg()
    }

    fn exp(&mut self, a: &AffineForm) -> AffineForm {
        a.exp(&mut self.src)
    }

    fn scale(&mut self, a: &AffineForm, k: f64) -> AffineForm {
        a.scale(k, &mut self.src)
    }

    fn add_scalar(&mut self, a: &AffineForm, k: f64) -> AffineForm {
        a.add_scalar(k, &mut self.src)
    }

    fn centre(&self, a: &AffineForm) -> f64 {
        a.centre()
    }

    fn begin_step(&mut self) {
        self.step_mark = self.src.peek();
    }

    fn settle(&mut self, value: &mut AffineForm, step: usize) {
        let r = self.reduction;
        if r.merge_step_terms {
            let fresh = value.symbols().iter().filter(|&&s| s >= self.step_mark).count();
            value.reduce_last_n(fresh, &mut self.src);
        }
        if r.epoch > 0 && step % r.epoch == 0 {
            value.reduce_small(r.min_fraction, &mut self.src);
        }
        if r.max_terms > 0 && value.n_terms() > r.max_terms {
            let excess = value.n_terms() - r.max_terms + 1;
            value.reduce_last_n(excess, &mut self.src);
        }
    }
}
