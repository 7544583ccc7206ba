//! core/affine.rs — affine forms `x0 + Σ xi·εi`, `εi ∈ [-1, 1]`.
//!
//! A form keeps its noise symbols sorted and unique; two forms sharing a
//! symbol are correlated through it. The non-affine operations follow the
//! Chebyshev approximations used by Arpra, evaluated in `f64`.

use crate::core::interval::Interval;

/// Index of a noise symbol.
pub type Symbol = u64;

/// Hands out fresh noise symbols. Owned by whoever builds forms, so two
/// independent computations never collide by accident.
#[derive(Clone, Debug, Default)]
pub struct SymbolSource {
    next: Symbol,
}

impl SymbolSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after symbols that already exist elsewhere.
    pub fn starting_at(next: Symbol) -> Self {
        Self { next }
    }

    pub fn next_symbol(&mut self) -> Symbol {
        let s = self.next;
        self.next += 1;
        s
    }

    pub fn peek(&self) -> Symbol {
        self.next
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AffineForm {
    centre: f64,
    radius: f64,
    symbols: Vec<Symbol>,
    deviations: Vec<f64>,
}

/// True when `symbols` is strictly increasing.
pub fn is_normalised(symbols: &[Symbol]) -> bool {
    symbols.windows(2).all(|w| w[0] < w[1])
}

impl AffineForm {
    pub fn constant(centre: f64) -> Self {
        Self {
            centre,
            radius: 0.0,
            symbols: Vec::new(),
            deviations: Vec::new(),
        }
    }

    /// `centre ± radius` with a fresh noise symbol for the uncertainty.
    pub fn with_radius(centre: f64, radius: f64, src: &mut SymbolSource) -> Self {
        if radius == 0.0 {
            return Self::constant(centre);
        }
        Self::from_terms(centre, [(src.next_symbol(), radius.abs())])
    }

    pub fn nan() -> Self {
        Self {
            centre: f64::NAN,
            radius: f64::NAN,
            symbols: Vec::new(),
            deviations: Vec::new(),
        }
    }

    /// The whole real line: centre 0, radius +inf, no terms.
    pub fn unbounded() -> Self {
        Self {
            centre: 0.0,
            radius: f64::INFINITY,
            symbols: Vec::new(),
            deviations: Vec::new(),
        }
    }

    /// Build a form from `(symbol, deviation)` pairs in any order. Terms are
    /// sorted by symbol and repeated symbols merged by summing deviations.
    pub fn from_terms(centre: f64, terms: impl IntoIterator<Item = (Symbol, f64)>) -> Self {
        let mut terms: Vec<(Symbol, f64)> = terms.into_iter().collect();
        terms.sort_by_key(|(s, _)| *s);
        let mut symbols: Vec<Symbol> = Vec::with_capacity(terms.len());
        let mut deviations: Vec<f64> = Vec::with_capacity(terms.len());
        for (s, d) in terms {
            if symbols.last() == Some(&s) {
                if let Some(last) = deviations.last_mut() {
                    *last += d;
                }
            } else {
                symbols.push(s);
                deviations.push(d);
            }
        }
        let mut form = Self {
            centre,
            radius: 0.0,
            symbols,
            deviations,
        };
        form.recompute_radius();
        form
    }

    fn recompute_radius(&mut self) {
        self.radius = self.deviations.iter().map(|d| d.abs()).sum();
    }

    fn finish(mut self) -> Self {
        self.recompute_radius();
        if self.centre.is_nan() || self.radius.is_nan() {
            Self::nan()
        } else if self.centre.is_infinite() || self.radius.is_infinite() {
            Self::unbounded()
        } else {
            self
        }
    }

    pub fn centre(&self) -> f64 {
        self.centre
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn deviations(&self) -> &[f64] {
        &self.deviations
    }

    pub fn n_terms(&self) -> usize {
        self.symbols.len()
    }

    pub fn terms(&self) -> impl Iterator<Item = (Symbol, f64)> + '_ {
        self.symbols.iter().copied().zip(self.deviations.iter().copied())
    }

    pub fn is_nan(&self) -> bool {
        self.centre.is_nan() || self.radius.is_nan()
    }

    pub fn is_bounded(&self) -> bool {
        self.centre.is_finite() && self.radius.is_finite()
    }

    pub fn bounds(&self) -> Interval {
        if self.is_nan() {
            return Interval::nan();
        }
        Interval::from_centre_radius(self.centre, self.radius)
    }

    pub fn has_zero(&self) -> bool {
        self.bounds().has_zero()
    }

    /// Value of the form at a point of the noise cube. Symbols missing from
    /// `eps` count as 0.
    pub fn evaluate(&self, eps: impl Fn(Symbol) -> f64) -> f64 {
        self.centre + self.terms().map(|(s, d)| d * eps(s)).sum::<f64>()
    }

    /// `alpha·x + gamma ± delta`. `delta` becomes a fresh noise term.
    pub fn affine_1(
        x: &AffineForm,
        alpha: f64,
        gamma: f64,
        delta: f64,
        src: &mut SymbolSource,
    ) -> AffineForm {
        if x.is_nan() {
            return Self::nan();
        }
        if !x.is_bounded() {
            return Self::unbounded();
        }
        let mut symbols = x.symbols.clone();
        let mut deviations: Vec<f64> = x.deviations.iter().map(|d| alpha * d).collect();
        if delta != 0.0 {
            symbols.push(src.next_symbol());
            deviations.push(delta.abs());
        }
        Self {
            centre: alpha * x.centre + gamma,
            radius: 0.0,
            symbols,
            deviations,
        }
        .finish()
    }

    /// `alpha·x + beta·y + gamma ± delta`, merging shared symbols.
    pub fn affine_2(
        x: &AffineForm,
        y: &AffineForm,
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
        src: &mut SymbolSource,
    ) -> AffineForm {
        if x.is_nan() || y.is_nan() {
            return Self::nan();
        }
        if !x.is_bounded() || !y.is_bounded() {
            return Self::unbounded();
        }
        let (mut symbols, mut deviations) = merge_terms(x, y, |dx| alpha * dx, |dy| beta * dy);
        if delta != 0.0 {
            symbols.push(src.next_symbol());
            deviations.push(delta.abs());
        }
        Self {
            centre: alpha * x.centre + beta * y.centre + gamma,
            radius: 0.0,
            symbols,
            deviations,
        }
        .finish()
    }

    pub fn add(&self, other: &AffineForm, src: &mut SymbolSource) -> AffineForm {
        Self::affine_2(self, other, 1.0, 1.0, 0.0, 0.0, src)
    }

    pub fn sub(&self, other: &AffineForm, src: &mut SymbolSource) -> AffineForm {
        Self::affine_2(self, other, 1.0, -1.0, 0.0, 0.0, src)
    }

    pub fn neg(&self) -> AffineForm {
        let mut out = self.clone();
        out.centre = -out.centre;
        for d in &mut out.deviations {
            *d = -*d;
        }
        out
    }

    pub fn scale(&self, k: f64, src: &mut SymbolSource) -> AffineForm {
        Self::affine_1(self, k, 0.0, 0.0, src)
    }

    pub fn add_scalar(&self, k: f64, src: &mut SymbolSource) -> AffineForm {
        Self::affine_1(self, 1.0, k, 0.0, src)
    }

    /// Sum of many forms, in the order given.
    pub fn sum<'a>(
        forms: impl IntoIterator<Item = &'a AffineForm>,
        src: &mut SymbolSource,
    ) -> AffineForm {
        forms
            .into_iter()
            .fold(AffineForm::constant(0.0), |acc, f| acc.add(f, src))
    }

    /// Product. The quadratic remainder is bounded by `rad(x)·rad(y)` and
    /// stored in a fresh symbol.
    pub fn mul(&self, other: &AffineForm, src: &mut SymbolSource) -> AffineForm {
        let (x, y) = (self, other);
        if x.is_nan() || y.is_nan() {
            return Self::nan();
        }
        if !x.is_bounded() {
            return if y.has_zero() { Self::nan() } else { Self::unbounded() };
        }
        if !y.is_bounded() {
            return if x.has_zero() { Self::nan() } else { Self::unbounded() };
        }
        let (y0, x0) = (y.centre, x.centre);
        let (mut symbols, mut deviations) = merge_terms(x, y, |dx| y0 * dx, |dy| x0 * dy);
        let error = x.radius * y.radius;
        if error != 0.0 {
            symbols.push(src.next_symbol());
            deviations.push(error);
        }
        Self {
            centre: x0 * y0,
            radius: 0.0,
            symbols,
            deviations,
        }
        .finish()
    }

    /// `1 / x`. A form whose range contains zero maps to the unbounded form.
    pub fn inv(&self, src: &mut SymbolSource) -> AffineForm {
        if self.is_nan() {
            return Self::nan();
        }
        if self.radius == 0.0 {
            return Self::constant(1.0 / self.centre).finish();
        }
        if !self.is_bounded() || self.has_zero() {
            return Self::unbounded();
        }
        let range = self.bounds();
        let negative = range.hi < 0.0;
        let (a, b) = if negative {
            (-range.hi, -range.lo)
        } else {
            (range.lo, range.hi)
        };

        let alpha = -1.0 / (b * a);
        let da = 1.0 / a - alpha * a;
        let db = (1.0 / b - alpha * b).max(da);
        let du = 2.0 * (-alpha).sqrt();
        let mut gamma = 0.5 * (db + du);
        let delta = (gamma - du).max(db - gamma);
        if negative {
            gamma = -gamma;
        }
        Self::affine_1(self, alpha, gamma, delta, src)
    }

    pub fn div(&self, other: &AffineForm, src: &mut SymbolSource) -> AffineForm {
        let inv = other.inv(src);
        self.mul(&inv, src)
    }

    pub fn exp(&self, src: &mut SymbolSource) -> AffineForm {
        if self.is_nan() {
            return Self::nan();
        }
        if self.radius == 0.0 {
            return Self::constant(self.centre.exp()).finish();
        }
        if !self.is_bounded() {
            return Self::unbounded();
        }
        let range = self.bounds();
        let (a, b) = (range.lo, range.hi);
        let (ea, eb) = (a.exp(), b.exp());
        if !eb.is_finite() {
            return Self::unbounded();
        }

        let alpha = (eb - ea) / (b - a);
        if !(alpha > 0.0) {
            // Range collapsed below exp's resolution; fall back to the interval.
            let hull = range.exp();
            return Self::affine_1(self, 0.0, hull.centre(), hull.radius(), src);
        }
        let da = ea - alpha * a;
        let db = (eb - alpha * b).max(da);
        let du = alpha * (1.0 - alpha.ln());
        let gamma = 0.5 * (db + du);
        let delta = (gamma - du).max(db - gamma);
        Self::affine_1(self, alpha, gamma, delta, src)
    }

    /// Square root. Any negative part of the range gives NaN.
    pub fn sqrt(&self, src: &mut SymbolSource) -> AffineForm {
        if self.is_nan() {
            return Self::nan();
        }
        if self.radius == 0.0 {
            return Self::constant(self.centre.sqrt()).finish();
        }
        let range = self.bounds();
        if range.lo < 0.0 {
            return Self::nan();
        }
        if !self.is_bounded() {
            return Self::unbounded();
        }
        let (a, b) = (range.lo, range.hi);
        let (ra, rb) = (a.sqrt(), b.sqrt());

        let alpha = 1.0 / (ra + rb);
        let da = (ra - alpha * a).min(rb - alpha * b);
        let du = 0.25 / alpha;
        let gamma = 0.5 * (da + du);
        let delta = (du - gamma).max(gamma - da);
        Self::affine_1(self, alpha, gamma, delta, src)
    }

    /// Natural log. A negative part of the range gives NaN; a range touching
    /// zero is unbounded below.
    pub fn ln(&self, src: &mut SymbolSource) -> AffineForm {
        if self.is_nan() {
            return Self::nan();
        }
        if self.radius == 0.0 {
            return Self::constant(self.centre.ln()).finish();
        }
        let range = self.bounds();
        if range.lo < 0.0 {
            return Self::nan();
        }
        if !self.is_bounded() || range.lo == 0.0 {
            return Self::unbounded();
        }
        let (a, b) = (range.lo, range.hi);
        let (la, lb) = (a.ln(), b.ln());

        let alpha = (lb - la) / (b - a);
        if !(alpha > 0.0 && alpha.is_finite()) {
            let hull = range.ln();
            return Self::affine_1(self, 0.0, hull.centre(), hull.radius(), src);
        }
        let da = (la - alpha * a).min(lb - alpha * b);
        let du = (1.0 / alpha).ln() - 1.0;
        let gamma = 0.5 * (da + du);
        let delta = (du - gamma).max(gamma - da);
        Self::affine_1(self, alpha, gamma, delta, src)
    }

    /// Merge the last `n` terms into one fresh term holding their absolute sum.
    pub fn reduce_last_n(&mut self, n: usize, src: &mut SymbolSource) {
        let n = n.min(self.n_terms());
        if n < 2 || !self.is_bounded() {
            return;
        }
        let keep = self.n_terms() - n;
        let merged: f64 = self.deviations[keep..].iter().map(|d| d.abs()).sum();
        self.symbols.truncate(keep);
        self.deviations.truncate(keep);
        self.symbols.push(src.next_symbol());
        self.deviations.push(merged);
        self.recompute_radius();
    }

    /// Merge every term smaller than `min_fraction · radius` into one fresh
    /// term. Nothing moves unless at least two terms qualify.
    pub fn reduce_small(&mut self, min_fraction: f64, src: &mut SymbolSource) {
        if self.n_terms() < 2 || min_fraction <= 0.0 || !self.is_bounded() {
            return;
        }
        let threshold = self.radius * min_fraction;
        let small = self
            .deviations
            .iter()
            .filter(|d| d.abs() < threshold)
            .count();
        if small < 2 {
            return;
        }
        let (mut big_s, mut big_d) = (Vec::new(), Vec::new());
        let (mut small_s, mut small_d) = (Vec::new(), Vec::new());
        for (s, d) in self.terms() {
            if d.abs() >= threshold {
                big_s.push(s);
                big_d.push(d);
            } else {
                small_s.push(s);
                small_d.push(d);
            }
        }
        big_s.extend(small_s);
        big_d.extend(small_d);
        self.symbols = big_s;
        self.deviations = big_d;
        self.reduce_last_n(small, src);
    }
}

/// Walk two sorted term lists in symbol order, mapping deviations of `x` with
/// `fx` and of `y` with `fy`; shared symbols are summed. Zero results are
/// dropped.
fn merge_terms(
    x: &AffineForm,
    y: &AffineForm,
    fx: impl Fn(f64) -> f64,
    fy: impl Fn(f64) -> f64,
) -> (Vec<Symbol>, Vec<f64>) {
    let cap = x.n_terms() + y.n_terms() + 1;
    let mut symbols = Vec::with_capacity(cap);
    let mut deviations = Vec::with_capacity(cap);
    let (mut i, mut j) = (0, 0);
    while i < x.n_terms() || j < y.n_terms() {
        let (s, d) = if j >= y.n_terms() || (i < x.n_terms() && x.symbols[i] < y.symbols[j]) {
            let t = (x.symbols[i], fx(x.deviations[i]));
            i += 1;
            t
        } else if i >= x.n_terms() || y.symbols[j] < x.symbols[i] {
            let t = (y.symbols[j], fy(y.deviations[j]));
            j += 1;
            t
        } else {
            let t = (x.symbols[i], fx(x.deviations[i]) + fy(y.deviations[j]));
            i += 1;
            j += 1;
            t
        };
        if d != 0.0 {
            symbols.push(s);
            deviations.push(d);
        }
    }
    (symbols, deviations)
}
