//! core/joint.rs — joint range of two affine forms.
//!
//! Two variables that share noise symbols do not fill their bounding box: the
//! set `{(x(ε), y(ε)) : ε ∈ [-1, 1]^n}` is a zonotope whose vertices are
//! images of corners of the noise cube. We enumerate every corner over the
//! union of both symbol sets and take the convex hull.

use crate::core::affine::{AffineForm, Symbol};
use crate::core::hull::{convex_hull, Point};
use crate::core::interval::Interval;
use crate::error::{Result, TraceError};

/// Largest symbol union enumerated by default (`2^15` corners).
pub const DEFAULT_MAX_TERMS: usize = 15;

/// Hard limit on `max_terms` (`2^24` corners).
pub const MAX_ENUMERABLE_TERMS: usize = 24;

/// Sorted, deduplicated union of two sorted symbol lists.
pub fn union_symbols(xs: &[Symbol], ys: &[Symbol]) -> Vec<Symbol> {
    let mut out = Vec::with_capacity(xs.len() + ys.len());
    let (mut i, mut j) = (0, 0);
    while i < xs.len() || j < ys.len() {
        let next = if j >= ys.len() || (i < xs.len() && xs[i] < ys[j]) {
            i += 1;
            xs[i - 1]
        } else if i >= xs.len() || ys[j] < xs[i] {
            j += 1;
            ys[j - 1]
        } else {
            i += 1;
            j += 1;
            xs[i - 1]
        };
        if out.last() != Some(&next) {
            out.push(next);
        }
    }
    out
}

/// Deviations of `form` laid out over `union`; zero where the form lacks a
/// symbol.
pub fn align_deviations(form: &AffineForm, union: &[Symbol]) -> Vec<f64> {
    let mut out = vec![0.0; union.len()];
    let mut k = 0;
    for (s, d) in form.terms() {
        while k < union.len() && union[k] < s {
            k += 1;
        }
        if k < union.len() && union[k] == s {
            out[k] = d;
        }
    }
    out
}

/// The joint uncertainty region of `(x, y)` at one time step.
#[derive(Clone, Debug)]
pub struct JointRange {
    pub centre: Point,
    pub symbols: Vec<Symbol>,
    pub x_deviations: Vec<f64>,
    pub y_deviations: Vec<f64>,
}

impl JointRange {
    pub fn new(x: &AffineForm, y: &AffineForm, max_terms: usize) -> Result<Self> {
        let symbols = union_symbols(x.symbols(), y.symbols());
        let max_terms = max_terms.min(MAX_ENUMERABLE_TERMS);
        if symbols.len() > max_terms {
            return Err(TraceError::TooManyTerms {
                terms: symbols.len(),
                max_terms,
            });
        }
        let x_deviations = align_deviations(x, &symbols);
        let y_deviations = align_deviations(y, &symbols);
        Ok(Self {
            centre: (x.centre(), y.centre()),
            symbols,
            x_deviations,
            y_deviations,
        })
    }

    pub fn n_terms(&self) -> usize {
        self.symbols.len()
    }

    /// Generators with both deviations zero contribute nothing to the region.
    pub fn active_terms(&self) -> usize {
        self.x_deviations
            .iter()
            .zip(&self.y_deviations)
            .filter(|(dx, dy)| **dx != 0.0 || **dy != 0.0)
            .count()
    }

    /// Image of the noise-cube corner whose sign bits are `mask` (bit `k` set
    /// means `ε_k = +1`).
    pub fn corner(&self, mask: u64, centred: bool) -> Point {
        let (mut x, mut y) = if centred { (0.0, 0.0) } else { self.centre };
        for k in 0..self.n_terms() {
            let e = if (mask >> k) & 1 == 1 { 1.0 } else { -1.0 };
            x += self.x_deviations[k] * e;
            y += self.y_deviations[k] * e;
        }
        (x, y)
    }

    /// All `2^n` corners, one per sign vector.
    pub fn vertices(&self, centred: bool) -> Vec<Point> {
        let count = 1u64 << self.n_terms();
        (0..count).map(|mask| self.corner(mask, centred)).collect()
    }

    pub fn hull(&self, centred: bool) -> Vec<Point> {
        convex_hull(&self.vertices(centred))
    }

    /// The axis-aligned box `x0 ± rx, y0 ± ry`.
    pub fn bounding_box(&self, centred: bool) -> (Interval, Interval) {
        let rx: f64 = self.x_deviations.iter().map(|d| d.abs()).sum();
        let ry: f64 = self.y_deviations.iter().map(|d| d.abs()).sum();
        let (cx, cy) = if centred { (0.0, 0.0) } else { self.centre };
        (
            Interval::from_centre_radius(cx, rx),
            Interval::from_centre_radius(cy, ry),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hull::polygon_area;
    use approx::assert_abs_diff_eq;

    #[test]
    fn union_is_sorted_and_unique() {
        assert_eq!(union_symbols(&[1, 4, 9], &[2, 4, 10]), vec![1, 2, 4, 9, 10]);
        assert_eq!(union_symbols(&[], &[3]), vec![3]);
        assert!(union_symbols(&[], &[]).is_empty());
    }

    #[test]
    fn aligned_deviations_zero_fill() {
        let x = AffineForm::from_terms(0.0, [(2, 0.5), (9, -1.0)]);
        let u = union_symbols(x.symbols(), &[1, 2, 5]);
        assert_eq!(u, vec![1, 2, 5, 9]);
        assert_eq!(align_deviations(&x, &u), vec![0.0, 0.5, 0.0, -1.0]);
    }

    #[test]
    fn fully_correlated_forms_give_a_segment() {
        // y = 2x: one shared symbol, the region is a diagonal segment.
        let x = AffineForm::from_terms(1.0, [(0, 1.0)]);
        let y = AffineForm::from_terms(2.0, [(0, 2.0)]);
        let j = JointRange::new(&x, &y, 15).unwrap();
        let hull = j.hull(false);
        assert_eq!(hull, vec![(0.0, 0.0), (2.0, 4.0)]);
        assert_abs_diff_eq!(polygon_area(&hull), 0.0);
    }

    #[test]
    fn independent_forms_fill_the_box() {
        let x = AffineForm::from_terms(0.0, [(0, 1.0)]);
        let y = AffineForm::from_terms(0.0, [(1, 3.0)]);
        let j = JointRange::new(&x, &y, 15).unwrap();
        let (bx, by) = j.bounding_box(true);
        let box_area = bx.width() * by.width();
        assert_abs_diff_eq!(polygon_area(&j.hull(true)), box_area);
    }

    #[test]
    fn too_many_terms_is_an_error() {
        let x = AffineForm::from_terms(0.0, (0..10).map(|s| (s, 1.0)));
        let y = AffineForm::from_terms(0.0, (10..20).map(|s| (s, 1.0)));
        let err = JointRange::new(&x, &y, 15).unwrap_err();
        assert!(matches!(err, TraceError::TooManyTerms { terms: 20, max_terms: 15 }));
    }

    #[test]
    fn requested_limit_is_capped() {
        let x = AffineForm::from_terms(0.0, (0..40).map(|s| (s, 1.0)));
        let y = AffineForm::constant(0.0);
        let err = JointRange::new(&x, &y, 40).unwrap_err();
        assert!(matches!(
            err,
            TraceError::TooManyTerms {
                terms: 40,
                max_terms: MAX_ENUMERABLE_TERMS
            }
        ));
    }
}
