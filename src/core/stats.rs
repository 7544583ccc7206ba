//! core/stats.rs — element-wise and ensemble statistics over aligned series.

use tracing::warn;

use crate::error::Result;

pub fn sum(xs: &[f64]) -> f64 {
    xs.iter().sum()
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    sum(xs) / xs.len() as f64
}

/// Population standard deviation (divides by `n`).
pub fn std(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return f64::NAN;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}

/// `centre - radius`, element-wise.
pub fn lower(centre: &[f64], radius: &[f64]) -> Vec<f64> {
    centre.iter().zip(radius).map(|(c, r)| c - r).collect()
}

/// `centre + radius`, element-wise.
pub fn upper(centre: &[f64], radius: &[f64]) -> Vec<f64> {
    centre.iter().zip(radius).map(|(c, r)| c + r).collect()
}

pub fn abs_diff(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).collect()
}

/// Element-wise maximum. NaN wins, so a missing sample stays visible.
pub fn maximum(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter()
        .zip(b)
        .map(|(x, y)| if x.is_nan() || y.is_nan() { f64::NAN } else { x.max(*y) })
        .collect()
}

pub fn log10_matrix(m: &[Vec<f64>]) -> Vec<Vec<f64>> {
    m.iter()
        .map(|row| row.iter().map(|v| v.log10()).collect())
        .collect()
}

/// Total of a radius series, or `+inf` when it could not be read. A run that
/// diverged or was never produced shows up as a saturated cell.
pub fn radius_sum(series: Result<Vec<f64>>) -> f64 {
    match series {
        Ok(r) => sum(&r),
        Err(err) => {
            warn!("radius series unavailable: {err}");
            f64::INFINITY
        }
    }
}

/// Row-wise mean and standard deviation across aligned ensemble members.
#[derive(Clone, Debug, Default)]
pub struct EnsembleStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl EnsembleStats {
    /// Members longer than the shortest one are truncated.
    pub fn from_members(members: &[Vec<f64>]) -> Self {
        let Some(rows) = members.iter().map(|m| m.len()).min() else {
            return Self::default();
        };
        if members.iter().any(|m| m.len() != rows) {
            warn!(rows, "ensemble members differ in length; truncating to shortest");
        }
        let mut column = vec![0.0; members.len()];
        let mut out = Self {
            mean: Vec::with_capacity(rows),
            std: Vec::with_capacity(rows),
        };
        for i in 0..rows {
            for (slot, m) in column.iter_mut().zip(members) {
                *slot = m[i];
            }
            out.mean.push(mean(&column));
            out.std.push(std(&column));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    pub fn lower(&self) -> Vec<f64> {
        lower(&self.mean, &self.std)
    }

    pub fn upper(&self) -> Vec<f64> {
        upper(&self.mean, &self.std)
    }
}
