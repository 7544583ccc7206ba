//! Affine bounds `c ± r` against the float ensemble's `mean ± std`, and how
//! far apart the two are over time.

use std::path::Path;

use crate::core::stats::{abs_diff, maximum, EnsembleStats};
use crate::core::trace::{read_part, read_range, Part, RangeSeries, TraceDir};
use crate::core::window::RowWindow;
use crate::error::Result;
use crate::experiments::{read_members, short_name, VarNames};
use crate::plot::figure::{BLUE, RED};
use crate::plot::{Figure, Panel, Series};
use crate::sim::dataset::AFFINE_DIR;

/// Fixed y limits of the two bound panels.
pub const X_LIMITS: (f64, f64) = (-70.0, 50.0);
pub const Y_LIMITS: (f64, f64) = (-0.2, 0.5);

/// `max(|lo_a - lo_f|, |hi_a - hi_f|)` per row.
pub fn bound_discrepancy(affine: &RangeSeries, float: &EnsembleStats) -> Vec<f64> {
    maximum(
        &abs_diff(&affine.lower(), &float.lower()),
        &abs_diff(&affine.upper(), &float.upper()),
    )
}

#[derive(Clone, Debug)]
pub struct BoundComparison {
    /// Affine time centre.
    pub time: Vec<f64>,
    pub affine_x: RangeSeries,
    pub affine_y: RangeSeries,
    pub float_x: EnsembleStats,
    pub float_y: EnsembleStats,
    pub diff_x: Vec<f64>,
    pub diff_y: Vec<f64>,
}

impl BoundComparison {
    pub fn load(root: &Path, names: &VarNames, samples: usize, window: &RowWindow) -> Result<Self> {
        window.validate()?;
        let root = TraceDir::new(root);
        let affine = root.subdir(AFFINE_DIR);
        let time = read_part(&affine, &names.t, Part::Centre, window)?;
        let affine_x = read_range(&affine, &names.x, window)?;
        let affine_y = read_range(&affine, &names.y, window)?;
        let float_x = EnsembleStats::from_members(&read_members(&root, samples, &names.x, window)?);
        let float_y = EnsembleStats::from_members(&read_members(&root, samples, &names.y, window)?);
        Ok(Self {
            time,
            diff_x: bound_discrepancy(&affine_x, &float_x),
            diff_y: bound_discrepancy(&affine_y, &float_y),
            affine_x,
            affine_y,
            float_x,
            float_y,
        })
    }

    fn bounds_panel(&self, affine: &RangeSeries, float: &EnsembleStats, name: &str) -> Panel {
        let t = &self.time;
        Panel::lines(vec![
            Series::from_xy(RED, t, &affine.lower()).labelled("affine"),
            Series::from_xy(RED, t, &affine.upper()),
            Series::from_xy(BLUE, t, &float.lower()).labelled("floating-point"),
            Series::from_xy(BLUE, t, &float.upper()),
        ])
        .title(format!("{name} bounds"))
        .labels("time (ms)", name)
    }

    fn diff_panel(&self, diff: &[f64], name: &str) -> Panel {
        Panel::lines(vec![Series::from_xy(RED, &self.time, diff)])
            .title(format!("{name} bound difference"))
            .labels("time (ms)", "max |affine - float|")
            .log_y()
    }

    pub fn figure(&self, names: &VarNames) -> Figure {
        let (vx, vy) = (short_name(&names.x), short_name(&names.y));
        Figure::new("affine vs floating-point bounds", 2, 2)
            .size(1400, 900)
            .with(
                self.bounds_panel(&self.affine_x, &self.float_x, vx)
                    .y_limits(X_LIMITS.0, X_LIMITS.1)
                    .at(0, 0),
            )
            .with(
                self.bounds_panel(&self.affine_y, &self.float_y, vy)
                    .y_limits(Y_LIMITS.0, Y_LIMITS.1)
                    .at(1, 0),
            )
            .with(self.diff_panel(&self.diff_x, vx).at(0, 1))
            .with(self.diff_panel(&self.diff_y, vy).at(1, 1))
    }
}

pub fn comparison(root: &Path, names: &VarNames, samples: usize, window: &RowWindow) -> Result<Figure> {
    Ok(BoundComparison::load(root, names, samples, window)?.figure(names))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn discrepancy_takes_worse_endpoint() {
        let affine = RangeSeries {
            centre: vec![0.0, 1.0],
            radius: vec![1.0, 0.5],
        };
        let float = EnsembleStats {
            mean: vec![0.25, 1.0],
            std: vec![0.5, 0.5],
        };
        // lo: |-1 - -0.25| = 0.75, hi: |1 - 0.75| = 0.25
        let d = bound_discrepancy(&affine, &float);
        assert_abs_diff_eq!(d[0], 0.75, epsilon = 1e-15);
        assert_eq!(d[1], 0.0);
    }
}
