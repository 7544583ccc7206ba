//! Total enclosure radius over a sweep of input counts and input rates.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::stats::{log10_matrix, radius_sum};
use crate::core::trace::{read_part, Part, TraceDir};
use crate::core::window::RowWindow;
use crate::error::{Result, TraceError};
use crate::experiments::{short_name, VarNames};
use crate::plot::{Content, Figure, HeatmapData, Panel};
use crate::sim::dataset::sweep_dir;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    #[serde(default = "GridSpec::default_size")]
    pub size: usize,
    #[serde(default = "GridSpec::default_step")]
    pub input_step: usize,
    #[serde(default = "GridSpec::default_step")]
    pub freq_step: usize,
    /// Rows summed per run, starting at row 0.
    #[serde(default = "GridSpec::default_rows")]
    pub rows: usize,
}

impl GridSpec {
    fn default_size() -> usize {
        26
    }

    fn default_step() -> usize {
        2
    }

    fn default_rows() -> usize {
        1000
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            size: Self::default_size(),
            input_step: Self::default_step(),
            freq_step: Self::default_step(),
            rows: Self::default_rows(),
        }
    }
}

/// `x[i][j]` is the radius sum of the `x` trace in the run with
/// `i * input_step` inputs at `j * freq_step` Hz.
#[derive(Clone, Debug, PartialEq)]
pub struct RadiusGrid {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
}

/// Radius series of one run, which must cover all `rows` rows.
fn full_radius(dir: &TraceDir, name: &str, rows: usize) -> Result<Vec<f64>> {
    let r = read_part(dir, name, Part::Radius, &RowWindow::range(0, rows))?;
    if r.len() < rows {
        return Err(TraceError::Empty(format!(
            "{} has {} of {rows} rows",
            dir.part(name, Part::Radius).display(),
            r.len()
        )));
    }
    Ok(r)
}

pub fn radius_sums(root: &Path, names: &VarNames, spec: &GridSpec) -> RadiusGrid {
    let root = TraceDir::new(root);
    let mut grid = RadiusGrid {
        x: vec![vec![0.0; spec.size]; spec.size],
        y: vec![vec![0.0; spec.size]; spec.size],
    };
    for i in 0..spec.size {
        for j in 0..spec.size {
            let dir = root.subdir(&sweep_dir(i * spec.input_step, j * spec.freq_step));
            grid.x[i][j] = radius_sum(full_radius(&dir, &names.x, spec.rows));
            grid.y[i][j] = radius_sum(full_radius(&dir, &names.y, spec.rows));
            debug!(i, j, x = grid.x[i][j], y = grid.y[i][j], "radius sum");
        }
    }
    grid
}

impl RadiusGrid {
    pub fn figure(&self, names: &VarNames, spec: &GridSpec) -> Figure {
        let heatmap = |values: &[Vec<f64>], col: usize, title: &str| {
            Panel::new(Content::Heatmap(HeatmapData {
                values: log10_matrix(values),
                tick_every: 5,
                col_scale: spec.freq_step as f64,
                row_scale: spec.input_step as f64,
            }))
            .title(title)
            .labels("Input frequency (Hz)", "Input count")
            .at(0, col)
        };
        Figure::new("log10 of summed radius", 1, 2)
            .size(1400, 700)
            .with(heatmap(&self.x, 0, short_name(&names.x)))
            .with(heatmap(&self.y, 1, short_name(&names.y)))
    }
}

pub fn radius_grid(root: &Path, names: &VarNames, spec: &GridSpec) -> Result<Figure> {
    if spec.size == 0 {
        return Err(TraceError::Empty("radius grid has no cells".into()));
    }
    Ok(radius_sums(root, names, spec).figure(names, spec))
}
