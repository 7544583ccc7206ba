//! Spread of a shuffled-summation float ensemble next to the affine
//! enclosure of the same run.

use std::path::Path;

use crate::core::stats::EnsembleStats;
use crate::core::trace::{read_range, RangeSeries, TraceDir};
use crate::core::window::RowWindow;
use crate::error::Result;
use crate::experiments::{read_members, short_name, VarNames};
use crate::plot::figure::{BLUE, RED};
use crate::plot::{Figure, Panel, Series};
use crate::sim::dataset::AFFINE_DIR;

#[derive(Clone, Debug)]
pub struct EnsembleComparison {
    /// Mean time across members.
    pub time: Vec<f64>,
    pub x: EnsembleStats,
    pub y: EnsembleStats,
    pub affine_x: RangeSeries,
    pub affine_y: RangeSeries,
}

impl EnsembleComparison {
    pub fn load(root: &Path, names: &VarNames, samples: usize, window: &RowWindow) -> Result<Self> {
        window.validate()?;
        let root = TraceDir::new(root);
        let time = EnsembleStats::from_members(&read_members(&root, samples, &names.t, window)?);
        let x = EnsembleStats::from_members(&read_members(&root, samples, &names.x, window)?);
        let y = EnsembleStats::from_members(&read_members(&root, samples, &names.y, window)?);
        let affine = root.subdir(AFFINE_DIR);
        Ok(Self {
            time: time.mean,
            x,
            y,
            affine_x: read_range(&affine, &names.x, window)?,
            affine_y: read_range(&affine, &names.y, window)?,
        })
    }

    pub fn figure(&self, names: &VarNames) -> Figure {
        let (vx, vy) = (short_name(&names.x), short_name(&names.y));
        let panel = |row: usize, title: String, float: &[f64], affine: &[f64], what: (&str, &str)| {
            Panel::lines(vec![
                Series::from_xy(BLUE, &self.time, float).labelled(what.0),
                Series::from_xy(RED, &self.time, affine).labelled(what.1),
            ])
            .title(title)
            .labels("time (ms)", "")
            .at(row, 0)
        };
        Figure::new("float ensemble vs affine enclosure", 4, 1)
            .size(1000, 1400)
            .with(panel(0, format!("{vx} mean"), &self.x.mean, &self.affine_x.centre, ("mean", "centre")))
            .with(panel(1, format!("{vx} std"), &self.x.std, &self.affine_x.radius, ("std", "radius")))
            .with(panel(2, format!("{vy} mean"), &self.y.mean, &self.affine_y.centre, ("mean", "centre")))
            .with(panel(3, format!("{vy} std"), &self.y.std, &self.affine_y.radius, ("std", "radius")))
    }
}

pub fn ensemble_stats(
    root: &Path,
    names: &VarNames,
    samples: usize,
    window: &RowWindow,
) -> Result<Figure> {
    Ok(EnsembleComparison::load(root, names, samples, window)?.figure(names))
}
