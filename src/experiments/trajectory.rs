//! Phase-plane trajectories and per-variable bounds over time, for the
//! three ways a run can be stored.

use std::path::Path;

use crate::core::interval::Interval;
use crate::core::trace::{read_interval, read_part, read_range, Part, TraceDir};
use crate::core::window::RowWindow;
use crate::error::Result;
use crate::experiments::{read_members, short_name, VarNames};
use crate::plot::figure::{BLUE, RED};
use crate::plot::{Figure, Panel, Series};

/// Left half: the trajectory. Right half: `x` on top, `y` below.
fn layout(title: &str, names: &VarNames, trajectory: Vec<Series>, x: Vec<Series>, y: Vec<Series>) -> Figure {
    let (vx, vy) = (short_name(&names.x), short_name(&names.y));
    Figure::new(title, 2, 2)
        .size(1400, 800)
        .with(
            Panel::lines(trajectory)
                .title("trajectory")
                .labels(vx, vy)
                .at(0, 0)
                .span(2, 1),
        )
        .with(Panel::lines(x).title(vx).labels("time (ms)", vx).at(0, 1))
        .with(Panel::lines(y).title(vy).labels("time (ms)", vy).at(1, 1))
}

/// Affine run in `dir`: the centre trajectory and `c ± r` of each variable.
pub fn affine_trajectory(dir: &Path, names: &VarNames, window: &RowWindow) -> Result<Figure> {
    window.validate()?;
    let dir = TraceDir::new(dir);
    let t = read_part(&dir, &names.t, Part::Centre, window)?;
    let x = read_range(&dir, &names.x, window)?;
    let y = read_range(&dir, &names.y, window)?;
    Ok(layout(
        "affine run",
        names,
        vec![Series::from_xy(RED, &x.centre, &y.centre)],
        vec![
            Series::from_xy(RED, &t, &x.lower()).labelled("lower"),
            Series::from_xy(BLUE, &t, &x.upper()).labelled("upper"),
        ],
        vec![
            Series::from_xy(RED, &t, &y.lower()).labelled("lower"),
            Series::from_xy(BLUE, &t, &y.upper()).labelled("upper"),
        ],
    ))
}

/// Every member `i_<k>` of a float ensemble drawn on top of each other.
pub fn float_overlay(root: &Path, names: &VarNames, samples: usize, window: &RowWindow) -> Result<Figure> {
    window.validate()?;
    let root = TraceDir::new(root);
    let ts = read_members(&root, samples, &names.t, window)?;
    let xs = read_members(&root, samples, &names.x, window)?;
    let ys = read_members(&root, samples, &names.y, window)?;
    let mut trajectory = Vec::with_capacity(samples);
    let mut x = Vec::with_capacity(samples);
    let mut y = Vec::with_capacity(samples);
    for ((t, xk), yk) in ts.iter().zip(&xs).zip(&ys) {
        trajectory.push(Series::from_xy(BLUE, xk, yk));
        x.push(Series::from_xy(BLUE, t, xk));
        y.push(Series::from_xy(BLUE, t, yk));
    }
    Ok(layout(&format!("{samples} floating-point runs"), names, trajectory, x, y))
}

/// Interval run in `dir`: the trajectory of midpoints and both endpoints of
/// each variable against the midpoint of time.
pub fn interval_trajectory(dir: &Path, names: &VarNames, window: &RowWindow) -> Result<Figure> {
    window.validate()?;
    let dir = TraceDir::new(dir);
    let t = read_interval(&dir, &names.t, window)?;
    let x = read_interval(&dir, &names.x, window)?;
    let y = read_interval(&dir, &names.y, window)?;
    let mid = |v: &[Interval]| v.iter().map(Interval::centre).collect::<Vec<_>>();
    // Time is stored as an interval too.
    let tm = mid(&t);
    Ok(layout(
        "interval run",
        names,
        vec![Series::from_xy(RED, &mid(&x), &mid(&y))],
        vec![
            Series::from_xy(RED, &tm, &lows(&x)).labelled("lower"),
            Series::from_xy(BLUE, &tm, &highs(&x)).labelled("upper"),
        ],
        vec![
            Series::from_xy(RED, &tm, &lows(&y)).labelled("lower"),
            Series::from_xy(BLUE, &tm, &highs(&y)).labelled("upper"),
        ],
    ))
}

fn lows(v: &[Interval]) -> Vec<f64> {
    v.iter().map(|i| i.lo).collect()
}

fn highs(v: &[Interval]) -> Vec<f64> {
    v.iter().map(|i| i.hi).collect()
}
