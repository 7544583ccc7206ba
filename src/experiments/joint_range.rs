//! Joint uncertainty region of two affine variables, one frame per row.
//!
//! Every frame shows the centred box `[-rx, rx] × [-ry, ry]`. When the
//! symbol and deviation files are present the frame also carries the convex
//! hull of the `2^n` sign corners of the shared noise symbols, which is the
//! true joint region and always sits inside the box.

use std::path::Path;

use tracing::{debug, warn};

use crate::core::hull::Point;
use crate::core::interval::Interval;
use crate::core::joint::{JointRange, MAX_ENUMERABLE_TERMS};
use crate::core::trace::{read_affine, read_range, TraceDir};
use crate::core::window::RowWindow;
use crate::error::{Result, TraceError};
use crate::experiments::{short_name, VarNames};
use crate::plot::colormap::{hsv, HSV_N};
use crate::plot::figure::Rgb;
use crate::plot::{Content, Figure, Panel, Region};

#[derive(Clone, Debug, PartialEq)]
pub struct JointFrame {
    /// Absolute row index in the trace files.
    pub row: usize,
    pub colour: Rgb,
    pub x: Interval,
    pub y: Interval,
    pub hull: Option<Vec<Point>>,
}

/// Colour of the `k`-th drawn frame.
pub fn frame_colour(k: usize) -> Rgb {
    hsv((5 * k) % HSV_N)
}

pub fn joint_frames(
    dir: &Path,
    names: &VarNames,
    window: &RowWindow,
    max_terms: usize,
) -> Result<Vec<JointFrame>> {
    window.validate()?;
    if max_terms > MAX_ENUMERABLE_TERMS {
        warn!(max_terms, cap = MAX_ENUMERABLE_TERMS, "max_terms above the enumerable limit; capping");
    }
    let dir = TraceDir::new(dir);
    let with_terms = dir.has_terms(&names.x) && dir.has_terms(&names.y);
    let (x, y, forms) = if with_terms {
        let x = read_affine(&dir, &names.x, window)?;
        let y = read_affine(&dir, &names.y, window)?;
        (x.range, y.range, Some((x.forms, y.forms)))
    } else {
        (
            read_range(&dir, &names.x, window)?,
            read_range(&dir, &names.y, window)?,
            None,
        )
    };

    let rows = x.len().min(y.len());
    if rows == 0 {
        return Err(TraceError::Empty(format!(
            "no rows of {} and {} in window",
            names.x, names.y
        )));
    }
    let mut frames = Vec::with_capacity(rows);
    for k in 0..rows {
        let row = window.row_index(k);
        debug!("Iteration {row}");
        let hull = match &forms {
            Some((fx, fy)) => match JointRange::new(&fx[k], &fy[k], max_terms) {
                Ok(joint) => Some(joint.hull(true)),
                Err(err @ TraceError::TooManyTerms { .. }) => {
                    warn!(row, "skipping hull: {err}");
                    None
                }
                Err(err) => return Err(err),
            },
            None => None,
        };
        frames.push(JointFrame {
            row,
            colour: frame_colour(k),
            x: Interval::from_centre_radius(0.0, x.radius[k]),
            y: Interval::from_centre_radius(0.0, y.radius[k]),
            hull,
        });
    }
    Ok(frames)
}

pub fn frames_figure(frames: &[JointFrame], names: &VarNames) -> Figure {
    let mut regions = Vec::with_capacity(2 * frames.len());
    for f in frames {
        regions.push(Region::Rect {
            x: f.x,
            y: f.y,
            colour: f.colour,
        });
        if let Some(hull) = &f.hull {
            regions.push(Region::Polygon {
                points: hull.clone(),
                colour: f.colour,
            });
        }
    }
    let (vx, vy) = (short_name(&names.x), short_name(&names.y));
    Figure::new(format!("joint range of {vx} and {vy}"), 1, 1)
        .size(900, 900)
        .with(
            Panel::new(Content::Regions(regions))
                .labels(format!("{vx} - centre"), format!("{vy} - centre")),
        )
}

pub fn joint_range(dir: &Path, names: &VarNames, window: &RowWindow, max_terms: usize) -> Result<Figure> {
    let frames = joint_frames(dir, names, window, max_terms)?;
    Ok(frames_figure(&frames, names))
}
