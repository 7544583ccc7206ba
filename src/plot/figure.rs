//! Renderer-independent description of a figure.
//!
//! Experiments build a [`Figure`] from the traces they load; `plot::render`
//! turns it into a PNG or SVG. Keeping the two apart lets the analyses be
//! tested on their numbers alone.

use crate::core::hull::Point;
use crate::core::interval::Interval;

pub type Rgb = (u8, u8, u8);

pub const BLUE: Rgb = (31, 119, 180);
pub const RED: Rgb = (214, 39, 40);
pub const GREEN: Rgb = (44, 160, 44);
pub const ORANGE: Rgb = (255, 127, 14);
pub const BLACK: Rgb = (0, 0, 0);
pub const GREY: Rgb = (150, 150, 150);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    #[default]
    Linear,
    Log10,
}

impl Scale {
    /// Whether `(x, y)` can be placed on an axis with this y scale.
    pub fn drawable(self, x: f64, y: f64) -> bool {
        x.is_finite() && y.is_finite() && (self == Scale::Linear || y > 0.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: Option<String>,
    pub colour: Rgb,
    pub points: Vec<Point>,
}

impl Series {
    pub fn new(colour: Rgb, points: Vec<Point>) -> Self {
        Self {
            label: None,
            colour,
            points,
        }
    }

    /// `y` against `x`, paired by index.
    pub fn from_xy(colour: Rgb, x: &[f64], y: &[f64]) -> Self {
        Self::new(colour, x.iter().copied().zip(y.iter().copied()).collect())
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Maximal runs of drawable points. A NaN, an infinity or a non-positive
    /// value on a log axis breaks the line.
    pub fn finite_runs(&self, scale: Scale) -> Vec<Vec<Point>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for &(x, y) in &self.points {
            if scale.drawable(x, y) {
                current.push((x, y));
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// A matrix drawn cell by cell, row 0 at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct HeatmapData {
    /// `values[row][col]`.
    pub values: Vec<Vec<f64>>,
    /// Label every `tick_every` cells.
    pub tick_every: usize,
    /// Column tick labels show `index * col_scale`.
    pub col_scale: f64,
    /// Row tick labels show `index * row_scale`.
    pub row_scale: f64,
}

impl HeatmapData {
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    pub fn cols(&self) -> usize {
        self.values.first().map_or(0, Vec::len)
    }

    /// Range of the finite values, or `None` when there are none.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in self.values.iter().flatten().filter(|v| v.is_finite()) {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
        (lo <= hi).then_some((lo, hi))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Region {
    /// Axis-aligned box outline.
    Rect { x: Interval, y: Interval, colour: Rgb },
    /// Closed polygon outline. One or two points draw as a point or segment.
    Polygon { points: Vec<Point>, colour: Rgb },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Lines(Vec<Series>),
    Heatmap(HeatmapData),
    Regions(Vec<Region>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub y_scale: Scale,
    pub y_limits: Option<(f64, f64)>,
    pub content: Content,
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

impl Panel {
    pub fn new(content: Content) -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            y_scale: Scale::Linear,
            y_limits: None,
            content,
            row: 0,
            col: 0,
            row_span: 1,
            col_span: 1,
        }
    }

    pub fn lines(series: Vec<Series>) -> Self {
        Self::new(Content::Lines(series))
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = x.into();
        self.y_label = y.into();
        self
    }

    pub fn at(mut self, row: usize, col: usize) -> Self {
        self.row = row;
        self.col = col;
        self
    }

    pub fn span(mut self, rows: usize, cols: usize) -> Self {
        self.row_span = rows.max(1);
        self.col_span = cols.max(1);
        self
    }

    pub fn log_y(mut self) -> Self {
        self.y_scale = Scale::Log10;
        self
    }

    pub fn y_limits(mut self, lo: f64, hi: f64) -> Self {
        self.y_limits = Some((lo, hi));
        self
    }

    pub fn series(&self) -> &[Series] {
        match &self.content {
            Content::Lines(s) => s,
            _ => &[],
        }
    }

    /// Every plotted point that fits the panel's y scale.
    fn drawable_points(&self) -> Vec<Point> {
        let mut pts = Vec::new();
        match &self.content {
            Content::Lines(series) => {
                for s in series {
                    pts.extend_from_slice(&s.points);
                }
            }
            Content::Regions(regions) => {
                for r in regions {
                    match r {
                        Region::Rect { x, y, .. } => {
                            pts.push((x.lo, y.lo));
                            pts.push((x.hi, y.hi));
                        }
                        Region::Polygon { points, .. } => pts.extend_from_slice(points),
                    }
                }
            }
            Content::Heatmap(h) => {
                // Cells are centred on integer coordinates, row 0 on top.
                pts.push((-0.5, 0.5));
                pts.push((h.cols() as f64 - 0.5, 0.5 - h.rows() as f64));
            }
        }
        pts.retain(|&(x, y)| self.y_scale.drawable(x, y));
        pts
    }

    /// Axis ranges covering the data with 5% padding, measured in decades on
    /// a log axis. Fixed y limits win; empty or flat data falls back to a
    /// unit range (one decade either side on a log axis).
    pub fn axis_ranges(&self) -> (Interval, Interval) {
        let pts = self.drawable_points();
        let span = |vals: &mut dyn Iterator<Item = f64>| {
            let (lo, hi) = vals.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
            if lo > hi {
                Interval::new(0.0, 1.0)
            } else if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
                Interval::new(lo - 0.5, hi + 0.5)
            } else if matches!(self.content, Content::Heatmap(_)) {
                Interval::new(lo, hi)
            } else {
                let pad = 0.05 * (hi - lo);
                Interval::new(lo - pad, hi + pad)
            }
        };
        let x = span(&mut pts.iter().map(|p| p.0));
        let y = match (self.y_limits, self.y_scale) {
            (Some((lo, hi)), _) => Interval::new(lo, hi),
            (None, Scale::Linear) => span(&mut pts.iter().map(|p| p.1)),
            (None, Scale::Log10) => {
                let decades = span(&mut pts.iter().map(|p| p.1.log10()));
                Interval::new(10f64.powf(decades.lo), 10f64.powf(decades.hi))
            }
        };
        (x, y)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub rows: usize,
    pub cols: usize,
    pub panels: Vec<Panel>,
}

impl Figure {
    pub fn new(title: impl Into<String>, rows: usize, cols: usize) -> Self {
        Self {
            title: title.into(),
            width: 1200,
            height: 900,
            rows: rows.max(1),
            cols: cols.max(1),
            panels: Vec::new(),
        }
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn push(&mut self, panel: Panel) {
        self.panels.push(panel);
    }

    pub fn with(mut self, panel: Panel) -> Self {
        self.push(panel);
        self
    }

    pub fn panel(&self, title: &str) -> Option<&Panel> {
        self.panels.iter().find(|p| p.title == title)
    }

    /// Pixel rectangle `(left, top, width, height)` of a panel inside a
    /// drawing area of `area` pixels.
    pub fn cell_rect(&self, panel: &Panel, area: (u32, u32)) -> (u32, u32, u32, u32) {
        let cw = area.0 / self.cols as u32;
        let ch = area.1 / self.rows as u32;
        let col_span = panel.col_span.min(self.cols - panel.col.min(self.cols - 1));
        let row_span = panel.row_span.min(self.rows - panel.row.min(self.rows - 1));
        (
            panel.col as u32 * cw,
            panel.row as u32 * ch,
            col_span as u32 * cw,
            row_span as u32 * ch,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_ranges_pad_and_honour_limits() {
        let p = Panel::lines(vec![Series::from_xy(BLUE, &[0.0, 10.0], &[1.0, 3.0])]);
        let (x, y) = p.axis_ranges();
        assert_eq!(x, Interval::new(-0.5, 10.5));
        assert!((y.lo - 0.9).abs() < 1e-12 && (y.hi - 3.1).abs() < 1e-12);
        let (_, y) = p.clone().y_limits(-70.0, 50.0).axis_ranges();
        assert_eq!(y, Interval::new(-70.0, 50.0));
    }

    #[test]
    fn log_panels_drop_non_positive_values() {
        let p = Panel::lines(vec![Series::from_xy(BLUE, &[0.0, 1.0, 2.0], &[0.0, 10.0, 1000.0])])
            .log_y();
        let (_, y) = p.axis_ranges();
        assert!((y.lo.log10() - 0.9).abs() < 1e-12);
        assert!((y.hi.log10() - 3.1).abs() < 1e-12);
        let (_, y) = p.clone().y_limits(1e-3, 1e2).axis_ranges();
        assert_eq!(y, Interval::new(1e-3, 1e2));
    }

    #[test]
    fn log_runs_keep_data_values() {
        let s = Series::from_xy(RED, &[0.0, 1.0, 2.0], &[1e-6, -1.0, 1e-2]);
        assert_eq!(
            s.finite_runs(Scale::Log10),
            vec![vec![(0.0, 1e-6)], vec![(2.0, 1e-2)]]
        );
    }

    #[test]
    fn runs_break_at_gaps() {
        let s = Series::from_xy(RED, &[0.0, 1.0, 2.0, 3.0, 4.0], &[1.0, f64::NAN, 2.0, 3.0, 0.0]);
        assert_eq!(
            s.finite_runs(Scale::Linear),
            vec![vec![(0.0, 1.0)], vec![(2.0, 2.0), (3.0, 3.0), (4.0, 0.0)]]
        );
        assert_eq!(s.finite_runs(Scale::Log10).len(), 2);
        assert_eq!(s.finite_runs(Scale::Log10)[1].len(), 2);
    }

    #[test]
    fn spanning_panel_covers_its_cells() {
        let fig = Figure::new("t", 2, 2).size(800, 600);
        let left = Panel::lines(vec![]).at(0, 0).span(2, 1);
        let top_right = Panel::lines(vec![]).at(0, 1);
        assert_eq!(fig.cell_rect(&left, (800, 600)), (0, 0, 400, 600));
        assert_eq!(fig.cell_rect(&top_right, (800, 600)), (400, 0, 400, 300));
    }

    #[test]
    fn heatmap_range_skips_infinite_cells() {
        let h = HeatmapData {
            values: vec![vec![1.0, f64::INFINITY], vec![-2.0, 0.5]],
            tick_every: 5,
            col_scale: 2.0,
            row_scale: 2.0,
        };
        assert_eq!(h.finite_range(), Some((-2.0, 1.0)));
        assert_eq!((h.rows(), h.cols()), (2, 2));
    }
}
