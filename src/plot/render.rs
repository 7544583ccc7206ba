//! Draws a [`Figure`] with plotters.

use std::error::Error;
use std::fs::create_dir_all;
use std::path::Path;

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::error::{Result, TraceError};
use crate::plot::colormap::viridis;
use crate::plot::figure::{Content, Figure, HeatmapData, Panel, Region, Rgb, Scale};

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Render `figure` to `path`. `.svg` selects the SVG backend, anything else
/// is written as a bitmap.
pub fn render(figure: &Figure, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| TraceError::io(parent, e))?;
    }
    let svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    let size = (figure.width, figure.height);
    let drawn = if svg {
        draw_figure(SVGBackend::new(path, size).into_drawing_area(), figure)
    } else {
        draw_figure(BitMapBackend::new(path, size).into_drawing_area(), figure)
    };
    drawn.map_err(|e| TraceError::Plot(format!("{}: {e}", path.display())))?;
    info!("saved plot to {}", path.display());
    Ok(())
}

fn draw_figure<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    figure: &Figure,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let body = if figure.title.is_empty() {
        root.clone()
    } else {
        root.titled(&figure.title, ("sans-serif", 22))?
    };
    let dim = body.dim_in_pixel();
    for panel in &figure.panels {
        let (left, top, w, h) = figure.cell_rect(panel, dim);
        let area = body.clone().shrink((left, top), (w, h));
        match &panel.content {
            Content::Heatmap(data) => draw_heatmap(&area, panel, data)?,
            _ => draw_xy(&area, panel)?,
        }
    }
    root.present()?;
    Ok(())
}

fn draw_xy<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let (x, y) = panel.axis_ranges();
    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(35).y_label_area_size(60);
    if !panel.title.is_empty() {
        builder.caption(&panel.title, ("sans-serif", 18));
    }
    match panel.y_scale {
        Scale::Linear => {
            let mut chart = builder.build_cartesian_2d(x.lo..x.hi, y.lo..y.hi)?;
            chart
                .configure_mesh()
                .x_desc(panel.x_label.as_str())
                .y_desc(panel.y_label.as_str())
                .draw()?;
            draw_content(&mut chart, panel)
        }
        Scale::Log10 => {
            let mut chart =
                builder.build_cartesian_2d(x.lo..x.hi, (y.lo..y.hi).log_scale())?;
            let decade = |v: &f64| format!("{v:.0e}");
            chart
                .configure_mesh()
                .x_desc(panel.x_label.as_str())
                .y_desc(panel.y_label.as_str())
                .y_label_formatter(&decade)
                .draw()?;
            draw_content(&mut chart, panel)
        }
    }
}

fn draw_content<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    panel: &Panel,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    Y: Ranged<ValueType = f64>,
{
    let mut legend = false;
    match &panel.content {
        Content::Lines(series) => {
            for s in series {
                let colour = rgb(s.colour);
                for (k, run) in s.finite_runs(panel.y_scale).into_iter().enumerate() {
                    let drawn = chart.draw_series(LineSeries::new(run, &colour))?;
                    if let (0, Some(label)) = (k, &s.label) {
                        legend = true;
                        drawn.label(label.as_str()).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], colour)
                        });
                    }
                }
            }
        }
        Content::Regions(regions) => {
            for region in regions {
                match region {
                    Region::Rect { x, y, colour } => {
                        chart.draw_series(std::iter::once(Rectangle::new(
                            [(x.lo, y.lo), (x.hi, y.hi)],
                            rgb(*colour).stroke_width(1),
                        )))?;
                    }
                    Region::Polygon { points, colour } if points.len() == 1 => {
                        chart.draw_series(std::iter::once(Circle::new(
                            points[0],
                            2,
                            rgb(*colour).filled(),
                        )))?;
                    }
                    Region::Polygon { points, colour } => {
                        let mut closed = points.clone();
                        if points.len() > 2 {
                            closed.push(points[0]);
                        }
                        chart.draw_series(std::iter::once(PathElement::new(closed, rgb(*colour))))?;
                    }
                }
            }
        }
        Content::Heatmap(_) => {}
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_heatmap<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    data: &HeatmapData,
) -> std::result::Result<(), Box<dyn Error>>
where
    DB::ErrorType: 'static,
{
    let (x, y) = panel.axis_ranges();
    let mut builder = ChartBuilder::on(area);
    builder.margin(10).x_label_area_size(35).y_label_area_size(50);
    if !panel.title.is_empty() {
        builder.caption(&panel.title, ("sans-serif", 18));
    }
    let mut chart = builder.build_cartesian_2d(x.lo..x.hi, y.lo..y.hi)?;

    let every = data.tick_every.max(1);
    let x_fmt = |v: &f64| format!("{}", v.round() * data.col_scale);
    let y_fmt = |v: &f64| format!("{}", (-v).round() * data.row_scale);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(data.cols() / every + 1)
        .y_labels(data.rows() / every + 1)
        .x_label_formatter(&x_fmt)
        .y_label_formatter(&y_fmt)
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .draw()?;

    let (lo, hi) = data.finite_range().unwrap_or((0.0, 1.0));
    let width = if hi > lo { hi - lo } else { 1.0 };
    let cells = data.values.iter().enumerate().flat_map(|(r, row)| {
        row.iter().enumerate().map(move |(c, v)| {
            let t = if v.is_infinite() {
                if *v > 0.0 { 1.0 } else { 0.0 }
            } else {
                (v - lo) / width
            };
            let (cx, cy) = (c as f64, -(r as f64));
            Rectangle::new(
                [(cx - 0.5, cy + 0.5), (cx + 0.5, cy - 0.5)],
                rgb(viridis(t)).filled(),
            )
        })
    });
    chart.draw_series(cells)?;
    Ok(())
}
