//! Figure model, colour maps and the plotters renderer.

pub mod colormap;
pub mod figure;
pub mod render;

pub use figure::{Content, Figure, HeatmapData, Panel, Region, Scale, Series};
pub use render::render;
