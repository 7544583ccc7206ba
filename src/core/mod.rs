pub mod affine;
pub mod columns;
pub mod hull;
pub mod interval;
pub mod joint;
pub mod stats;
pub mod trace;
pub mod window;
