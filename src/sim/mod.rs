//! Trace generators: the Morris–Lecar network and the Hénon map, each
//! runnable in float, interval or affine arithmetic.

pub mod arith;
pub mod dataset;
pub mod henon;
pub mod morris_lecar;
pub mod ode;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    Float,
    Interval,
    Affine,
}
