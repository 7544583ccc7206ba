//! The analyses. Each one loads traces, derives the plotted quantities and
//! returns a [`Figure`](crate::plot::Figure); the binary renders it.

pub mod comparison;
pub mod ensemble_stats;
pub mod joint_range;
pub mod radius_grid;
pub mod trajectory;

use serde::{Deserialize, Serialize};

use crate::core::trace::{read_scalar, TraceDir};
use crate::core::window::RowWindow;
use crate::error::{Result, TraceError};
use crate::sim::dataset::member_dir;

/// Which traces play the roles of `x`, `y` and time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarNames {
    #[serde(default = "VarNames::default_x")]
    pub x: String,
    #[serde(default = "VarNames::default_y")]
    pub y: String,
    #[serde(default = "VarNames::default_t")]
    pub t: String,
}

impl VarNames {
    fn default_x() -> String {
        "nrn1_V_000".into()
    }

    fn default_y() -> String {
        "nrn1_N_000".into()
    }

    fn default_t() -> String {
        "time_000".into()
    }

    pub fn new(x: impl Into<String>, y: impl Into<String>, t: impl Into<String>) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            t: t.into(),
        }
    }
}

impl Default for VarNames {
    fn default() -> Self {
        Self {
            x: Self::default_x(),
            y: Self::default_y(),
            t: Self::default_t(),
        }
    }
}

/// Display name of a trace: `nrn1_V_000` becomes `V`, anything not shaped
/// `<owner>_<var>_<index>` is kept whole.
pub fn short_name(name: &str) -> &str {
    let parts: Vec<&str> = name.split('_').collect();
    match parts.as_slice() {
        [_, var, idx] if idx.chars().all(|c| c.is_ascii_digit()) => *var,
        _ => name,
    }
}

/// Float series `name` of ensemble members `i_0 .. i_<samples-1>`.
pub(crate) fn read_members(
    root: &TraceDir,
    samples: usize,
    name: &str,
    window: &RowWindow,
) -> Result<Vec<Vec<f64>>> {
    if samples == 0 {
        return Err(TraceError::Empty(format!(
            "no ensemble members requested under {}",
            root.path().display()
        )));
    }
    (0..samples)
        .map(|k| read_scalar(&root.subdir(&member_dir(k)), name, window))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names() {
        assert_eq!(short_name("nrn1_V_000"), "V");
        assert_eq!(short_name("syn_exc_R_003"), "syn_exc_R_003");
        assert_eq!(short_name("henon_x"), "henon_x");
    }

    #[test]
    fn zero_members_is_an_error() {
        let root = TraceDir::new("unused");
        let err = read_members(&root, 0, "x", &RowWindow::all()).unwrap_err();
        assert!(matches!(err, TraceError::Empty(_)));
    }
}
