use crate::experiments::radius_grid::GridSpec;
use crate::experiments::VarNames;
use crate::sim::arith::Reduction;
use crate::sim::henon::HenonParams;
use crate::sim::morris_lecar::MorrisLecarParams;
use crate::sim::ode::Stepper;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Figure size in pixels; 0 keeps the size each analysis picks.
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Where figures go when `--out` is not given.
    #[serde(default = "PlotConfig::default_out_dir")]
    pub out_dir: PathBuf,
}

impl PlotConfig {
    fn default_out_dir() -> PathBuf {
        PathBuf::from("plots")
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            out_dir: Self::default_out_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Float runs `i_0 .. i_<samples-1>`.
    #[serde(default = "EnsembleConfig::default_samples")]
    pub samples: usize,
    /// Rows read by the ensemble analyses; 0 reads every row.
    #[serde(default)]
    pub rows: usize,
}

impl EnsembleConfig {
    fn default_samples() -> usize {
        100
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            samples: Self::default_samples(),
            rows: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "SimulationConfig::default_h")]
    pub h: f64,
    #[serde(default = "SimulationConfig::default_steps")]
    pub steps: usize,
    #[serde(default = "SimulationConfig::default_inputs")]
    pub inputs: usize,
    #[serde(default = "SimulationConfig::default_freq")]
    pub freq: f64,
    #[serde(default = "SimulationConfig::default_seed")]
    pub seed: u64,
    #[serde(default = "SimulationConfig::default_reduce_epoch")]
    pub reduce_epoch: usize,
    #[serde(default = "SimulationConfig::default_reduce_fraction")]
    pub reduce_fraction: f64,
    #[serde(default = "SimulationConfig::default_merge_step_terms")]
    pub merge_step_terms: bool,
    /// Cap on noise terms per affine form; 0 means unlimited.
    #[serde(default)]
    pub max_terms: usize,
    /// Synapses whose `R`/`S` traces are written.
    #[serde(default = "SimulationConfig::default_synapses")]
    pub synapses: usize,
    /// `euler` or `rk2` (Heun).
    #[serde(default)]
    pub stepper: Stepper,
}

impl SimulationConfig {
    fn default_h() -> f64 {
        0.5
    }
    fn default_steps() -> usize {
        1000
    }
    fn default_inputs() -> usize {
        50
    }
    fn default_freq() -> f64 {
        5.0
    }
    fn default_seed() -> u64 {
        1
    }
    fn default_reduce_epoch() -> usize {
        50
    }
    fn default_reduce_fraction() -> f64 {
        0.3
    }
    fn default_merge_step_terms() -> bool {
        true
    }
    fn default_synapses() -> usize {
        1
    }

    pub fn params(&self) -> MorrisLecarParams {
        MorrisLecarParams {
            h: self.h,
            steps: self.steps,
            inputs: self.inputs,
            freq: self.freq,
            stepper: self.stepper,
            ..MorrisLecarParams::default()
        }
    }

    pub fn reduction(&self) -> Reduction {
        Reduction {
            epoch: self.reduce_epoch,
            min_fraction: self.reduce_fraction,
            merge_step_terms: self.merge_step_terms,
            max_terms: self.max_terms,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            h: Self::default_h(),
            steps: Self::default_steps(),
            inputs: Self::default_inputs(),
            freq: Self::default_freq(),
            seed: Self::default_seed(),
            reduce_epoch: Self::default_reduce_epoch(),
            reduce_fraction: Self::default_reduce_fraction(),
            merge_step_terms: Self::default_merge_step_terms(),
            max_terms: 0,
            synapses: Self::default_synapses(),
            stepper: Stepper::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HenonConfig {
    #[serde(default = "HenonConfig::default_a")]
    pub a: f64,
    #[serde(default = "HenonConfig::default_b")]
    pub b: f64,
    #[serde(default = "HenonConfig::default_radius")]
    pub radius: f64,
    #[serde(default = "HenonConfig::default_steps")]
    pub steps: usize,
    /// Cap on terms per coordinate. `y` carries the previous `x`'s symbols,
    /// so a joint frame sees at most twice this many; 7 keeps every frame
    /// within the default `[joint] max_terms` of 15. 0 means unlimited.
    #[serde(default = "HenonConfig::default_max_terms")]
    pub max_terms: usize,
}

impl HenonConfig {
    fn default_a() -> f64 {
        1.057
    }
    fn default_b() -> f64 {
        0.3
    }
    fn default_radius() -> f64 {
        1e-5
    }
    fn default_steps() -> usize {
        500
    }
    fn default_max_terms() -> usize {
        7
    }

    pub fn params(&self) -> HenonParams {
        HenonParams {
            a: self.a,
            b: self.b,
            radius: self.radius,
            steps: self.steps,
            ..HenonParams::default()
        }
    }

    /// The map creates one rounding term per operation; they are left
    /// unmerged, the periodic small-term sweep runs and `max_terms` caps
    /// what remains.
    pub fn reduction(&self) -> Reduction {
        Reduction {
            merge_step_terms: false,
            max_terms: self.max_terms,
            ..Reduction::default()
        }
    }
}

impl Default for HenonConfig {
    fn default() -> Self {
        Self {
            a: Self::default_a(),
            b: Self::default_b(),
            radius: Self::default_radius(),
            steps: Self::default_steps(),
            max_terms: Self::default_max_terms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    /// Rows with more shared noise symbols than this draw only their box.
    #[serde(default = "JointConfig::default_max_terms")]
    pub max_terms: usize,
}

impl JointConfig {
    fn default_max_terms() -> usize {
        15
    }
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            max_terms: Self::default_max_terms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default)]
    pub names: VarNames,
    #[serde(default)]
    pub grid: GridSpec,
    #[serde(default)]
    pub ensemble: EnsembleConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub henon: HenonConfig,
    #[serde(default)]
    pub joint: JointConfig,
}

impl AppConfig {
    /// Every key line commented out, section headers kept.
    fn commented(text: &str) -> String {
        let mut out = String::new();
        for line in text.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                out.push('\n');
            } else if trimmed.starts_with('[') && trimmed.ends_with(']') {
                out.push_str(line);
                out.push('\n');
            } else {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("Failed to parse config {}: {err}. Using defaults.", path.display());
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {}: {err}. Using defaults.", path.display());
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults and return them.
        let default_cfg = Self::default();
        match toml::to_string_pretty(&default_cfg) {
            Ok(text) => match fs::write(path, Self::commented(&text)) {
                Ok(()) => info!("wrote default config to {}", path.display()),
                Err(err) => warn!("Failed to write default config to {}: {err}", path.display()),
            },
            Err(err) => warn!("Failed to serialize default config: {err}; continuing with defaults"),
        }
        default_cfg
    }
}
