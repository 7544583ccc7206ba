use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::window::RowWindow;
use crate::sim::morris_lecar::SumOrder;
use crate::sim::Backend;

/// Generate Morris–Lecar and Hénon traces in float, interval or affine
/// arithmetic, and plot what the enclosures look like.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config TOML
    #[arg(long, global = true, default_value = "arpra-tools.toml")]
    pub config: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Figure path; `.svg` writes SVG, anything else PNG
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Trace used as x (overrides config)
    #[arg(long, global = true)]
    pub x: Option<String>,

    /// Trace used as y (overrides config)
    #[arg(long, global = true)]
    pub y: Option<String>,

    /// Time trace (overrides config)
    #[arg(long, global = true)]
    pub t: Option<String>,
}

#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct WindowArgs {
    /// First row read
    #[arg(long)]
    pub start: Option<usize>,
    /// Stop before this row
    #[arg(long)]
    pub stop: Option<usize>,
    /// Keep every n-th row
    #[arg(long)]
    pub step: Option<usize>,
}

impl WindowArgs {
    pub fn window(&self) -> RowWindow {
        RowWindow {
            start: self.start,
            stop: self.stop,
            step: self.step,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderArg {
    AsIs,
    Shuffled,
    Ascending,
    Descending,
}

impl OrderArg {
    pub fn sum_order(self, seed: u64) -> SumOrder {
        match self {
            Self::AsIs => SumOrder::AsIs,
            Self::Shuffled => SumOrder::Shuffled(seed),
            Self::Ascending => SumOrder::Ascending,
            Self::Descending => SumOrder::Descending,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the Morris–Lecar network once and write its traces
    Simulate {
        #[arg(long, value_enum, default_value = "affine")]
        backend: Backend,
        #[arg(long, value_enum, default_value = "as-is")]
        order: OrderArg,
        /// Seed of the per-step shuffle
        #[arg(long, default_value_t = 0)]
        shuffle_seed: u64,
        dir: PathBuf,
    },
    /// Write a shuffled float ensemble plus sorted, interval and affine runs
    Ensemble {
        /// Members to write (overrides config)
        #[arg(long)]
        samples: Option<usize>,
        dir: PathBuf,
    },
    /// Write affine runs over a grid of input counts and rates
    Sweep { dir: PathBuf },
    /// Iterate the Hénon map and write its traces
    Henon {
        #[arg(long, value_enum, default_value = "affine")]
        backend: Backend,
        dir: PathBuf,
    },
    /// Heatmaps of the summed radius over a sweep
    RadiusGrid { dir: PathBuf },
    /// Ensemble mean/std next to the affine centre/radius
    EnsembleStats {
        #[arg(long)]
        samples: Option<usize>,
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
    /// Affine bounds against ensemble mean ± std, and their difference
    Compare {
        #[arg(long)]
        samples: Option<usize>,
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
    /// Trajectory and bounds of one affine run
    Trajectory {
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
    /// Trajectories of every ensemble member
    FloatOverlay {
        #[arg(long)]
        samples: Option<usize>,
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
    /// Trajectory and endpoints of one interval run
    IntervalTrajectory {
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
    /// Boxes and joint regions of x and y, one per row
    JointRange {
        /// Largest symbol union reconstructed (overrides config)
        #[arg(long)]
        max_terms: Option<usize>,
        #[command(flatten)]
        window: WindowArgs,
        dir: PathBuf,
    },
}

impl Command {
    /// File stem of the figure this command draws, if any.
    pub fn figure_stem(&self) -> Option<&'static str> {
        match self {
            Self::Simulate { .. } | Self::Ensemble { .. } | Self::Sweep { .. } | Self::Henon { .. } => {
                None
            }
            Self::RadiusGrid { .. } => Some("radius_grid"),
            Self::EnsembleStats { .. } => Some("ensemble_stats"),
            Self::Compare { .. } => Some("compare"),
            Self::Trajectory { .. } => Some("trajectory"),
            Self::FloatOverlay { .. } => Some("float_overlay"),
            Self::IntervalTrajectory { .. } => Some("interval_trajectory"),
            Self::JointRange { .. } => Some("joint_range"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_window_and_globals() {
        let args = Args::try_parse_from([
            "arpra-tools",
            "joint-range",
            "--start",
            "10",
            "--stop",
            "50",
            "--step",
            "5",
            "out/arpra",
            "-vv",
            "--x",
            "henon_x",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        assert_eq!(args.x.as_deref(), Some("henon_x"));
        let Command::JointRange { window, max_terms, dir } = args.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(window.window(), RowWindow::range(10, 50).with_step(5));
        assert_eq!(max_terms, None);
        assert_eq!(dir, PathBuf::from("out/arpra"));
    }

    #[test]
    fn simulate_defaults() {
        let args = Args::try_parse_from(["arpra-tools", "simulate", "run"]).unwrap();
        assert_eq!(args.config, PathBuf::from("arpra-tools.toml"));
        assert_eq!(args.command.figure_stem(), None);
        let Command::Simulate { backend, order, shuffle_seed, .. } = args.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(backend, Backend::Affine);
        assert_eq!(order.sum_order(shuffle_seed), SumOrder::AsIs);
    }
}
