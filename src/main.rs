// Entry point: loads config, writes traces or draws one analysis figure.
use std::error::Error;

use arpra_tools::cli::{Args, Command, WindowArgs};
use arpra_tools::config::AppConfig;
use arpra_tools::core::trace::TraceDir;
use arpra_tools::core::window::RowWindow;
use arpra_tools::experiments::{
    comparison, ensemble_stats, joint_range, radius_grid, trajectory, VarNames,
};
use arpra_tools::plot::{render, Figure};
use arpra_tools::sim::dataset::{self, EnsembleSpec, SweepSpec};
use arpra_tools::sim::henon;
use arpra_tools::sim::morris_lecar::MorrisLecar;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn var_names(args: &Args, cfg: &AppConfig) -> VarNames {
    let mut names = cfg.names.clone();
    if let Some(x) = &args.x {
        names.x = x.clone();
    }
    if let Some(y) = &args.y {
        names.y = y.clone();
    }
    if let Some(t) = &args.t {
        names.t = t.clone();
    }
    names
}

/// Ensemble analyses read `[ensemble] rows` rows unless `--stop` says otherwise.
fn ensemble_window(window: &WindowArgs, cfg: &AppConfig) -> RowWindow {
    let mut w = window.window();
    if w.stop.is_none() && cfg.ensemble.rows > 0 {
        w.stop = Some(cfg.ensemble.rows);
    }
    w
}

fn generate(command: &Command, cfg: &AppConfig) -> Result<(), Box<dyn Error>> {
    let sim = &cfg.simulation;
    match command {
        Command::Simulate {
            backend,
            order,
            shuffle_seed,
            dir,
        } => {
            let model = MorrisLecar::new(sim.params(), sim.seed)?;
            dataset::write_backend_run(
                &model,
                *backend,
                order.sum_order(*shuffle_seed),
                sim.reduction(),
                &TraceDir::new(dir),
                sim.synapses,
            )?;
        }
        Command::Ensemble { samples, dir } => {
            let spec = EnsembleSpec {
                samples: samples.unwrap_or(cfg.ensemble.samples),
                seed: sim.seed,
                synapses: sim.synapses,
                reduction: sim.reduction(),
            };
            dataset::ensemble(&sim.params(), &spec, dir)?;
        }
        Command::Sweep { dir } => {
            let spec = SweepSpec {
                size: cfg.grid.size,
                input_step: cfg.grid.input_step,
                freq_step: cfg.grid.freq_step,
                seed: sim.seed,
                reduction: sim.reduction(),
            };
            dataset::sweep(&sim.params(), &spec, dir)?;
        }
        Command::Henon { backend, dir } => {
            henon::write_backend(&cfg.henon.params(), *backend, cfg.henon.reduction(), &TraceDir::new(dir))?;
        }
        _ => {}
    }
    Ok(())
}

fn analyse(command: &Command, cfg: &AppConfig, names: &VarNames) -> Result<Option<Figure>, Box<dyn Error>> {
    let samples = |s: &Option<usize>| s.unwrap_or(cfg.ensemble.samples);
    let figure = match command {
        Command::RadiusGrid { dir } => radius_grid::radius_grid(dir, names, &cfg.grid)?,
        Command::EnsembleStats {
            samples: s,
            window,
            dir,
        } => ensemble_stats::ensemble_stats(dir, names, samples(s), &ensemble_window(window, cfg))?,
        Command::Compare {
            samples: s,
            window,
            dir,
        } => comparison::comparison(dir, names, samples(s), &ensemble_window(window, cfg))?,
        Command::Trajectory { window, dir } => {
            trajectory::affine_trajectory(dir, names, &window.window())?
        }
        Command::FloatOverlay {
            samples: s,
            window,
            dir,
        } => trajectory::float_overlay(dir, names, samples(s), &ensemble_window(window, cfg))?,
        Command::IntervalTrajectory { window, dir } => {
            trajectory::interval_trajectory(dir, names, &window.window())?
        }
        Command::JointRange {
            max_terms,
            window,
            dir,
        } => joint_range::joint_range(
            dir,
            names,
            &window.window(),
            max_terms.unwrap_or(cfg.joint.max_terms),
        )?,
        _ => return Ok(None),
    };
    Ok(Some(figure))
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let cfg = AppConfig::load_or_default(&args.config);
    let names = var_names(&args, &cfg);

    let Some(stem) = args.command.figure_stem() else {
        generate(&args.command, &cfg)?;
        info!("traces written");
        return Ok(());
    };

    let Some(mut figure) = analyse(&args.command, &cfg, &names)? else {
        return Ok(());
    };
    if cfg.plot.width > 0 && cfg.plot.height > 0 {
        figure = figure.size(cfg.plot.width, cfg.plot.height);
    }
    let out = args
        .out
        .clone()
        .unwrap_or_else(|| cfg.plot.out_dir.join(format!("{stem}.png")));
    render(&figure, &out)?;
    println!("Saved {stem} to {}", out.display());
    Ok(())
}
