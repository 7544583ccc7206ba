use std::path::Path;

use arpra_tools::core::window::RowWindow;
use arpra_tools::experiments::comparison::BoundComparison;
use arpra_tools::experiments::ensemble_stats::EnsembleComparison;
use arpra_tools::experiments::{comparison, trajectory, VarNames};
use arpra_tools::sim::arith::Reduction;
use arpra_tools::sim::dataset::{self, EnsembleSpec, AFFINE_DIR, INTERVAL_DIR};
use arpra_tools::sim::morris_lecar::MorrisLecarParams;

const SAMPLES: usize = 3;
const STEPS: usize = 30;

fn write_ensemble(root: &Path) {
    let params = MorrisLecarParams {
        steps: STEPS,
        inputs: 5,
        freq: 40.0,
        ..MorrisLecarParams::default()
    };
    let spec = EnsembleSpec {
        samples: SAMPLES,
        seed: 7,
        synapses: 1,
        reduction: Reduction::default(),
    };
    dataset::ensemble(&params, &spec, root).unwrap();
}

#[test]
fn ensemble_stats_line_up_with_the_affine_run() {
    let tmp = tempfile::tempdir().unwrap();
    write_ensemble(tmp.path());
    let names = VarNames::default();

    let stats = EnsembleComparison::load(tmp.path(), &names, SAMPLES, &RowWindow::all()).unwrap();
    assert_eq!(stats.time.len(), STEPS);
    assert_eq!(stats.time[0], 0.5);
    assert_eq!(stats.x.len(), STEPS);
    assert_eq!(stats.affine_x.len(), STEPS);
    for k in 0..STEPS {
        assert!(stats.x.std[k] >= 0.0);
        let lo = stats.affine_x.centre[k] - stats.affine_x.radius[k];
        let hi = stats.affine_x.centre[k] + stats.affine_x.radius[k];
        let slack = 1e-6 * (1.0 + stats.x.mean[k].abs());
        assert!(lo - slack <= stats.x.mean[k] && stats.x.mean[k] <= hi + slack, "row {k}");
    }

    let fig = stats.figure(&names);
    assert_eq!(fig.panels.len(), 4);
    assert_eq!(fig.panels[0].series().len(), 2);
    assert_eq!(fig.panels[3].row, 3);
}

#[test]
fn bound_comparison_is_non_negative_and_windowed() {
    let tmp = tempfile::tempdir().unwrap();
    write_ensemble(tmp.path());
    let names = VarNames::default();

    let window = RowWindow::range(0, 20).with_step(2);
    let cmp = BoundComparison::load(tmp.path(), &names, SAMPLES, &window).unwrap();
    assert_eq!(cmp.time.len(), 10);
    assert_eq!(cmp.diff_x.len(), 10);
    assert!(cmp.diff_x.iter().chain(&cmp.diff_y).all(|d| *d >= 0.0 && d.is_finite()));

    let fig = comparison::comparison(tmp.path(), &names, SAMPLES, &window).unwrap();
    assert_eq!(fig.panels.len(), 4);
    let v = fig.panel("V bounds").unwrap();
    assert_eq!(v.y_limits, Some(comparison::X_LIMITS));
    assert_eq!(v.series()[0].label.as_deref(), Some("affine"));
    assert_eq!(v.series()[2].label.as_deref(), Some("floating-point"));
    let diff = fig.panel("N bound difference").unwrap();
    assert_eq!(diff.y_scale, arpra_tools::plot::Scale::Log10);
    assert_eq!(diff.series()[0].colour, arpra_tools::plot::figure::RED);
}

#[test]
fn trajectories_read_every_layout() {
    let tmp = tempfile::tempdir().unwrap();
    write_ensemble(tmp.path());
    let names = VarNames::default();
    let all = RowWindow::all();

    let affine = trajectory::affine_trajectory(&tmp.path().join(AFFINE_DIR), &names, &all).unwrap();
    assert_eq!(affine.panels.len(), 3);
    assert_eq!(affine.panels[0].row_span, 2);
    assert_eq!(affine.panels[0].series()[0].points.len(), STEPS);

    let overlay = trajectory::float_overlay(tmp.path(), &names, SAMPLES, &all).unwrap();
    assert_eq!(overlay.panel("trajectory").unwrap().series().len(), SAMPLES);

    let interval =
        trajectory::interval_trajectory(&tmp.path().join(INTERVAL_DIR), &names, &all).unwrap();
    let x = interval.panel("V").unwrap().series();
    assert_eq!(x.len(), 2);
    for (lo, hi) in x[0].points.iter().zip(&x[1].points) {
        assert!(lo.1 <= hi.1);
        assert_eq!(lo.0, hi.0);
    }
}

#[test]
fn missing_members_are_errors() {
    let tmp = tempfile::tempdir().unwrap();
    write_ensemble(tmp.path());
    let names = VarNames::default();
    assert!(EnsembleComparison::load(tmp.path(), &names, SAMPLES + 1, &RowWindow::all()).is_err());
}
