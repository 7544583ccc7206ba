use arpra_tools::config::AppConfig;
use arpra_tools::core::hull::polygon_contains;
use arpra_tools::core::interval::Interval;
use arpra_tools::core::trace::TraceDir;
use arpra_tools::core::window::RowWindow;
use arpra_tools::experiments::joint_range::{frame_colour, frames_figure, joint_frames};
use arpra_tools::experiments::VarNames;
use arpra_tools::plot::{Content, Region};
use arpra_tools::sim::arith::{AffineArith, Reduction};
use arpra_tools::sim::henon::{self, HenonParams};
use arpra_tools::sim::Backend;

fn henon_names() -> VarNames {
    VarNames::new("henon_x", "henon_y", "time_000")
}

#[test]
fn frames_carry_boxes_and_hulls_inside_them() {
    let tmp = tempfile::tempdir().unwrap();
    let params = HenonParams {
        steps: 40,
        ..HenonParams::default()
    };
    let reduction = Reduction {
        max_terms: 5,
        ..Reduction::default()
    };
    henon::write(&params, &mut AffineArith::new(reduction), &TraceDir::new(tmp.path())).unwrap();

    let window = RowWindow::range(5, 40).with_step(5);
    let frames = joint_frames(tmp.path(), &henon_names(), &window, 15).unwrap();
    assert_eq!(frames.len(), 7);
    for (k, f) in frames.iter().enumerate() {
        assert_eq!(f.row, 5 + 5 * k);
        assert_eq!(f.colour, frame_colour(k));
        assert_eq!(f.x.centre(), 0.0);
        let hull = f.hull.as_ref().expect("symbol files were written");
        let tol = 1e-9 * (1.0 + f.x.hi + f.y.hi);
        for &(px, py) in hull {
            assert!(f.x.lo - tol <= px && px <= f.x.hi + tol);
            assert!(f.y.lo - tol <= py && py <= f.y.hi + tol);
        }
        // The box centre is always inside the joint region.
        assert!(polygon_contains(hull, (0.0, 0.0), tol) || hull.len() < 3);
    }

    let fig = frames_figure(&frames, &henon_names());
    let Content::Regions(regions) = &fig.panels[0].content else {
        panic!("expected regions");
    };
    assert_eq!(regions.len(), 2 * frames.len());
    assert!(matches!(regions[0], Region::Rect { .. }));
    assert!(matches!(regions[1], Region::Polygon { .. }));
}

#[test]
fn rows_over_the_term_limit_keep_only_their_box() {
    let tmp = tempfile::tempdir().unwrap();
    let params = HenonParams {
        steps: 10,
        ..HenonParams::default()
    };
    let reduction = Reduction {
        epoch: 0,
        merge_step_terms: false,
        ..Reduction::default()
    };
    henon::write(&params, &mut AffineArith::new(reduction), &TraceDir::new(tmp.path())).unwrap();

    let frames = joint_frames(tmp.path(), &henon_names(), &RowWindow::all(), 4).unwrap();
    assert_eq!(frames.len(), 10);
    assert!(frames.first().unwrap().hull.is_some());
    assert!(frames.last().unwrap().hull.is_none());
    assert!(frames.last().unwrap().x.radius() > 0.0);
}

#[test]
fn centre_radius_traces_draw_boxes_only() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = TraceDir::new(tmp.path());
    std::fs::write(dir.path().join("x_c.dat"), "1\n2\n3\n").unwrap();
    std::fs::write(dir.path().join("x_r.dat"), "0.1\n0.2\n0.3\n").unwrap();
    std::fs::write(dir.path().join("y_c.dat"), "1\n2\n3\n").unwrap();
    std::fs::write(dir.path().join("y_r.dat"), "1\n2\n3\n").unwrap();

    let names = VarNames::new("x", "y", "t");
    let frames = joint_frames(tmp.path(), &names, &RowWindow::all(), 15).unwrap();
    assert_eq!(frames.len(), 3);
    assert!(frames.iter().all(|f| f.hull.is_none()));
    assert_eq!(frames[2].y, Interval::new(-3.0, 3.0));
}

#[test]
fn default_henon_run_has_a_hull_on_every_frame() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = AppConfig::default();
    let params = HenonParams {
        steps: 150,
        ..cfg.henon.params()
    };
    henon::write_backend(&params, Backend::Affine, cfg.henon.reduction(), &TraceDir::new(tmp.path()))
        .unwrap();

    let frames = joint_frames(tmp.path(), &henon_names(), &RowWindow::all(), cfg.joint.max_terms).unwrap();
    assert_eq!(frames.len(), 150);
    assert!(frames.iter().all(|f| f.hull.is_some()));
}
