use arpra_tools::core::affine::{AffineForm, SymbolSource};
use arpra_tools::core::interval::Interval;
use arpra_tools::core::trace::{
    read_affine, read_interval, read_range, read_scalar, TraceDir, TraceWriter,
};
use arpra_tools::core::window::RowWindow;

fn forms() -> Vec<AffineForm> {
    let mut src = SymbolSource::new();
    let mut x = AffineForm::with_radius(0.1, 1e-3, &mut src);
    let mut out = vec![x.clone()];
    for _ in 0..9 {
        let xx = x.mul(&x, &mut src);
        x = xx.scale(-0.5, &mut src).add_scalar(1.0, &mut src);
        out.push(x.clone());
    }
    out
}

#[test]
fn affine_writer_output_decodes_to_the_same_forms() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = TraceDir::new(tmp.path());
    let written = forms();
    let mut w = TraceWriter::<AffineForm>::create(&dir, "x").unwrap();
    for f in &written {
        w.write(f).unwrap();
    }
    assert_eq!(w.rows(), written.len());
    w.finish().unwrap();

    let trace = read_affine(&dir, "x", &RowWindow::all()).unwrap();
    assert_eq!(trace.forms.len(), written.len());
    for (a, b) in trace.forms.iter().zip(&written) {
        assert_eq!(a.centre(), b.centre());
        assert_eq!(a.symbols(), b.symbols());
        assert_eq!(a.deviations(), b.deviations());
        assert_eq!(a.radius(), b.radius());
    }
}

#[test]
fn windows_select_the_same_rows_in_every_part() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = TraceDir::new(tmp.path());
    let written = forms();
    let mut w = TraceWriter::<AffineForm>::create(&dir, "x").unwrap();
    for f in &written {
        w.write(f).unwrap();
    }
    w.finish().unwrap();

    let window = RowWindow::range(1, 8).with_step(3);
    let range = read_range(&dir, "x", &window).unwrap();
    let trace = read_affine(&dir, "x", &window).unwrap();
    assert_eq!(range.len(), 3);
    for (k, row) in [1usize, 4, 7].into_iter().enumerate() {
        assert_eq!(range.centre[k], written[row].centre());
        assert_eq!(trace.forms[k].symbols(), written[row].symbols());
    }

    // Past the end the reader returns what is there.
    let tail = read_range(&dir, "x", &RowWindow::range(8, 100)).unwrap();
    assert_eq!(tail.len(), 2);
}

#[test]
fn float_and_interval_traces_use_plain_files() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = TraceDir::new(tmp.path());

    let mut w = TraceWriter::<f64>::create(&dir, "time_000").unwrap();
    for k in 1..=4 {
        w.write(&(0.5 * k as f64)).unwrap();
    }
    w.finish().unwrap();
    let t = read_scalar(&dir, "time_000", &RowWindow::all()).unwrap();
    assert_eq!(t, vec![0.5, 1.0, 1.5, 2.0]);

    let mut w = TraceWriter::<Interval>::create(&dir, "nrn1_V_000").unwrap();
    w.write(&Interval::new(-60.5, -59.5)).unwrap();
    w.write(&Interval::new(f64::NEG_INFINITY, f64::INFINITY)).unwrap();
    w.finish().unwrap();
    let v = read_interval(&dir, "nrn1_V_000", &RowWindow::all()).unwrap();
    assert_eq!(v[0], Interval::new(-60.5, -59.5));
    assert!(v[1].lo.is_infinite() && v[1].hi.is_infinite());
    assert!(dir.plain("nrn1_V_000").exists());
    assert!(!dir.has_terms("nrn1_V_000"));
}
