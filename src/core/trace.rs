//! core/trace.rs — simulation traces on disk.
//!
//! A trace is one variable (`nrn1_V_000`, `time_000`, ...) in one output
//! directory. Float and interval traces live in `<name>.dat`; affine traces
//! are split over `<name>_c.dat` (centre), `_r` (radius), `_n` (term count),
//! `_s` (noise symbols) and `_d` (deviations), one row per time step.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::core::affine::{is_normalised, AffineForm};
use crate::core::columns::{
    parse_pair_column, parse_scalar_column, parse_symbol_rows, parse_value_rows, read_rows,
};
use crate::core::interval::Interval;
use crate::core::stats;
use crate::core::window::RowWindow;
use crate::error::{Result, TraceError};

/// Files of an affine trace, by suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Part {
    Centre,
    Radius,
    Count,
    Symbols,
    Deviations,
}

impl Part {
    pub fn suffix(self) -> &'static str {
        match self {
            Part::Centre => "c",
            Part::Radius => "r",
            Part::Count => "n",
            Part::Symbols => "s",
            Part::Deviations => "d",
        }
    }
}

/// An output directory holding traces.
#[derive(Clone, Debug)]
pub struct TraceDir {
    dir: PathBuf,
}

impl TraceDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<name>.dat`
    pub fn plain(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.dat"))
    }

    /// `<dir>/<name>_<suffix>.dat`
    pub fn part(&self, name: &str, part: Part) -> PathBuf {
        self.dir.join(format!("{name}_{}.dat", part.suffix()))
    }

    /// Whether the symbol and deviation files of an affine trace exist.
    pub fn has_terms(&self, name: &str) -> bool {
        self.part(name, Part::Symbols).exists() && self.part(name, Part::Deviations).exists()
    }

    pub fn subdir(&self, name: &str) -> TraceDir {
        TraceDir::new(self.dir.join(name))
    }
}

/// Centre and radius of an affine trace, row-aligned.
#[derive(Clone, Debug, Default)]
pub struct RangeSeries {
    pub centre: Vec<f64>,
    pub radius: Vec<f64>,
}

impl RangeSeries {
    pub fn len(&self) -> usize {
        self.centre.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centre.is_empty()
    }

    pub fn lower(&self) -> Vec<f64> {
        stats::lower(&self.centre, &self.radius)
    }

    pub fn upper(&self) -> Vec<f64> {
        stats::upper(&self.centre, &self.radius)
    }
}

/// A fully decoded affine trace.
#[derive(Clone, Debug, Default)]
pub struct AffineTrace {
    pub range: RangeSeries,
    pub forms: Vec<AffineForm>,
}

fn check_rows(left: &Path, left_rows: usize, right: &Path, right_rows: usize) -> Result<()> {
    if left_rows != right_rows {
        return Err(TraceError::LengthMismatch {
            left: left.to_path_buf(),
            left_rows,
            right: right.to_path_buf(),
            right_rows,
        });
    }
    Ok(())
}

/// One value per row, `<name>.dat`.
pub fn read_scalar(dir: &TraceDir, name: &str, window: &RowWindow) -> Result<Vec<f64>> {
    let path = dir.plain(name);
    let rows = read_rows(&path, window)?;
    parse_scalar_column(&path, &rows)
}

/// `lo hi` per row, `<name>.dat`.
pub fn read_interval(dir: &TraceDir, name: &str, window: &RowWindow) -> Result<Vec<Interval>> {
    let path = dir.plain(name);
    let rows = read_rows(&path, window)?;
    Ok(parse_pair_column(&path, &rows)?
        .into_iter()
        .map(|(lo, hi)| Interval::new(lo, hi))
        .collect())
}

/// A single affine part file as one value per row.
pub fn read_part(dir: &TraceDir, name: &str, part: Part, window: &RowWindow) -> Result<Vec<f64>> {
    let path = dir.part(name, part);
    let rows = read_rows(&path, window)?;
    parse_scalar_column(&path, &rows)
}

/// Centre and radius columns of an affine trace.
pub fn read_range(dir: &TraceDir, name: &str, window: &RowWindow) -> Result<RangeSeries> {
    let c_path = dir.part(name, Part::Centre);
    let r_path = dir.part(name, Part::Radius);
    let centre = read_part(dir, name, Part::Centre, window)?;
    let radius = read_part(dir, name, Part::Radius, window)?;
    check_rows(&c_path, centre.len(), &r_path, radius.len())?;
    Ok(RangeSeries { centre, radius })
}

/// Decode every row of an affine trace into an [`AffineForm`].
///
/// The `_n` file is optional; when present its counts must agree with the
/// symbol rows. Unsorted or repeated symbols are normalised with a warning.
pub fn read_affine(dir: &TraceDir, name: &str, window: &RowWindow) -> Result<AffineTrace> {
    let range = read_range(dir, name, window)?;
    let c_path = dir.part(name, Part::Centre);
    let s_path = dir.part(name, Part::Symbols);
    let d_path = dir.part(name, Part::Deviations);

    let s_rows = read_rows(&s_path, window)?;
    let d_rows = read_rows(&d_path, window)?;
    check_rows(&c_path, range.len(), &s_path, s_rows.len())?;
    check_rows(&c_path, range.len(), &d_path, d_rows.len())?;
    let symbols = parse_symbol_rows(&s_path, &s_rows)?;
    let deviations = parse_value_rows(&d_path, &d_rows)?;

    let n_path = dir.part(name, Part::Count);
    let counts = if n_path.exists() {
        let counts = read_part(dir, name, Part::Count, window)?;
        check_rows(&c_path, range.len(), &n_path, counts.len())?;
        Some(counts)
    } else {
        None
    };

    let mut forms = Vec::with_capacity(range.len());
    for (k, (syms, devs)) in symbols.into_iter().zip(deviations).enumerate() {
        let line = d_rows[k].line;
        if syms.len() != devs.len() {
            return Err(TraceError::TermMismatch {
                path: d_path.clone(),
                line,
                symbols: syms.len(),
                deviations: devs.len(),
            });
        }
        if let Some(counts) = &counts {
            if counts[k] as usize != syms.len() {
                warn!(
                    line,
                    recorded = counts[k],
                    found = syms.len(),
                    "term count disagrees with symbol row in {}",
                    n_path.display()
                );
            }
        }
        if !is_normalised(&syms) {
            warn!(line, "unsorted noise symbols in {}; normalising", s_path.display());
        }
        forms.push(AffineForm::from_terms(range.centre[k], syms.into_iter().zip(devs)));
    }
    debug!(name, rows = forms.len(), "decoded affine trace");
    Ok(AffineTrace { range, forms })
}

/// A value that can be written as one row of a trace.
pub trait TraceValue {
    /// File suffixes written per row; `None` means the plain `<name>.dat`.
    const PARTS: &'static [Option<Part>];

    fn write_row(&self, outs: &mut [BufWriter<File>]) -> std::io::Result<()>;
}

impl TraceValue for f64 {
    const PARTS: &'static [Option<Part>] = &[None];

    fn write_row(&self, outs: &mut [BufWriter<File>]) -> std::io::Result<()> {
        writeln!(outs[0], "{self:?}")
    }
}

impl TraceValue for Interval {
    const PARTS: &'static [Option<Part>] = &[None];

    fn write_row(&self, outs: &mut [BufWriter<File>]) -> std::io::Result<()> {
        writeln!(outs[0], "{:?} {:?}", self.lo, self.hi)
    }
}

impl TraceValue for AffineForm {
    const PARTS: &'static [Option<Part>] = &[
        Some(Part::Centre),
        Some(Part::Radius),
        Some(Part::Count),
        Some(Part::Symbols),
        Some(Part::Deviations),
    ];

    fn write_row(&self, outs: &mut [BufWriter<File>]) -> std::io::Result<()> {
        writeln!(outs[0], "{:?}", self.centre())?;
        writeln!(outs[1], "{:?}", self.radius())?;
        writeln!(outs[2], "{}", self.n_terms())?;
        for (s, d) in self.terms() {
            write!(outs[3], "{s} ")?;
            write!(outs[4], "{d:?} ")?;
        }
        writeln!(outs[3])?;
        writeln!(outs[4])
    }
}

/// Row-by-row writer for one trace.
pub struct TraceWriter<T: TraceValue> {
    name: String,
    paths: Vec<PathBuf>,
    outs: Vec<BufWriter<File>>,
    rows: usize,
    _value: PhantomData<T>,
}

impl<T: TraceValue> TraceWriter<T> {
    pub fn create(dir: &TraceDir, name: &str) -> Result<Self> {
        std::fs::create_dir_all(dir.path()).map_err(|e| TraceError::io(dir.path(), e))?;
        let mut paths = Vec::with_capacity(T::PARTS.len());
        let mut outs = Vec::with_capacity(T::PARTS.len());
        for part in T::PARTS {
            let path = match part {
                None => dir.plain(name),
                Some(p) => dir.part(name, *p),
            };
            let file = File::create(&path).map_err(|e| TraceError::io(&path, e))?;
            outs.push(BufWriter::new(file));
            paths.push(path);
        }
        Ok(Self {
            name: name.to_string(),
            paths,
            outs,
            rows: 0,
            _value: PhantomData,
        })
    }

    pub fn write(&mut self, value: &T) -> Result<()> {
        value
            .write_row(&mut self.outs)
            .map_err(|e| TraceError::io(&self.paths[0], e))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<()> {
        for (out, path) in self.outs.iter_mut().zip(&self.paths) {
            out.flush().map_err(|e| TraceError::io(path, e))?;
        }
        info!(name = %self.name, rows = self.rows, "wrote {}", self.paths[0].display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::affine::SymbolSource;
    use std::fs;

    #[test]
    fn affine_trace_round_trips_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = TraceDir::new(tmp.path());
        let mut src = SymbolSource::new();
        let a = AffineForm::with_radius(-60.0, 0.5, &mut src);
        let b = a.mul(&AffineForm::with_radius(2.0, 0.1, &mut src), &mut src);

        let mut w = TraceWriter::<AffineForm>::create(&dir, "nrn1_V_000").unwrap();
        w.write(&AffineForm::constant(1.0)).unwrap();
        w.write(&a).unwrap();
        w.write(&b).unwrap();
        w.finish().unwrap();

        let trace = read_affine(&dir, "nrn1_V_000", &RowWindow::all()).unwrap();
        assert_eq!(trace.forms.len(), 3);
        assert_eq!(trace.forms[0].n_terms(), 0);
        assert_eq!(trace.forms[1], a);
        assert_eq!(trace.forms[2], b);
        assert_eq!(trace.range.radius[2], b.radius());
    }

    #[test]
    fn mismatched_term_rows_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = TraceDir::new(tmp.path());
        fs::write(dir.part("x", Part::Centre), "0\n1\n").unwrap();
        fs::write(dir.part("x", Part::Radius), "0\n1\n").unwrap();
        fs::write(dir.part("x", Part::Symbols), "\n1 2\n").unwrap();
        fs::write(dir.part("x", Part::Deviations), "\n0.5\n").unwrap();
        let err = read_affine(&dir, "x", &RowWindow::all()).unwrap_err();
        assert!(matches!(err, TraceError::TermMismatch { line: 2, symbols: 2, deviations: 1, .. }));
    }

    #[test]
    fn short_radius_file_is_a_length_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = TraceDir::new(tmp.path());
        fs::write(dir.part("x", Part::Centre), "0\n1\n2\n").unwrap();
        fs::write(dir.part("x", Part::Radius), "0\n1\n").unwrap();
        let err = read_range(&dir, "x", &RowWindow::all()).unwrap_err();
        assert!(matches!(err, TraceError::LengthMismatch { left_rows: 3, right_rows: 2, .. }));
    }

    #[test]
    fn interval_rows_parse_in_either_order() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = TraceDir::new(tmp.path());
        fs::write(dir.plain("v"), "-1 1\n3 2\n").unwrap();
        let v = read_interval(&dir, "v", &RowWindow::all()).unwrap();
        assert_eq!(v, vec![Interval::new(-1.0, 1.0), Interval::new(2.0, 3.0)]);
    }
}
