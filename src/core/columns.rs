//! core/columns.rs — whitespace-separated column files.
//!
//! Each row of a `.dat` file is one time step. Rows hold either a single
//! value, an interval `lo hi`, or a variable-length list (noise symbols and
//! deviations of an affine form).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::core::window::RowWindow;
use crate::error::{Result, TraceError};

/// A row read from disk together with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub line: usize,
    pub text: String,
}

/// Read the rows of `path` selected by `window`.
pub fn read_rows(path: &Path, window: &RowWindow) -> Result<Vec<Row>> {
    window.validate()?;
    let file = File::open(path).map_err(|e| TraceError::io(path, e))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();
    for (idx, line) in window.apply(reader.lines()) {
        let text = line.map_err(|e| TraceError::io(path, e))?;
        rows.push(Row {
            line: idx + 1,
            text,
        });
    }
    Ok(rows)
}

fn parse_f64(path: &Path, line: usize, token: &str) -> Result<f64> {
    token.parse::<f64>().map_err(|_| TraceError::Parse {
        path: path.to_path_buf(),
        line,
        token: token.to_string(),
        expected: "a float",
    })
}

fn parse_u64(path: &Path, line: usize, token: &str) -> Result<u64> {
    token.parse::<u64>().map_err(|_| TraceError::Parse {
        path: path.to_path_buf(),
        line,
        token: token.to_string(),
        expected: "a noise symbol index",
    })
}

/// First token of every row as `f64`. Blank rows are an error.
pub fn parse_scalar_column(path: &Path, rows: &[Row]) -> Result<Vec<f64>> {
    rows.iter()
        .map(|row| {
            let token = row
                .text
                .split_whitespace()
                .next()
                .ok_or_else(|| TraceError::MissingValue {
                    path: path.to_path_buf(),
                    line: row.line,
                })?;
            parse_f64(path, row.line, token)
        })
        .collect()
}

/// First two tokens of every row as `(f64, f64)`.
pub fn parse_pair_column(path: &Path, rows: &[Row]) -> Result<Vec<(f64, f64)>> {
    rows.iter()
        .map(|row| {
            let mut tokens = row.text.split_whitespace();
            let mut next = || {
                tokens.next().ok_or_else(|| TraceError::MissingValue {
                    path: path.to_path_buf(),
                    line: row.line,
                })
            };
            let a = parse_f64(path, row.line, next()?)?;
            let b = parse_f64(path, row.line, next()?)?;
            Ok((a, b))
        })
        .collect()
}

/// Every token of every row as `f64`. Blank rows give empty vectors.
pub fn parse_value_rows(path: &Path, rows: &[Row]) -> Result<Vec<Vec<f64>>> {
    rows.iter()
        .map(|row| {
            row.text
                .split_whitespace()
                .map(|tok| parse_f64(path, row.line, tok))
                .collect()
        })
        .collect()
}

/// Every token of every row as a noise symbol index.
pub fn parse_symbol_rows(path: &Path, rows: &[Row]) -> Result<Vec<Vec<u64>>> {
    rows.iter()
        .map(|row| {
            row.text
                .split_whitespace()
                .map(|tok| parse_u64(path, row.line, tok))
                .collect()
        })
        .collect()
}

/// Read and parse a single-value column in one go.
pub fn read_scalar_column(path: &Path, window: &RowWindow) -> Result<Vec<f64>> {
    let rows = read_rows(path, window)?;
    parse_scalar_column(path, &rows)
}
