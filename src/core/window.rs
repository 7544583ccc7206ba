//! core/window.rs — row selection shared by every trace reader.
//!
//! Rows are discrete time steps. A window keeps rows `start..stop` with a
//! stride of `step`; a stop past the end of the file just ends early, and a
//! stop at or before the start keeps nothing.

use crate::error::{Result, TraceError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowWindow {
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub step: Option<usize>,
}

impl RowWindow {
    /// Every row of the file.
    pub fn all() -> Self {
        Self::default()
    }

    /// Rows `start..stop`, stride 1.
    pub fn range(start: usize, stop: usize) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            step: None,
        }
    }

    pub fn with_step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn start(&self) -> usize {
        self.start.unwrap_or(0)
    }

    pub fn step(&self) -> usize {
        self.step.unwrap_or(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.step == Some(0) {
            return Err(TraceError::InvalidWindow("step must be positive".into()));
        }
        Ok(())
    }

    /// Whether row `idx` (0-based, counted from the top of the file) is kept.
    pub fn contains(&self, idx: usize) -> bool {
        let start = self.start();
        if idx < start {
            return false;
        }
        if let Some(stop) = self.stop {
            if idx >= stop {
                return false;
            }
        }
        (idx - start) % self.step() == 0
    }

    /// Apply the window to any row iterator, yielding `(row_index, item)`.
    pub fn apply<I>(&self, iter: I) -> impl Iterator<Item = (usize, I::Item)>
    where
        I: Iterator,
    {
        let start = self.start();
        let stop = self.stop.unwrap_or(usize::MAX);
        let step = self.step().max(1);
        iter.enumerate()
            .skip(start)
            .take_while(move |(idx, _)| *idx < stop)
            .step_by(step)
    }

    /// Number of rows kept from a file of `total` rows.
    pub fn len_hint(&self, total: usize) -> usize {
        let start = self.start();
        let stop = self.stop.unwrap_or(total).min(total);
        if stop <= start {
            return 0;
        }
        (stop - start).div_ceil(self.step().max(1))
    }

    /// Absolute row index of the `k`-th kept row.
    pub fn row_index(&self, k: usize) -> usize {
        self.start() + k * self.step()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_keeps_strided_rows() {
        let w = RowWindow::range(2, 9).with_step(3);
        let kept: Vec<usize> = w.apply(0..20).map(|(_, v)| v).collect();
        assert_eq!(kept, vec![2, 5, 8]);
        assert_eq!(w.len_hint(20), 3);
        assert!(w.contains(5));
        assert!(!w.contains(6));
        assert!(!w.contains(11));
    }

    #[test]
    fn window_past_end_is_short() {
        let w = RowWindow::range(3, 100);
        let kept: Vec<usize> = w.apply(0..5).map(|(i, _)| i).collect();
        assert_eq!(kept, vec![3, 4]);
        assert_eq!(w.len_hint(5), 2);
    }

    #[test]
    fn zero_step_is_rejected() {
        assert!(RowWindow::all().with_step(0).validate().is_err());
        assert!(RowWindow::range(0, 0).validate().is_ok());
    }

    #[test]
    fn stop_before_start_keeps_nothing() {
        let w = RowWindow::range(5, 2);
        assert!(w.validate().is_ok());
        assert_eq!(w.apply(0..20).count(), 0);
        assert_eq!(w.len_hint(20), 0);
        assert!(!w.contains(5));
    }
}
