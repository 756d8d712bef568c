//! Slice object implementation.
//!
//! Any slice component may be absent:
//! - `slice(None, 5)` → `[:5]`
//! - `slice(1, None)` → `[1:]`
//! - `slice(None, None, -1)` → `[::-1]`

use crate::error::{RuntimeError, RuntimeResult};
use std::fmt;

/// A `start:stop:step` slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceObject {
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
}

impl SliceObject {
    #[inline]
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// The full slice `[:]`.
    #[inline]
    pub const fn full() -> Self {
        Self::new(None, None, None)
    }

    #[inline]
    pub fn start(&self) -> Option<i64> {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> Option<i64> {
        self.stop
    }

    #[inline]
    pub fn step(&self) -> Option<i64> {
        self.step
    }

    /// Resolve to concrete `(start, stop, step)` for a sequence of `len`.
    pub fn indices(&self, len: usize) -> RuntimeResult<(i64, i64, i64)> {
        let len = len as i64;
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(RuntimeError::value_error("slice step cannot be zero"));
        }

        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: Option<i64>, default: i64| match bound {
            None => default,
            Some(i) if i < 0 => (i + len).max(lower),
            Some(i) => i.min(upper),
        };

        let start = clamp(self.start, if step > 0 { lower } else { upper });
        let stop = clamp(self.stop, if step > 0 { upper } else { lower });
        Ok((start, stop, step))
    }

    /// Positions selected by this slice, in order.
    pub fn positions(&self, len: usize) -> RuntimeResult<Vec<usize>> {
        let (start, stop, step) = self.indices(len)?;
        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < stop) || (step < 0 && i > stop) {
            out.push(i as usize);
            i += step;
        }
        Ok(out)
    }

    /// Select items from a slice.
    pub fn apply<T: Clone>(&self, items: &[T]) -> RuntimeResult<Vec<T>> {
        Ok(self
            .positions(items.len())?
            .into_iter()
            .map(|i| items[i].clone())
            .collect())
    }
}

impl fmt::Display for SliceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(v: Option<i64>) -> String {
            v.map_or_else(|| "None".to_string(), |i| i.to_string())
        }
        write!(
            f,
            "slice({}, {}, {})",
            part(self.start),
            part(self.stop),
            part(self.step)
        )
    }
}

/// Map a possibly-negative index onto `0..len`.
#[inline]
pub fn normalize_index(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let idx = if index < 0 { index + len } else { index };
    (0..len).contains(&idx).then_some(idx as usize)
}

// =============================================================================
// Tests
// =============================================================================
