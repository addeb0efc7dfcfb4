//! Sliding-window arithmetic shared by the character and token chunkers.
//!
//! ```text
//! len = 26, size = 10, overlap = 3
//!
//! [0..10)  [7..17)  [14..24)  [21..26)
//!        ^        ^         ^
//!        each start = previous end - overlap
//! ```
//!
//! The window that reaches `len` is the last one, so no window is ever
//! contained in its predecessor.

use std::ops::Range;

use crate::{Error, Result};

/// Validate a `(size, overlap)` pair.
///
/// # Errors
///
/// Returns [`Error::InvalidChunkSize`] if `size == 0` and
/// [`Error::OverlapExceedsSize`] if `overlap >= size`.
pub fn validate(size: usize, overlap: usize) -> Result<()> {
    if size == 0 {
        return Err(Error::InvalidChunkSize(size));
    }
    if overlap >= size {
        return Err(Error::OverlapExceedsSize { size, overlap });
    }
    Ok(())
}

/// Iterator over overlapping `[start, end)` windows of a sequence of `len` units.
#[derive(Debug, Clone)]
pub struct Windows {
    len: usize,
    size: usize,
    overlap: usize,
    start: usize,
    done: bool,
}

impl Windows {
    /// Windows over `len` units. Assumes `overlap < size`.
    #[must_use]
    pub fn new(len: usize, size: usize, overlap: usize) -> Self {
        debug_assert!(overlap < size, "overlap must be < size");
        Self {
            len,
            size,
            overlap,
            start: 0,
            done: len == 0,
        }
    }
}

impl Iterator for Windows {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let end = self.start.saturating_add(self.size);
        let window = self.start..end.min(self.len);

        if end >= self.len {
            self.done = true;
        } else {
            self.start = end - self.overlap;
        }

        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let remaining = self.len - self.start;
        let step = self.size - self.overlap;
        let n = if remaining <= self.size {
            1
        } else {
            1 + (remaining - self.size).div_ceil(step)
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Windows {}

impl std::iter::FusedIterator for Windows {}
