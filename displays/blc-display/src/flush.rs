//! Dirty-run detection for differential flushing
//!
//! Repositioning the cursor costs a fixed six-byte command, so short
//! stretches of unchanged cells between two changes are cheaper to resend
//! than to skip. A run ends only once more than [`EQUAL_STREAK_LIMIT`]
//! consecutive cells match the device.

use core::ops::Range;

/// Unchanged cells tolerated inside a run
pub const EQUAL_STREAK_LIMIT: usize = 5;

/// Iterator over the dirty runs of one row
///
/// Yields column ranges whose contents differ from the committed image.
/// Each range starts and ends on a differing column.
#[derive(Debug, Clone)]
pub struct DirtyRuns<'a> {
    current: &'a [u8],
    committed: &'a [u8],
    col: usize,
}

impl<'a> DirtyRuns<'a> {
    /// Compare `current` against `committed`, column by column
    ///
    /// Extra columns in the longer slice are ignored.
    pub fn new(current: &'a [u8], committed: &'a [u8]) -> Self {
        let len = current.len().min(committed.len());
        Self {
            current: &current[..len],
            committed: &committed[..len],
            col: 0,
        }
    }

    fn differs(&self, col: usize) -> bool {
        self.current[col] != self.committed[col]
    }
}

impl Iterator for DirtyRuns<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Range<usize>> {
        let len = self.current.len();
        while self.col < len && !self.differs(self.col) {
            self.col += 1;
        }
        if self.col >= len {
            return None;
        }

        let start = self.col;
        let mut end = start;
        let mut equal = 0;
        self.col += 1;
        while self.col < len {
            if self.differs(self.col) {
                end = self.col;
                equal = 0;
            } else {
                equal += 1;
                if equal > EQUAL_STREAK_LIMIT {
                    break;
                }
            }
            self.col += 1;
        }

        Some(start..end + 1)
    }
}
