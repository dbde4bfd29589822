//! ProgressIndex - last confirmed position in the input sequence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of the last item a processor confirmed, or none.
///
/// Serialized and displayed as a signed integer where `-1` means nothing
/// has been processed yet. Items at or below the index are done; items
/// above it are not.
///
/// # Examples
/// ```
/// use contracts::ProgressIndex;
///
/// let progress = ProgressIndex::NONE.advance(3);
/// assert_eq!(progress.last(), Some(2));
/// assert_eq!(progress.resume_from(), 3);
/// assert_eq!(ProgressIndex::NONE.as_i64(), -1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub struct ProgressIndex(Option<usize>);

impl ProgressIndex {
    /// Nothing processed yet
    pub const NONE: Self = Self(None);

    /// Progress pointing at item `index`
    pub const fn at(index: usize) -> Self {
        Self(Some(index))
    }

    /// Progress just before `start`, i.e. `start - 1` or none
    pub const fn before(start: usize) -> Self {
        match start {
            0 => Self::NONE,
            n => Self(Some(n - 1)),
        }
    }

    /// Index of the last confirmed item
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.0
    }

    /// Signed form, `-1` when nothing was processed
    pub fn as_i64(&self) -> i64 {
        self.0.map_or(-1, |i| i as i64)
    }

    /// Number of items confirmed so far
    #[inline]
    pub fn processed_count(&self) -> usize {
        self.0.map_or(0, |i| i + 1)
    }

    /// Index of the first item still pending
    #[inline]
    pub fn resume_from(&self) -> usize {
        self.processed_count()
    }

    /// Progress after `count` more items were confirmed.
    ///
    /// Advancing by zero keeps the index unchanged.
    #[must_use]
    pub fn advance(self, count: usize) -> Self {
        match (self.0, count) {
            (_, 0) => self,
            (None, n) => Self(Some(n - 1)),
            (Some(i), n) => Self(Some(i + n)),
        }
    }
}

impl fmt::Display for ProgressIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl From<ProgressIndex> for i64 {
    fn from(progress: ProgressIndex) -> Self {
        progress.as_i64()
    }
}

impl TryFrom<i64> for ProgressIndex {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::NONE),
            v if v >= 0 => Ok(Self(Some(v as usize))),
            v => Err(format!("progress index must be >= -1, got {v}")),
        }
    }
}
