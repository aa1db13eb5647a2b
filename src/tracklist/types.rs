//! Tracklist data types.

use serde::Serialize;

use crate::error::{Error, Result};

use super::sanitize_label;

/// A single `(offset, label)` marker from a tracklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CutPoint {
    offset_ms: u64,
    label: String,
}

impl CutPoint {
    /// Create a cut point, sanitizing the raw label.
    pub fn new(offset_ms: u64, raw_label: &str) -> Self {
        Self {
            offset_ms,
            label: sanitize_label(raw_label),
        }
    }

    /// Offset from the start of the recording in milliseconds.
    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Sanitized, non-empty label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered, non-empty sequence of cut points.
///
/// Entries are sorted by offset; entries sharing an offset keep their input
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tracklist {
    cut_points: Vec<CutPoint>,
}

impl Tracklist {
    /// Build a tracklist from cut points in input order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoTracksFound`] if `cut_points` is empty.
    pub fn new(mut cut_points: Vec<CutPoint>) -> Result<Self> {
        if cut_points.is_empty() {
            return Err(Error::NoTracksFound);
        }
        // sort_by_key is stable
        cut_points.sort_by_key(CutPoint::offset_ms);
        Ok(Self { cut_points })
    }

    /// Number of cut points (always at least one).
    pub fn len(&self) -> usize {
        self.cut_points.len()
    }

    /// Always `false`; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.cut_points.is_empty()
    }

    /// Iterate over cut points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, CutPoint> {
        self.cut_points.iter()
    }

    /// Cut points as a slice.
    pub fn as_slice(&self) -> &[CutPoint] {
        &self.cut_points
    }

    /// Offsets that appear on more than one adjacent entry, one per pair.
    pub fn duplicate_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.cut_points
            .windows(2)
            .filter(|pair| pair[0].offset_ms == pair[1].offset_ms)
            .map(|pair| pair[1].offset_ms)
    }
}

impl<'a> IntoIterator for &'a Tracklist {
    type Item = &'a CutPoint;
    type IntoIter = std::slice::Iter<'a, CutPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A recoverable problem found while parsing a tracklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// The line does not have the `<timestamp> <sep> <label>` shape.
    #[error("invalid format on line {line}: {content}")]
    LineNotRecognized {
        /// 1-based line number.
        line: usize,
        /// Trimmed line content.
        content: String,
    },

    /// The line has the right shape but its timestamp does not parse.
    #[error("skipping line {line}: invalid timestamp format: '{timestamp}'")]
    InvalidTimestamp {
        /// 1-based line number.
        line: usize,
        /// The timestamp token.
        timestamp: String,
    },

    /// Two adjacent entries share the same offset.
    #[error("duplicate timestamp at {}s", offset_ms / 1000)]
    DuplicateTimestamp {
        /// The shared offset in milliseconds.
        offset_ms: u64,
    },
}

/// A parsed tracklist together with the warnings raised while parsing it.
#[derive(Debug, Clone)]
pub struct ParsedTracklist {
    /// The validated, ordered tracklist.
    pub tracklist: Tracklist,
    /// Warnings in the order they were raised.
    pub warnings: Vec<ParseWarning>,
}
