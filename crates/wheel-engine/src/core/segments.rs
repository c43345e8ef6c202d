use std::collections::HashSet;
use std::ops::RangeInclusive;

use crate::error::{WheelError, WheelResult};

/// The labels painted on the wheel, in clockwise order starting at segment 0.
/// Never edited in place: reconfiguration swaps in a whole new set, and
/// only while no spin is alive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentSet {
    labels: Vec<String>,
}

impl SegmentSet {
    /// Build a segment set from labels. Labels must be distinct.
    ///
    /// An empty set is accepted here; spinning it is what fails.
    pub fn new<I, S>(labels: I) -> WheelResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(WheelError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels })
    }

    /// One segment per character, e.g. `SegmentSet::letters('A'..='Z')`.
    pub fn letters(range: RangeInclusive<char>) -> Self {
        Self {
            labels: range.map(|c| c.to_string()).collect(),
        }
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of the segment at `index`.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Like [`SegmentSet::label`], but an unknown index is an error.
    pub fn try_label(&self, index: usize) -> WheelResult<&str> {
        self.label(index).ok_or(WheelError::IndexOutOfRange {
            index,
            count: self.labels.len(),
        })
    }

    /// Position of a label in the set.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl TryFrom<Vec<String>> for SegmentSet {
    type Error = WheelError;

    fn try_from(labels: Vec<String>) -> WheelResult<Self> {
        Self::new(labels)
    }
}
