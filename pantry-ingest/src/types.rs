use serde::{Deserialize, Serialize};

/// A CSV row that was dropped during import, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// 1-based line number in the source, header included.
    pub line: u64,
    pub reason: String,
}

/// Normalized parser output: accepted records plus what was skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parsed<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRow>,
}

impl<T> Default for Parsed<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<T> Parsed<T> {
    pub(crate) fn skip(&mut self, line: u64, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(line, %reason, "skipping csv row");
        self.skipped.push(SkippedRow { line, reason });
    }
}
