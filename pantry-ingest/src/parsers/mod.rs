pub mod inventory;
pub mod recipes;

use anyhow::{Context, Result, bail};

/// Column positions resolved from a header row (case-insensitive, trimmed).
pub(crate) struct Columns {
    names: Vec<String>,
}

impl Columns {
    pub(crate) fn from_header(header: &csv::StringRecord, required: &[&str]) -> Result<Self> {
        let names: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
        for col in required {
            if !names.iter().any(|n| n == col) {
                bail!("missing required column '{col}'");
            }
        }
        Ok(Self { names })
    }

    pub(crate) fn get<'r>(&self, record: &'r csv::StringRecord, col: &str) -> &'r str {
        self.names
            .iter()
            .position(|n| n == col)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

pub(crate) fn reader<R: std::io::Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

pub(crate) fn open(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))
}
