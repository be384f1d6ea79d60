use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::plan::PlanEntry;

pub const PLAN_COLUMNS: [&str; 7] = [
    "Show_Type",
    "City",
    "Month",
    "Your_Price",
    "Recommended_Price",
    "Adj_Demand",
    "Recommendation",
];

#[derive(Debug, Error)]
pub enum PlanExportError {
    #[error("could not create plan export `{path}`: {source}")]
    Create { path: PathBuf, source: std::io::Error },
    #[error("could not write plan row: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not flush plan export: {0}")]
    Flush(#[source] std::io::Error),
    #[error("plan export is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Append-only list of chosen scenarios, owned by one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlanTable {
    entries: Vec<PlanEntry>,
}

impl PlanTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Header row first, then one row per entry in append order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), PlanExportError> {
        let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

        csv_writer.write_record(PLAN_COLUMNS)?;
        for entry in &self.entries {
            csv_writer.serialize(entry)?;
        }
        csv_writer.flush().map_err(PlanExportError::Flush)?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String, PlanExportError> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn export(&self, path: &Path) -> Result<(), PlanExportError> {
        let file = File::create(path)
            .map_err(|source| PlanExportError::Create { path: path.to_path_buf(), source })?;
        self.write_csv(file)?;

        tracing::info!(
            event_name = "plan.exported",
            path = %path.display(),
            rows = self.entries.len(),
            "plan exported"
        );
        Ok(())
    }
}
