use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::{demand::DemandRecord, month::Month};

/// Read-only view over demand rows, filtered by keyword membership and month.
pub trait DemandSource {
    fn query(&self, keywords: &BTreeSet<String>, month: Month) -> Vec<&DemandRecord>;
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("could not read demand dataset `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("malformed demand dataset row at line {line}: {source}")]
    Malformed { line: u64, source: csv::Error },
    #[error("invalid demand record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },
}

/// The static demand table, loaded once and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemandDataset {
    records: Vec<DemandRecord>,
}

#[derive(Debug, Deserialize)]
struct DemandRow {
    #[serde(rename = "Keyword")]
    keyword: String,
    #[serde(rename = "Month")]
    month: i64,
    #[serde(rename = "Demand_Index")]
    demand_index: f64,
    #[serde(rename = "Trend_Score")]
    trend_score: f64,
}

impl DemandDataset {
    pub fn new(records: Vec<DemandRecord>) -> Self {
        Self { records }
    }

    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path)
            .map_err(|source| DatasetError::Read { path: path.to_path_buf(), source })?;
        let dataset = Self::from_reader(file)?;

        if dataset.is_empty() {
            tracing::warn!(
                event_name = "forecast.dataset.empty",
                path = %path.display(),
                "demand dataset has no rows; every scenario will aggregate to zero demand"
            );
        }
        tracing::info!(
            event_name = "forecast.dataset.loaded",
            path = %path.display(),
            records = dataset.len(),
            "demand dataset loaded"
        );
        Ok(dataset)
    }

    /// Parses CSV with `Keyword,Month,Demand_Index,Trend_Score` headers; extra columns are ignored.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for (index, row) in csv_reader.deserialize::<DemandRow>().enumerate() {
            // header is line 1
            let line = index as u64 + 2;
            let row = row.map_err(|source| DatasetError::Malformed { line, source })?;
            records.push(validate_row(row, line)?);
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[DemandRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DemandSource for DemandDataset {
    fn query(&self, keywords: &BTreeSet<String>, month: Month) -> Vec<&DemandRecord> {
        let month = month.number();
        self.records
            .iter()
            .filter(|record| record.month == month && keywords.contains(&record.keyword))
            .collect()
    }
}

fn validate_row(row: DemandRow, line: u64) -> Result<DemandRecord, DatasetError> {
    let month = u8::try_from(row.month)
        .ok()
        .and_then(Month::from_number)
        .ok_or_else(|| DatasetError::InvalidRecord {
            line,
            reason: format!("Month must be in range 1..=12, got {}", row.month),
        })?;

    if row.keyword.is_empty() {
        return Err(DatasetError::InvalidRecord {
            line,
            reason: "Keyword must not be empty".to_string(),
        });
    }

    if !row.demand_index.is_finite() || row.demand_index < 0.0 {
        return Err(DatasetError::InvalidRecord {
            line,
            reason: format!(
                "Demand_Index must be a finite non-negative number, got {}",
                row.demand_index
            ),
        });
    }

    if !row.trend_score.is_finite() {
        return Err(DatasetError::InvalidRecord {
            line,
            reason: format!("Trend_Score must be finite, got {}", row.trend_score),
        });
    }

    Ok(DemandRecord {
        keyword: row.keyword,
        month: month.number(),
        demand_index: row.demand_index,
        trend_score: row.trend_score,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::{DatasetError, DemandDataset, DemandSource};
    use crate::domain::month::Month;

    const SAMPLE: &str = "\
Keyword,Month,Demand_Index,Trend_Score,Region
Coldplay India: (India),1,80,1.5,IN
Coldplay India: (India),2,40,0.5,IN
Sunburn Festival: (India),1,40,-0.5,IN
Zakir Khan: (India),1,55,0.2,IN
";

    fn keywords(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn query_filters_by_keyword_membership_and_month() {
        let dataset = DemandDataset::from_reader(SAMPLE.as_bytes()).expect("sample should parse");

        let rows = dataset.query(
            &keywords(&["Coldplay India: (India)", "Sunburn Festival: (India)"]),
            Month::Jan,
        );

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.month == 1));
        assert!(rows.iter().all(|row| row.keyword != "Zakir Khan: (India)"));
        assert_eq!(dataset.len(), 4, "query must not consume or mutate records");
    }

    #[test]
    fn query_returns_nothing_for_unmatched_month_or_keywords() {
        let dataset = DemandDataset::from_reader(SAMPLE.as_bytes()).expect("sample should parse");

        assert!(dataset.query(&keywords(&["Zakir Khan: (India)"]), Month::Feb).is_empty());
        assert!(dataset.query(&keywords(&["Pottery workshop: (India)"]), Month::Jan).is_empty());
        assert!(dataset.query(&BTreeSet::new(), Month::Jan).is_empty());
    }

    #[test]
    fn missing_column_fails_fast() {
        let error = DemandDataset::from_reader("Keyword,Month,Demand_Index\nA,1,40\n".as_bytes())
            .expect_err("missing Trend_Score must be rejected");

        assert!(matches!(error, DatasetError::Malformed { line: 2, .. }));
    }

    #[test]
    fn unparseable_field_reports_line() {
        let csv = "Keyword,Month,Demand_Index,Trend_Score\nA,1,40,0.1\nB,2,lots,0.1\n";
        let error = DemandDataset::from_reader(csv.as_bytes()).expect_err("bad number");

        assert!(matches!(error, DatasetError::Malformed { line: 3, .. }));
    }

    #[test]
    fn out_of_range_month_is_rejected() {
        let csv = "Keyword,Month,Demand_Index,Trend_Score\nA,13,40,0.1\n";
        let error = DemandDataset::from_reader(csv.as_bytes()).expect_err("month 13");

        assert!(matches!(
            error,
            DatasetError::InvalidRecord { line: 2, ref reason } if reason.contains("Month")
        ));
    }

    #[test]
    fn negative_demand_index_is_rejected() {
        let csv = "Keyword,Month,Demand_Index,Trend_Score\nA,3,-1,0.1\n";
        let error = DemandDataset::from_reader(csv.as_bytes()).expect_err("negative demand");

        assert!(matches!(
            error,
            DatasetError::InvalidRecord { ref reason, .. } if reason.contains("Demand_Index")
        ));
    }

    #[test]
    fn header_only_dataset_is_empty_but_valid() {
        let dataset =
            DemandDataset::from_reader("Keyword,Month,Demand_Index,Trend_Score\n".as_bytes())
                .expect("header-only dataset should load");

        assert!(dataset.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = DemandDataset::load("no/such/trends.csv".as_ref()).expect_err("missing file");

        assert!(matches!(error, DatasetError::Read { .. }));
    }
}
