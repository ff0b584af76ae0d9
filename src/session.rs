use crate::error::Result;
use crate::ingestion::{read_table, InputFormat};
use crate::normalizer::normalize;
use crate::schema::{FilterOptions, LedgerRecord, ReportRequest};
use crate::summary::ReportBundle;
use crate::generate_reports;
use log::info;
use std::sync::Arc;

/// The normalized records of one upload. Read-only once built; every run
/// filters a borrowed view of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerDataset {
    records: Arc<[LedgerRecord]>,
}

impl LedgerDataset {
    pub fn from_bytes(bytes: &[u8], format: InputFormat) -> Result<Self> {
        let table = read_table(bytes, format)?;
        let records = normalize(&table)?;
        info!("Loaded ledger dataset with {} records", records.len());
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<LedgerRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[LedgerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records, for a raw data preview.
    pub fn preview(&self, n: usize) -> &[LedgerRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_records(&self.records)
    }
}

/// Holds the current upload between interactions and answers report
/// requests against it.
#[derive(Debug, Clone, Default)]
pub struct LedgerSession {
    dataset: Option<LedgerDataset>,
}

impl LedgerSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session's dataset with a freshly uploaded file.
    pub fn load(&mut self, bytes: &[u8], file_name: &str) -> Result<&LedgerDataset> {
        let format = InputFormat::from_file_name(file_name)?;
        let dataset = LedgerDataset::from_bytes(bytes, format)?;
        Ok(self.dataset.insert(dataset))
    }

    pub fn dataset(&self) -> Option<&LedgerDataset> {
        self.dataset.as_ref()
    }

    pub fn clear(&mut self) {
        self.dataset = None;
    }

    /// Runs the pipeline for `request`. Without an upload there is nothing
    /// to report on and `None` is returned.
    pub fn run(&self, request: &ReportRequest) -> Result<Option<ReportBundle>> {
        match &self.dataset {
            Some(dataset) => generate_reports(dataset.records(), request).map(Some),
            None => Ok(None),
        }
    }
}
