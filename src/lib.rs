//! # Ledger Report Builder
//!
//! A library for turning a client ledger export (deposits, withdrawals,
//! mark-to-market updates, brokerage, bills) into the summary reports a
//! back office reviews every day, and for exporting them as one workbook.
//!
//! ## Pipeline
//!
//! - **Ingestion**: CSV or XLSX bytes become a [`RawTable`]
//! - **Normalization**: rows become [`LedgerRecord`]s with a parsed timestamp,
//!   calendar date and the instrument ("script") named in the narration
//! - **Filtering**: a [`FilterSpec`] selects a borrowed view of the records
//! - **Aggregation**: six report bodies are computed from that view
//! - **Summaries**: every table gets a totals row
//! - **Export**: the tables are written as sheets of one workbook
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_report_builder::*;
//!
//! let bytes = std::fs::read("ledger.csv")?;
//! let dataset = LedgerDataset::from_bytes(&bytes, InputFormat::Csv)?;
//!
//! let request = ReportRequest {
//!     filters: dataset.filter_options().default_filters(),
//!     script_view: ScriptView::ProfitOnly,
//! };
//!
//! let bundle = generate_reports(dataset.records(), &request)?;
//! std::fs::write("ledger_report.xlsx", bundle.to_xlsx()?)?;
//! ```

pub mod engine;
pub mod error;
pub mod export;
pub mod filter;
pub mod ingestion;
pub mod normalizer;
pub mod schema;
pub mod script;
pub mod session;
pub mod summary;
pub mod table;
pub mod utils;

pub use engine::{
    aggregate, AggregatedReports, ClientBalanceRow, LedgerSummary, LedgerSummaryRow,
    LedgerTypeRow, ScriptReportRow,
};
pub use error::{LedgerError, Result};
pub use export::export_workbook;
pub use filter::apply_filters;
pub use ingestion::{read_csv, read_table, read_xlsx, InputFormat, RawCell, RawTable};
pub use normalizer::normalize;
pub use schema::*;
pub use script::extract_script;
pub use session::{LedgerDataset, LedgerSession};
pub use summary::{augment, ReportBundle, GRAND_SUMMARY_LABEL, TOTAL_LABEL};
pub use table::{Cell, Column, ColumnKind, ReportKind, ReportTable};

use log::{debug, info};

pub struct LedgerReportProcessor;

impl LedgerReportProcessor {
    pub fn process(records: &[LedgerRecord], request: &ReportRequest) -> Result<ReportBundle> {
        request.validate()?;

        info!(
            "Generating ledger reports from {} records",
            records.len()
        );
        debug!(
            "Filters: client={:?}, ledger types={:?}, scripts={:?}, dates={:?}, script view={:?}",
            request.filters.client,
            request.filters.ledger_types,
            request.filters.scripts,
            request.filters.date_range,
            request.script_view
        );

        let filtered = apply_filters(records, &request.filters);
        let reports = aggregate(&filtered);
        let bundle = augment(&reports, request.script_view);

        info!(
            "Generated reports for {} clients and {} scripts",
            reports.client_balances.len(),
            reports.scripts.len()
        );

        Ok(bundle)
    }

    /// Runs the pipeline and also renders the workbook.
    pub fn process_with_export(
        records: &[LedgerRecord],
        request: &ReportRequest,
    ) -> Result<(ReportBundle, Vec<u8>)> {
        let bundle = Self::process(records, request)?;
        let workbook = bundle.to_xlsx()?;
        Ok((bundle, workbook))
    }
}

/// Pure pipeline entry point: the same records and request always give the
/// same tables.
pub fn generate_reports(records: &[LedgerRecord], request: &ReportRequest) -> Result<ReportBundle> {
    LedgerReportProcessor::process(records, request)
}

pub fn generate_reports_with_export(
    records: &[LedgerRecord],
    request: &ReportRequest,
) -> Result<(ReportBundle, Vec<u8>)> {
    LedgerReportProcessor::process_with_export(records, request)
}
