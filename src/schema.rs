use crate::error::{LedgerError, Result};
use crate::script::extract_script;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const COL_CLIENT_ID: &str = "ClientID";
pub const COL_CREATED_AT: &str = "CreatedAt";
pub const COL_LEDGER_TYPE: &str = "LedgerType";
pub const COL_DEBIT: &str = "Debit";
pub const COL_CREDIT: &str = "Credit";
pub const COL_BALANCE: &str = "Balance";
pub const COL_NARRATION: &str = "Narration";

pub const LEDGER_DEPOSIT: &str = "DEPOSIT";
pub const LEDGER_WITHDRAW: &str = "WITHDRAW";
pub const LEDGER_WITHDRAWAL_CANCELLED: &str = "WITHDRAWAL CANCELLED";

/// One normalized row of the ledger export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// 1-based data row in the source file (header excluded)
    pub row: usize,
    pub client_id: String,
    pub created_at: Option<NaiveDateTime>,
    pub date: Option<NaiveDate>,
    pub ledger_type: String,
    pub debit: Decimal,
    pub credit: Decimal,
    /// Running balance exactly as exported, never recomputed
    pub balance: Decimal,
    pub narration: Option<String>,
    pub script: Option<String>,
}

impl LedgerRecord {
    /// Builds a record and fills in the derived `date` and `script` fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        row: usize,
        client_id: impl Into<String>,
        created_at: Option<NaiveDateTime>,
        ledger_type: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
        balance: Decimal,
        narration: Option<String>,
    ) -> Self {
        let script = extract_script(narration.as_deref());
        Self {
            row,
            client_id: client_id.into(),
            created_at,
            date: created_at.map(|ts| ts.date()),
            ledger_type: ledger_type.into(),
            debit,
            credit,
            balance,
            narration,
            script,
        }
    }

    /// Upper-cased ledger type, used by the reports that group case-insensitively.
    pub fn ledger_category(&self) -> String {
        self.ledger_type.to_uppercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClientSelection {
    #[default]
    #[schemars(description = "Include every client")]
    All,

    #[schemars(description = "Include only the client with this exact ClientID")]
    Client(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    #[schemars(description = "First calendar date to include (YYYY-MM-DD)")]
    #[serde(default)]
    pub start: Option<NaiveDate>,

    #[schemars(description = "Last calendar date to include (YYYY-MM-DD)")]
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Inclusive bounds, only when both ends are set. A single-ended or
    /// empty range does not filter.
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FilterSpec {
    #[schemars(description = "Client to report on, or all clients")]
    #[serde(default)]
    pub client: ClientSelection,

    #[schemars(description = "Ledger types to keep (exact, case-sensitive). Omit to keep all.")]
    #[serde(default)]
    pub ledger_types: Option<BTreeSet<String>>,

    #[schemars(description = "Scripts to keep (omit for all). Scriptless records always pass.")]
    #[serde(default)]
    pub scripts: Option<BTreeSet<String>>,

    #[schemars(description = "Inclusive calendar date range; ignored unless both ends are set")]
    #[serde(default)]
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScriptView {
    #[default]
    #[schemars(description = "Show every script")]
    All,

    #[schemars(description = "Show only scripts with P&L above zero")]
    ProfitOnly,

    #[schemars(description = "Show only scripts with P&L below zero")]
    LossOnly,
}

impl ScriptView {
    pub fn retains(&self, pnl: Decimal) -> bool {
        match self {
            ScriptView::All => true,
            ScriptView::ProfitOnly => pnl > Decimal::ZERO,
            ScriptView::LossOnly => pnl < Decimal::ZERO,
        }
    }
}

/// Everything the UI layer sends for a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportRequest {
    #[serde(default)]
    pub filters: FilterSpec,

    #[schemars(description = "Profit/loss view applied to the displayed Script Wise Report")]
    #[serde(default)]
    pub script_view: ScriptView,
}

impl ReportRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        let request: ReportRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some((start, end)) = self.filters.date_range.bounds() {
            if end < start {
                return Err(LedgerError::ValidationError(format!(
                    "date range ends on {} before it starts on {}",
                    end, start
                )));
            }
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportRequest)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// The choices available to the selection widgets for a loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub clients: Vec<String>,
    pub ledger_types: Vec<String>,
    pub scripts: Vec<String>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

impl FilterOptions {
    pub fn from_records(records: &[LedgerRecord]) -> Self {
        let clients: BTreeSet<&str> = records.iter().map(|r| r.client_id.as_str()).collect();
        let ledger_types: BTreeSet<&str> =
            records.iter().map(|r| r.ledger_type.as_str()).collect();
        let scripts: BTreeSet<&str> = records.iter().filter_map(|r| r.script.as_deref()).collect();

        Self {
            clients: clients.into_iter().map(String::from).collect(),
            ledger_types: ledger_types.into_iter().map(String::from).collect(),
            scripts: scripts.into_iter().map(String::from).collect(),
            first_date: records.iter().filter_map(|r| r.date).min(),
            last_date: records.iter().filter_map(|r| r.date).max(),
        }
    }

    /// A request that selects everything. The date range stays open so
    /// records without a timestamp still reach the ledger-type reports;
    /// `first_date`/`last_date` only seed the date pickers.
    pub fn default_filters(&self) -> FilterSpec {
        FilterSpec {
            client: ClientSelection::All,
            ledger_types: Some(self.ledger_types.iter().cloned().collect()),
            scripts: Some(self.scripts.iter().cloned().collect()),
            date_range: DateRange::default(),
        }
    }

    /// The full date span of the dataset, as shown by the date pickers.
    pub fn full_date_range(&self) -> DateRange {
        DateRange {
            start: self.first_date,
            end: self.last_date,
        }
    }
}
