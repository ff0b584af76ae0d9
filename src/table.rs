use crate::engine::{ClientBalanceRow, LedgerSummary, LedgerTypeRow, ScriptReportRow};
use crate::error::Result;
use chrono::{NaiveDate, NaiveDateTime};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReportKind {
    ClientBalance,
    LedgerSummary,
    ScriptReport,
    LedgerTypeReport,
    DepositWithdraw,
    OtherLedgerTypes,
}

impl ReportKind {
    /// Export order of the workbook sheets.
    pub const ALL: [ReportKind; 6] = [
        ReportKind::ClientBalance,
        ReportKind::LedgerSummary,
        ReportKind::ScriptReport,
        ReportKind::LedgerTypeReport,
        ReportKind::DepositWithdraw,
        ReportKind::OtherLedgerTypes,
    ];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            ReportKind::ClientBalance => "Client Ledger Balance",
            ReportKind::LedgerSummary => "Deposit & Withdrawal",
            ReportKind::ScriptReport => "Script Wise Report",
            ReportKind::LedgerTypeReport => "Ledger Type Wise Report",
            ReportKind::DepositWithdraw => "Deposit & Withdraw Report",
            ReportKind::OtherLedgerTypes => "Other Ledger Types",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Text,
    Amount,
    Count,
    Date,
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Blank,
    Text(String),
    Amount(Decimal),
    Count(u64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Amount(d) => write!(f, "{}", d),
            Cell::Count(n) => write!(f, "{}", n),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A finished report: fixed columns plus rows of cells. Tables are never
/// edited in place; adding a totals row produces a new table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub kind: ReportKind,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    pub fn new(kind: ReportKind, columns: Vec<Column>) -> Self {
        Self {
            kind,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn title(&self) -> &'static str {
        self.kind.sheet_name()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Returns a copy of this table with `row` appended.
    pub fn with_row(&self, row: Vec<Cell>) -> Self {
        let mut next = self.clone();
        next.rows.push(row);
        next
    }

    /// Renders the table as CSV, header first and without an index column.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn ledger_type_columns() -> Vec<Column> {
    vec![
        Column::new("LedgerType", ColumnKind::Text),
        Column::new("Total_Debit", ColumnKind::Amount),
        Column::new("Total_Credit", ColumnKind::Amount),
        Column::new("Net", ColumnKind::Amount),
    ]
}

pub fn client_balance_table(rows: &[ClientBalanceRow]) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::ClientBalance,
        vec![
            Column::new("ClientID", ColumnKind::Text),
            Column::new("Last_Activity", ColumnKind::Timestamp),
            Column::new("Balance", ColumnKind::Amount),
        ],
    );
    table.rows = rows
        .iter()
        .map(|r| {
            vec![
                Cell::Text(r.client_id.clone()),
                Cell::Timestamp(r.last_activity),
                Cell::Amount(r.balance),
            ]
        })
        .collect();
    table
}

/// Columns: ClientID, Date, every `Debit_<type>`, every `Credit_<type>`,
/// then last_activity.
pub fn ledger_summary_table(summary: &LedgerSummary) -> ReportTable {
    let mut columns = vec![
        Column::new("ClientID", ColumnKind::Text),
        Column::new("Date", ColumnKind::Date),
    ];
    columns.extend(
        summary
            .ledger_types
            .iter()
            .map(|t| Column::new(format!("Debit_{}", t), ColumnKind::Amount)),
    );
    columns.extend(
        summary
            .ledger_types
            .iter()
            .map(|t| Column::new(format!("Credit_{}", t), ColumnKind::Amount)),
    );
    columns.push(Column::new("last_activity", ColumnKind::Timestamp));

    let mut table = ReportTable::new(ReportKind::LedgerSummary, columns);
    table.rows = summary
        .rows
        .iter()
        .map(|r| {
            let mut cells = vec![Cell::Text(r.client_id.clone()), Cell::Date(r.date)];
            cells.extend(r.debits.iter().copied().map(Cell::Amount));
            cells.extend(r.credits.iter().copied().map(Cell::Amount));
            cells.push(Cell::Timestamp(r.last_activity));
            cells
        })
        .collect();
    table
}

pub fn script_table<'a>(rows: impl IntoIterator<Item = &'a ScriptReportRow>) -> ReportTable {
    let mut table = ReportTable::new(
        ReportKind::ScriptReport,
        vec![
            Column::new("Script", ColumnKind::Text),
            Column::new("Total_Debit", ColumnKind::Amount),
            Column::new("Total_Credit", ColumnKind::Amount),
            Column::new("Transactions", ColumnKind::Count),
            Column::new("P&L", ColumnKind::Amount),
        ],
    );
    table.rows = rows
        .into_iter()
        .map(|r| {
            vec![
                Cell::Text(r.script.clone()),
                Cell::Amount(r.total_debit),
                Cell::Amount(r.total_credit),
                Cell::Count(r.transactions),
                Cell::Amount(r.pnl),
            ]
        })
        .collect();
    table
}

pub fn ledger_type_table(kind: ReportKind, rows: &[LedgerTypeRow]) -> ReportTable {
    let mut table = ReportTable::new(kind, ledger_type_columns());
    table.rows = rows
        .iter()
        .map(|r| {
            vec![
                Cell::Text(r.ledger_type.clone()),
                Cell::Amount(r.total_debit),
                Cell::Amount(r.total_credit),
                Cell::Amount(r.net),
            ]
        })
        .collect();
    table
}
