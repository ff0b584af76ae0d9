use crate::error::{LedgerError, Result};
use crate::ingestion::{RawCell, RawTable};
use crate::schema::*;
use crate::utils::{amount_from_f64, parse_amount};
use log::{debug, warn};
use rust_decimal::Decimal;

struct ColumnMap {
    client_id: usize,
    created_at: usize,
    ledger_type: usize,
    debit: usize,
    credit: usize,
    balance: usize,
    narration: Option<usize>,
}

impl ColumnMap {
    fn resolve(table: &RawTable) -> Result<Self> {
        let required = |name: &str| {
            table
                .column_index(name)
                .ok_or_else(|| LedgerError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            client_id: required(COL_CLIENT_ID)?,
            created_at: required(COL_CREATED_AT)?,
            ledger_type: required(COL_LEDGER_TYPE)?,
            debit: required(COL_DEBIT)?,
            credit: required(COL_CREDIT)?,
            balance: required(COL_BALANCE)?,
            narration: table.column_index(COL_NARRATION),
        })
    }
}

/// Turns a raw table into ledger records.
///
/// Missing required columns, blank client IDs and non-numeric amounts are
/// fatal. Timestamps that cannot be parsed are kept as `None`.
pub fn normalize(table: &RawTable) -> Result<Vec<LedgerRecord>> {
    let columns = ColumnMap::resolve(table)?;
    let empty = RawCell::Empty;

    let mut records = Vec::with_capacity(table.rows.len());
    let mut unparsed_timestamps = 0usize;

    for (idx, cells) in table.rows.iter().enumerate() {
        let row = idx + 1;
        let cell = |col: usize| cells.get(col).unwrap_or(&empty);

        if cells.iter().all(RawCell::is_empty) {
            continue;
        }

        let client_id = cell(columns.client_id)
            .as_text()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| LedgerError::MissingField {
                row,
                column: COL_CLIENT_ID.to_string(),
            })?;

        let created_at = cell(columns.created_at).as_timestamp();
        if created_at.is_none() {
            unparsed_timestamps += 1;
            debug!("Row {} has no usable {} value", row, COL_CREATED_AT);
        }

        let ledger_type = cell(columns.ledger_type).as_text().unwrap_or_default();
        let debit = amount(cell(columns.debit), row, COL_DEBIT)?;
        let credit = amount(cell(columns.credit), row, COL_CREDIT)?;
        let balance = amount(cell(columns.balance), row, COL_BALANCE)?;
        let narration = columns.narration.and_then(|col| cell(col).as_text());

        records.push(LedgerRecord::new(
            row,
            client_id,
            created_at,
            ledger_type,
            debit,
            credit,
            balance,
            narration,
        ));
    }

    if unparsed_timestamps > 0 {
        warn!(
            "{} of {} records have an unparsable {}; they are left out of date-based reports",
            unparsed_timestamps,
            records.len(),
            COL_CREATED_AT
        );
    }
    debug!("Normalized {} ledger records", records.len());

    Ok(records)
}

fn amount(cell: &RawCell, row: usize, column: &str) -> Result<Decimal> {
    let invalid = |value: String| LedgerError::InvalidNumber {
        row,
        column: column.to_string(),
        value,
    };

    match cell {
        RawCell::Empty => Ok(Decimal::ZERO),
        RawCell::Text(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        RawCell::Text(s) => parse_amount(s).ok_or_else(|| invalid(s.clone())),
        RawCell::Number(n) => amount_from_f64(*n).ok_or_else(|| invalid(n.to_string())),
        RawCell::DateTime(dt) => Err(invalid(dt.to_string())),
    }
}
