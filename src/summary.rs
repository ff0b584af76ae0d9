use crate::engine::AggregatedReports;
use crate::error::Result;
use crate::export::export_workbook;
use crate::schema::ScriptView;
use crate::table::*;
use rust_decimal::Decimal;
use serde::Serialize;

pub const TOTAL_LABEL: &str = "Total";
pub const GRAND_SUMMARY_LABEL: &str = "Grand Summary:";

/// Column-wise totals over `source`'s rows. Numeric columns are summed
/// (an empty table sums to zero), the first column carries `label`, and
/// every other column is left blank.
pub fn totals_row(source: &ReportTable, label: Option<&str>) -> Vec<Cell> {
    source
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| match column.kind {
            ColumnKind::Amount => Cell::Amount(
                source
                    .rows
                    .iter()
                    .filter_map(|row| match row.get(idx) {
                        Some(Cell::Amount(d)) => Some(*d),
                        _ => None,
                    })
                    .sum::<Decimal>(),
            ),
            ColumnKind::Count => Cell::Count(
                source
                    .rows
                    .iter()
                    .filter_map(|row| match row.get(idx) {
                        Some(Cell::Count(n)) => Some(*n),
                        _ => None,
                    })
                    .sum(),
            ),
            _ if idx == 0 => label.map(|l| Cell::Text(l.to_string())).unwrap_or(Cell::Blank),
            _ => Cell::Blank,
        })
        .collect()
}

pub fn append_totals(table: &ReportTable, label: Option<&str>) -> ReportTable {
    table.with_row(totals_row(table, label))
}

/// Appends to `displayed` the totals of `population`, which may hold more
/// rows than are displayed.
pub fn append_totals_from(
    displayed: &ReportTable,
    population: &ReportTable,
    label: Option<&str>,
) -> ReportTable {
    displayed.with_row(totals_row(population, label))
}

/// The six finished tables of a run, each ending with its totals row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportBundle {
    pub client_balance: ReportTable,
    pub ledger_summary: ReportTable,
    pub script_report: ReportTable,
    pub ledger_type_report: ReportTable,
    pub deposit_withdraw: ReportTable,
    pub other_ledger_types: ReportTable,
}

impl ReportBundle {
    /// Tables in workbook order.
    pub fn tables(&self) -> [&ReportTable; 6] {
        ReportKind::ALL.map(|kind| self.table(kind))
    }

    pub fn table(&self, kind: ReportKind) -> &ReportTable {
        match kind {
            ReportKind::ClientBalance => &self.client_balance,
            ReportKind::LedgerSummary => &self.ledger_summary,
            ReportKind::ScriptReport => &self.script_report,
            ReportKind::LedgerTypeReport => &self.ledger_type_report,
            ReportKind::DepositWithdraw => &self.deposit_withdraw,
            ReportKind::OtherLedgerTypes => &self.other_ledger_types,
        }
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        export_workbook(&self.tables())
    }
}

/// Builds the display tables and their totals rows.
///
/// The script report rows honour `script_view`, but its totals row always
/// covers every script.
pub fn augment(reports: &AggregatedReports, script_view: ScriptView) -> ReportBundle {
    let all_scripts = script_table(&reports.scripts);
    let shown_scripts = script_table(
        reports
            .scripts
            .iter()
            .filter(|row| script_view.retains(row.pnl)),
    );

    ReportBundle {
        client_balance: append_totals(
            &client_balance_table(&reports.client_balances),
            Some(TOTAL_LABEL),
        ),
        ledger_summary: append_totals(&ledger_summary_table(&reports.ledger_summary), None),
        script_report: append_totals_from(
            &shown_scripts,
            &all_scripts,
            Some(GRAND_SUMMARY_LABEL),
        ),
        ledger_type_report: append_totals(
            &ledger_type_table(ReportKind::LedgerTypeReport, &reports.ledger_types),
            Some(GRAND_SUMMARY_LABEL),
        ),
        deposit_withdraw: append_totals(
            &ledger_type_table(ReportKind::DepositWithdraw, &reports.deposit_withdraw),
            Some(GRAND_SUMMARY_LABEL),
        ),
        other_ledger_types: append_totals(
            &ledger_type_table(ReportKind::OtherLedgerTypes, &reports.other_ledger_types),
            Some(GRAND_SUMMARY_LABEL),
        ),
    }
}
