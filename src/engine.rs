use crate::schema::{
    LedgerRecord, LEDGER_DEPOSIT, LEDGER_WITHDRAW, LEDGER_WITHDRAWAL_CANCELLED,
};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBalanceRow {
    pub client_id: String,
    pub last_activity: NaiveDateTime,
    pub balance: Decimal,
}

/// Debit/credit pivot per client and calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Pivot columns, ascending; `debits`/`credits` in each row follow this order
    pub ledger_types: Vec<String>,
    pub rows: Vec<LedgerSummaryRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummaryRow {
    pub client_id: String,
    pub date: NaiveDate,
    pub debits: Vec<Decimal>,
    pub credits: Vec<Decimal>,
    pub last_activity: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptReportRow {
    pub script: String,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub transactions: u64,
    pub pnl: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTypeRow {
    pub ledger_type: String,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub net: Decimal,
}

impl LedgerTypeRow {
    fn new(ledger_type: String, total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            ledger_type,
            total_debit,
            total_credit,
            net: total_credit - total_debit,
        }
    }
}

/// The six report bodies for one filtered record set, before any totals
/// rows are added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReports {
    pub client_balances: Vec<ClientBalanceRow>,
    pub ledger_summary: LedgerSummary,
    pub scripts: Vec<ScriptReportRow>,
    pub ledger_types: Vec<LedgerTypeRow>,
    pub deposit_withdraw: Vec<LedgerTypeRow>,
    pub other_ledger_types: Vec<LedgerTypeRow>,
}

pub fn aggregate(records: &[&LedgerRecord]) -> AggregatedReports {
    let reports = AggregatedReports {
        client_balances: client_balances(records),
        ledger_summary: ledger_summary(records),
        scripts: script_report(records),
        ledger_types: ledger_type_report(records),
        deposit_withdraw: deposit_withdraw_report(records),
        other_ledger_types: other_ledger_types_report(records),
    };

    debug!(
        "Aggregated {} records into {} clients, {} client-days, {} scripts, {} ledger types",
        records.len(),
        reports.client_balances.len(),
        reports.ledger_summary.rows.len(),
        reports.scripts.len(),
        reports.ledger_types.len()
    );

    reports
}

/// Latest balance per client. Records are ordered by (client, time) with a
/// stable sort, so for equal timestamps the later input row wins. Records
/// without a timestamp cannot be placed in time and are skipped.
pub fn client_balances(records: &[&LedgerRecord]) -> Vec<ClientBalanceRow> {
    let mut dated: Vec<(&LedgerRecord, NaiveDateTime)> = records
        .iter()
        .filter_map(|r| r.created_at.map(|ts| (*r, ts)))
        .collect();
    dated.sort_by(|(a, a_ts), (b, b_ts)| a.client_id.cmp(&b.client_id).then(a_ts.cmp(b_ts)));

    let mut latest: BTreeMap<&str, ClientBalanceRow> = BTreeMap::new();
    for (record, ts) in dated {
        latest.insert(
            record.client_id.as_str(),
            ClientBalanceRow {
                client_id: record.client_id.clone(),
                last_activity: ts,
                balance: record.balance,
            },
        );
    }

    latest.into_values().collect()
}

/// Pivots debit and credit over every ledger type present in `records`,
/// keyed by (client, day). Undated records contribute no rows.
pub fn ledger_summary(records: &[&LedgerRecord]) -> LedgerSummary {
    let mut type_index: BTreeMap<&str, usize> = records
        .iter()
        .map(|r| (r.ledger_type.as_str(), 0))
        .collect();
    for (idx, slot) in type_index.values_mut().enumerate() {
        *slot = idx;
    }
    let width = type_index.len();

    let mut groups: BTreeMap<(&str, NaiveDate), LedgerSummaryRow> = BTreeMap::new();
    for record in records {
        let (Some(ts), Some(date)) = (record.created_at, record.date) else {
            continue;
        };
        let column = type_index[record.ledger_type.as_str()];

        let row = groups
            .entry((record.client_id.as_str(), date))
            .or_insert_with(|| LedgerSummaryRow {
                client_id: record.client_id.clone(),
                date,
                debits: vec![Decimal::ZERO; width],
                credits: vec![Decimal::ZERO; width],
                last_activity: ts,
            });

        row.debits[column] += record.debit;
        row.credits[column] += record.credit;
        row.last_activity = row.last_activity.max(ts);
    }

    LedgerSummary {
        ledger_types: type_index.into_keys().map(String::from).collect(),
        rows: groups.into_values().collect(),
    }
}

/// Per-script totals. Records whose narration yielded no script are left out.
pub fn script_report(records: &[&LedgerRecord]) -> Vec<ScriptReportRow> {
    let mut groups: BTreeMap<&str, ScriptReportRow> = BTreeMap::new();

    for record in records {
        let Some(script) = record.script.as_deref() else {
            continue;
        };
        let row = groups.entry(script).or_insert_with(|| ScriptReportRow {
            script: script.to_string(),
            total_debit: Decimal::ZERO,
            total_credit: Decimal::ZERO,
            transactions: 0,
            pnl: Decimal::ZERO,
        });
        row.total_debit += record.debit;
        row.total_credit += record.credit;
        row.transactions += 1;
    }

    groups
        .into_values()
        .map(|mut row| {
            row.pnl = row.total_credit - row.total_debit;
            row
        })
        .collect()
}

/// Totals per ledger type, grouping on the exact (case-sensitive) value.
pub fn ledger_type_report(records: &[&LedgerRecord]) -> Vec<LedgerTypeRow> {
    group_ledger_types(records.iter().map(|r| (r.ledger_type.clone(), *r)))
}

/// Two fixed rows: deposits, and withdrawals net of cancelled withdrawals.
/// The withdrawal figure is not clamped and can go negative. Matching is
/// case-insensitive.
pub fn deposit_withdraw_report(records: &[&LedgerRecord]) -> Vec<LedgerTypeRow> {
    let mut deposit_debit = Decimal::ZERO;
    let mut deposit_credit = Decimal::ZERO;
    let mut withdraw_debit = Decimal::ZERO;
    let mut cancelled_debit = Decimal::ZERO;

    for record in records {
        match record.ledger_category().as_str() {
            LEDGER_DEPOSIT => {
                deposit_debit += record.debit;
                deposit_credit += record.credit;
            }
            LEDGER_WITHDRAW => withdraw_debit += record.debit,
            LEDGER_WITHDRAWAL_CANCELLED => cancelled_debit += record.debit,
            _ => {}
        }
    }

    vec![
        LedgerTypeRow::new(LEDGER_DEPOSIT.to_string(), deposit_debit, deposit_credit),
        LedgerTypeRow::new(
            LEDGER_WITHDRAW.to_string(),
            withdraw_debit - cancelled_debit,
            Decimal::ZERO,
        ),
    ]
}

/// Totals for everything that is not a deposit, withdrawal or cancelled
/// withdrawal, grouped on the upper-cased ledger type.
pub fn other_ledger_types_report(records: &[&LedgerRecord]) -> Vec<LedgerTypeRow> {
    group_ledger_types(records.iter().filter_map(|r| {
        let category = r.ledger_category();
        match category.as_str() {
            LEDGER_DEPOSIT | LEDGER_WITHDRAW | LEDGER_WITHDRAWAL_CANCELLED => None,
            _ => Some((category, *r)),
        }
    }))
}

fn group_ledger_types<'a>(
    keyed: impl Iterator<Item = (String, &'a LedgerRecord)>,
) -> Vec<LedgerTypeRow> {
    let mut totals: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    for (key, record) in keyed {
        let entry = totals.entry(key).or_default();
        entry.0 += record.debit;
        entry.1 += record.credit;
    }

    totals
        .into_iter()
        .map(|(ledger_type, (debit, credit))| LedgerTypeRow::new(ledger_type, debit, credit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn record(
        row: usize,
        client: &str,
        at: Option<NaiveDateTime>,
        ledger_type: &str,
        debit: Decimal,
        credit: Decimal,
        balance: Decimal,
        narration: Option<&str>,
    ) -> LedgerRecord {
        LedgerRecord::new(
            row,
            client,
            at,
            ledger_type,
            debit,
            credit,
            balance,
            narration.map(String::from),
        )
    }

    #[test]
    fn test_client_balance_uses_latest_record() {
        let records = vec![
            record(1, "C2", Some(ts(3, 9)), "DEPOSIT", dec!(0), dec!(50), dec!(50), None),
            record(2, "C1", Some(ts(2, 10)), "WITHDRAW", dec!(40), dec!(0), dec!(60), None),
            record(3, "C1", Some(ts(1, 10)), "DEPOSIT", dec!(0), dec!(100), dec!(100), None),
            record(4, "C1", None, "BILL", dec!(1), dec!(0), dec!(999), None),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();

        let balances = client_balances(&refs);
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].client_id, "C1");
        assert_eq!(balances[0].last_activity, ts(2, 10));
        assert_eq!(balances[0].balance, dec!(60));
        assert_eq!(balances[1].client_id, "C2");
        assert_eq!(balances[1].balance, dec!(50));
    }

    #[test]
    fn test_client_balance_ties_go_to_later_row() {
        let records = vec![
            record(1, "C1", Some(ts(1, 10)), "DEPOSIT", dec!(0), dec!(10), dec!(10), None),
            record(2, "C1", Some(ts(1, 10)), "DEPOSIT", dec!(0), dec!(5), dec!(15), None),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();
        assert_eq!(client_balances(&refs)[0].balance, dec!(15));
    }

    #[test]
    fn test_ledger_summary_pivot() {
        let records = vec![
            record(1, "C1", Some(ts(1, 9)), "DEPOSIT", dec!(0), dec!(100), dec!(100), None),
            record(2, "C1", Some(ts(1, 15)), "BROKERAGE", dec!(2), dec!(0), dec!(98), None),
            record(3, "C1", Some(ts(1, 12)), "BROKERAGE", dec!(3), dec!(0), dec!(95), None),
            record(4, "C2", Some(ts(2, 9)), "DEPOSIT", dec!(0), dec!(70), dec!(70), None),
            record(5, "C2", None, "BILL", dec!(9), dec!(0), dec!(61), None),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();

        let summary = ledger_summary(&refs);
        assert_eq!(summary.ledger_types, vec!["BILL", "BROKERAGE", "DEPOSIT"]);
        assert_eq!(summary.rows.len(), 2);

        let first = &summary.rows[0];
        assert_eq!(first.client_id, "C1");
        assert_eq!(first.debits, vec![dec!(0), dec!(5), dec!(0)]);
        assert_eq!(first.credits, vec![dec!(0), dec!(0), dec!(100)]);
        assert_eq!(first.last_activity, ts(1, 15));

        let second = &summary.rows[1];
        assert_eq!(second.client_id, "C2");
        assert_eq!(second.credits, vec![dec!(0), dec!(0), dec!(70)]);
    }

    #[test]
    fn test_script_report() {
        let at = Some(ts(1, 9));
        let records = vec![
            record(1, "C1", at, "MTM-UPDATE", dec!(0), dec!(30), dec!(30), Some("MTM for TCS")),
            record(2, "C1", at, "BROKERAGE", dec!(4), dec!(0), dec!(26), Some("Fee for TCS")),
            record(3, "C2", at, "MTM-UPDATE", dec!(12), dec!(0), dec!(-12), Some("MTM for INFY")),
            record(4, "C2", at, "DEPOSIT", dec!(0), dec!(50), dec!(38), Some("Cash deposit")),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();

        let scripts = script_report(&refs);
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0].script, "INFY");
        assert_eq!(scripts[0].pnl, dec!(-12));
        assert_eq!(scripts[1].script, "TCS");
        assert_eq!(scripts[1].transactions, 2);
        assert_eq!(scripts[1].pnl, dec!(26));
    }

    #[test]
    fn test_ledger_type_report_is_case_sensitive() {
        let records = vec![
            record(1, "C1", Some(ts(1, 9)), "Bill", dec!(5), dec!(0), dec!(0), None),
            record(2, "C1", Some(ts(1, 9)), "BILL", dec!(7), dec!(1), dec!(0), None),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();

        let by_type = ledger_type_report(&refs);
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[0].ledger_type, "BILL");
        assert_eq!(by_type[0].net, dec!(-6));
        assert_eq!(by_type[1].ledger_type, "Bill");

        let others = other_ledger_types_report(&refs);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].ledger_type, "BILL");
        assert_eq!(others[0].total_debit, dec!(12));
    }

    #[test]
    fn test_adjusted_withdrawal_can_go_negative() {
        let at = Some(ts(1, 9));
        let records = vec![
            record(1, "C1", at, "deposit", dec!(0), dec!(100), dec!(100), None),
            record(2, "C1", at, "WITHDRAW", dec!(30), dec!(0), dec!(70), None),
            record(3, "C1", at, "Withdrawal Cancelled", dec!(50), dec!(0), dec!(120), None),
            record(4, "C1", at, "WITHDRAW", dec!(0), dec!(999), dec!(120), None),
        ];
        let refs: Vec<&LedgerRecord> = records.iter().collect();

        let report = deposit_withdraw_report(&refs);
        assert_eq!(report[0].ledger_type, "DEPOSIT");
        assert_eq!(report[0].total_credit, dec!(100));
        assert_eq!(report[0].net, dec!(100));
        assert_eq!(report[1].ledger_type, "WITHDRAW");
        assert_eq!(report[1].total_debit, dec!(-20));
        assert_eq!(report[1].total_credit, dec!(0));
        assert_eq!(report[1].net, dec!(20));

        assert!(other_ledger_types_report(&refs).is_empty());
    }

    #[test]
    fn test_empty_input_degrades_to_empty_reports() {
        let reports = aggregate(&[]);
        assert!(reports.client_balances.is_empty());
        assert!(reports.ledger_summary.ledger_types.is_empty());
        assert!(reports.ledger_summary.rows.is_empty());
        assert!(reports.scripts.is_empty());
        assert!(reports.ledger_types.is_empty());
        assert!(reports.other_ledger_types.is_empty());
        assert_eq!(reports.deposit_withdraw.len(), 2);
        assert_eq!(reports.deposit_withdraw[1].total_debit, dec!(0));
    }
}
