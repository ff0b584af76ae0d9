use crate::schema::{ClientSelection, FilterSpec, LedgerRecord};
use log::debug;

impl FilterSpec {
    /// Whether a single record passes every active predicate.
    pub fn matches(&self, record: &LedgerRecord) -> bool {
        if let ClientSelection::Client(client) = &self.client {
            if record.client_id != *client {
                return false;
            }
        }

        if let Some(types) = &self.ledger_types {
            if !types.contains(&record.ledger_type) {
                return false;
            }
        }

        // Records without a script are never dropped by the script filter
        if let (Some(scripts), Some(script)) = (&self.scripts, &record.script) {
            if !scripts.contains(script) {
                return false;
            }
        }

        if let Some((start, end)) = self.date_range.bounds() {
            match record.date {
                Some(date) if date >= start && date <= end => {}
                _ => return false,
            }
        }

        true
    }
}

/// Returns the records that pass `spec`, in their original order. The
/// source slice is only borrowed.
pub fn apply_filters<'a>(records: &'a [LedgerRecord], spec: &FilterSpec) -> Vec<&'a LedgerRecord> {
    let filtered: Vec<&LedgerRecord> = records.iter().filter(|r| spec.matches(r)).collect();
    debug!(
        "Filters kept {} of {} ledger records",
        filtered.len(),
        records.len()
    );
    filtered
}
