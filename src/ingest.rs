// src/ingest.rs
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;
use tracing::warn;

use crate::model::{EmpCode, Employee, RawEventRecord};

/// A single employee's raw records, keyed by day-of-month. Arrival order is
/// preserved within a day; Overtime merging depends on it.
pub type DayGroups = BTreeMap<u32, Vec<RawEventRecord>>;

/// Groups raw event rows by employee, then by day-of-month.
///
/// Every roster member gets an entry even with zero records, so the matrix
/// assembler can produce a dense row for each. Records that cannot be joined
/// back to the roster, or whose date falls outside the requested month, are
/// dropped with a warning: one bad row must not blank the whole grid.
pub fn group_by_employee(
    roster: &[Employee],
    records: Vec<RawEventRecord>,
    year: i32,
    month: u32,
) -> HashMap<EmpCode, DayGroups> {
    let known: HashSet<&str> = roster.iter().map(|e| e.emp_code.as_str()).collect();
    let mut grouped: HashMap<EmpCode, DayGroups> = roster
        .iter()
        .map(|e| (e.emp_code.clone(), DayGroups::new()))
        .collect();

    for record in records {
        if !known.contains(record.emp_code.as_str()) {
            warn!(
                emp_code = %record.emp_code,
                date = %record.attn_date,
                "dropping event record for employee not on the roster"
            );
            continue;
        }
        if record.attn_date.year() != year || record.attn_date.month() != month {
            warn!(
                emp_code = %record.emp_code,
                date = %record.attn_date,
                year,
                month,
                "dropping event record dated outside the requested month"
            );
            continue;
        }
        let day = record.attn_date.day();
        if let Some(days) = grouped.get_mut(&record.emp_code) {
            days.entry(day).or_default().push(record);
        }
    }

    grouped
}
