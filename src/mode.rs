// src/mode.rs
use crate::model::{DayCell, EmployeeRow, RawEventRecord};

/// Aggregation mode, selected once per request and threaded explicitly
/// through the whole run. Each variant fixes which raw fields are read, the
/// activity predicate, the same-day merge rule, and the row filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// "HK": was the employee present/accounted-for that day. At most one
    /// authoritative record per day is expected; duplicates resolve to the
    /// last one delivered.
    Attendance,
    /// "OT": every overtime transaction matters for audit display, so
    /// same-day records accumulate instead of overwriting, and employees
    /// with no overtime at all are filtered out of the grid.
    Overtime,
}

impl GridMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "hk" => Some(GridMode::Attendance),
            "ot" => Some(GridMode::Overtime),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GridMode::Attendance => "hk",
            GridMode::Overtime => "ot",
        }
    }

    /// Fold one raw record into the cell under this mode's merge rule.
    pub fn merge_record(&self, cell: &mut DayCell, record: &RawEventRecord) {
        match self {
            GridMode::Attendance => {
                // Last write wins across duplicate same-day records.
                cell.work_hours = record.work_hours;
                cell.ot_hours = record.ot_hours;
                cell.is_on_leave = record.is_on_leave;
                cell.leave_length = record.leave_length;
                cell.is_rest_day = record.is_rest_day;
                cell.is_holiday = record.is_holiday;
            }
            GridMode::Overtime => {
                // Accumulate; a zero-hour transaction never lands in
                // ot_details.
                if record.ot_hours > 0.0 {
                    cell.ot_details.push(record.ot_hours);
                    cell.ot_hours += record.ot_hours;
                }
            }
        }
    }

    /// Activity predicate for a record-backed cell. Synthesized default
    /// cells never go through this; they are inactive by construction.
    pub fn has_activity(&self, cell: &DayCell) -> bool {
        match self {
            GridMode::Attendance => {
                cell.work_hours > 0.0
                    || cell.ot_hours > 0.0
                    || cell.is_on_leave
                    || cell.is_holiday
                    || cell.is_rest_day
            }
            GridMode::Overtime => cell.ot_hours > 0.0 || !cell.ot_details.is_empty(),
        }
    }

    /// Row filter applied after summaries are computed.
    pub fn retains_row(&self, row: &EmployeeRow) -> bool {
        match self {
            GridMode::Attendance => true,
            GridMode::Overtime => row.total_overtime_hours.unwrap_or(0.0) > 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 5).unwrap()
    }

    #[test]
    fn parses_wire_names_only() {
        assert_eq!(GridMode::parse("hk"), Some(GridMode::Attendance));
        assert_eq!(GridMode::parse("ot"), Some(GridMode::Overtime));
        assert_eq!(GridMode::parse("HK"), None);
        assert_eq!(GridMode::parse("attendance"), None);
        assert_eq!(GridMode::parse(""), None);
    }

    #[test]
    fn attendance_activity_covers_all_presence_flags() {
        let mode = GridMode::Attendance;
        let mut cell = DayCell::blank(day());
        assert!(!mode.has_activity(&cell));

        cell.work_hours = 7.0;
        assert!(mode.has_activity(&cell));

        cell = DayCell::blank(day());
        cell.is_on_leave = true;
        assert!(mode.has_activity(&cell));

        cell = DayCell::blank(day());
        cell.is_rest_day = true;
        assert!(mode.has_activity(&cell));

        cell = DayCell::blank(day());
        cell.is_holiday = true;
        assert!(mode.has_activity(&cell));
    }

    #[test]
    fn overtime_activity_ignores_work_and_leave_fields() {
        let mode = GridMode::Overtime;
        let mut cell = DayCell::blank(day());
        cell.work_hours = 8.0;
        cell.is_on_leave = true;
        assert!(!mode.has_activity(&cell));

        cell.ot_hours = 1.5;
        assert!(mode.has_activity(&cell));
    }
}
