// src/model.rs
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type EmpCode = String;
pub type GangCode = String;

/// Sentinel gang for roster members with no gang assignment. Keeping these
/// under one explicit group preserves the header-per-gang invariant.
pub const UNASSIGNED_GANG: &str = "INF";

/// A roster member for a location, as delivered by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub emp_code: EmpCode,
    pub emp_name: Option<String>,
    pub gang_code: Option<GangCode>,
}

impl Employee {
    /// Display name, falling back to the employee code when the HR master
    /// record carries no name.
    pub fn display_name(&self) -> &str {
        match self.emp_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.emp_code,
        }
    }

    pub fn gang_or_unassigned(&self) -> &str {
        self.gang_code.as_deref().unwrap_or(UNASSIGNED_GANG)
    }
}

/// One raw event row: at most one per (employee, day) in attendance data,
/// possibly several in overtime data (one per overtime transaction).
/// The store coerces SQL NULLs before these are constructed, so hours are
/// plain numbers and flags plain booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEventRecord {
    pub emp_code: EmpCode,
    pub attn_date: NaiveDate,
    pub work_hours: f64,
    pub ot_hours: f64,
    pub is_on_leave: bool,
    pub leave_length: f64,
    pub is_rest_day: bool,
    pub is_holiday: bool,
}

/// Normalized cell for one employee-day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub work_hours: f64,
    pub ot_hours: f64,
    /// Individual overtime amounts in arrival order (Overtime mode). Never
    /// contains zero entries.
    pub ot_details: Vec<f64>,
    pub is_on_leave: bool,
    pub leave_length: f64,
    pub is_rest_day: bool,
    pub is_holiday: bool,
    pub date: NaiveDate,
    pub has_activity: bool,
}

impl DayCell {
    /// All-zero cell with no flags set. Record merging and the default-cell
    /// fabrication both start from this.
    pub fn blank(date: NaiveDate) -> Self {
        Self {
            work_hours: 0.0,
            ot_hours: 0.0,
            ot_details: Vec::new(),
            is_on_leave: false,
            leave_length: 0.0,
            is_rest_day: false,
            is_holiday: false,
            date,
            has_activity: false,
        }
    }
}

/// Dense per-employee row: exactly `days_in_month` cells, cell index 0 is
/// day 1.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRow {
    pub emp_code: EmpCode,
    pub emp_name: String,
    pub gang_code: GangCode,
    pub month: u32,
    pub year: i32,
    pub cells: Vec<DayCell>,
    pub total_active_days: u32,
    /// Sum of `ot_hours` across the row. Populated in Overtime mode only.
    pub total_overtime_hours: Option<f64>,
}

/// Marker row injected before the first employee row of each gang run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GangHeaderRow {
    pub gang_code: GangCode,
    /// Gang-level workday total (Attendance mode). Absent for gangs with no
    /// qualifying work entries.
    pub gang_total: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MatrixRow {
    GangHeader(GangHeaderRow),
    Employee(EmployeeRow),
}

impl MatrixRow {
    pub fn as_employee(&self) -> Option<&EmployeeRow> {
        match self {
            MatrixRow::Employee(row) => Some(row),
            MatrixRow::GangHeader(_) => None,
        }
    }

    pub fn as_gang_header(&self) -> Option<&GangHeaderRow> {
        match self {
            MatrixRow::GangHeader(header) => Some(header),
            MatrixRow::Employee(_) => None,
        }
    }
}

/// Aggregation result for one (location, month, mode) request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMatrix {
    pub rows: Vec<MatrixRow>,
    pub days_in_month: u32,
    /// Employee rows after mode filtering; header rows are not counted.
    pub total_employees: usize,
    /// Gang-level workday totals (Attendance mode; empty in Overtime mode).
    pub gang_totals: HashMap<GangCode, i64>,
}

/// Distinct qualifying work dates for one gang member, from the store's
/// independent gang-total aggregate. Deliberately decoupled from the
/// per-row activity counts.
#[derive(Debug, Clone, PartialEq)]
pub struct GangMemberWorkdays {
    pub gang_code: Option<GangCode>,
    pub workdays: i64,
}
