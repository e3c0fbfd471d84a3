// src/matrix.rs
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::calendar;
use crate::cell;
use crate::corrections::CorrectionTable;
use crate::ingest;
use crate::mode::GridMode;
use crate::model::{
    Employee, EmployeeRow, GangCode, GangHeaderRow, GangMemberWorkdays, MatrixRow, OutputMatrix,
    RawEventRecord, UNASSIGNED_GANG,
};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AggregateError {
    #[error("invalid calendar month {month}/{year}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Converts one month of sparse event records into the dense output matrix:
/// one calendar-complete row per roster employee (post mode filter), gang
/// totals, and injected gang header rows. Pure and request-local; mode,
/// corrections, and gang workday data all arrive as parameters.
pub fn aggregate(
    roster: &[Employee],
    records: Vec<RawEventRecord>,
    gang_workdays: &[GangMemberWorkdays],
    year: i32,
    month: u32,
    mode: GridMode,
    corrections: &CorrectionTable,
) -> Result<OutputMatrix, AggregateError> {
    let days_in_month =
        calendar::days_in_month(year, month).ok_or(AggregateError::InvalidMonth { year, month })?;
    let (first_day, _) =
        calendar::month_bounds(year, month).ok_or(AggregateError::InvalidMonth { year, month })?;

    let grouped = ingest::group_by_employee(roster, records, year, month);

    // The record store is not trusted to deliver gang order; sort here so
    // header injection only ever sees grouped runs.
    let mut ordered: Vec<&Employee> = roster.iter().collect();
    ordered.sort_by(|a, b| {
        (a.gang_or_unassigned(), a.emp_code.as_str())
            .cmp(&(b.gang_or_unassigned(), b.emp_code.as_str()))
    });

    let mut rows: Vec<EmployeeRow> = Vec::with_capacity(ordered.len());
    for employee in ordered {
        let day_groups = grouped.get(&employee.emp_code);
        let mut cells = Vec::with_capacity(days_in_month as usize);

        for (offset, date) in first_day.iter_days().take(days_in_month as usize).enumerate() {
            let day = offset as u32 + 1;
            let cell = match day_groups.and_then(|groups| groups.get(&day)) {
                Some(day_records) => cell::build_day_cell(
                    mode,
                    &employee.emp_code,
                    date,
                    day_records,
                    corrections,
                ),
                None => cell::default_cell(date),
            };
            cells.push(cell);
        }

        let total_active_days = cells.iter().filter(|c| c.has_activity).count() as u32;
        let total_overtime_hours = match mode {
            GridMode::Overtime => Some(cells.iter().map(|c| c.ot_hours).sum()),
            GridMode::Attendance => None,
        };

        rows.push(EmployeeRow {
            emp_code: employee.emp_code.clone(),
            emp_name: employee.display_name().to_string(),
            gang_code: employee.gang_or_unassigned().to_string(),
            month,
            year,
            cells,
            total_active_days,
            total_overtime_hours,
        });
    }

    let before_filter = rows.len();
    rows.retain(|row| mode.retains_row(row));
    if rows.len() < before_filter {
        debug!(
            mode = mode.as_str(),
            dropped = before_filter - rows.len(),
            "filtered employees with no qualifying data for this mode"
        );
    }

    let gang_totals = match mode {
        GridMode::Attendance => fold_gang_totals(gang_workdays),
        GridMode::Overtime => HashMap::new(),
    };

    let total_employees = rows.len();
    let rows = inject_gang_headers(rows, &gang_totals);

    Ok(OutputMatrix {
        rows,
        days_in_month,
        total_employees,
        gang_totals,
    })
}

/// Sums the store's per-member distinct-workday counts into one total per
/// gang. Unassigned members land under the sentinel gang so their work
/// still shows up in a header.
pub fn fold_gang_totals(gang_workdays: &[GangMemberWorkdays]) -> HashMap<GangCode, i64> {
    let mut totals: HashMap<GangCode, i64> = HashMap::new();
    for member in gang_workdays {
        let gang = member
            .gang_code
            .as_deref()
            .unwrap_or(UNASSIGNED_GANG)
            .to_string();
        *totals.entry(gang).or_insert(0) += member.workdays;
    }
    totals
}

/// Walks the rows once and emits a header before the first row of every
/// maximal run of consecutive same-gang rows. Assumes nothing about global
/// grouping: `[A, A, B, A]` yields three headers.
pub fn inject_gang_headers(
    rows: Vec<EmployeeRow>,
    gang_totals: &HashMap<GangCode, i64>,
) -> Vec<MatrixRow> {
    let mut output: Vec<MatrixRow> = Vec::with_capacity(rows.len());
    let mut previous_gang: Option<String> = None;

    for row in rows {
        if previous_gang.as_deref() != Some(row.gang_code.as_str()) {
            previous_gang = Some(row.gang_code.clone());
            output.push(MatrixRow::GangHeader(GangHeaderRow {
                gang_code: row.gang_code.clone(),
                gang_total: gang_totals.get(&row.gang_code).copied(),
            }));
        }
        output.push(MatrixRow::Employee(row));
    }

    output
}
