// src/cell.rs
use chrono::NaiveDate;
use tracing::info;

use crate::calendar;
use crate::corrections::CorrectionTable;
use crate::mode::GridMode;
use crate::model::{DayCell, RawEventRecord};

/// Merges a day's raw records into one normalized cell under the active
/// mode. `records` must be non-empty; record-free days go through
/// [`default_cell`] instead.
pub fn build_day_cell(
    mode: GridMode,
    emp_code: &str,
    date: NaiveDate,
    records: &[RawEventRecord],
    corrections: &CorrectionTable,
) -> DayCell {
    let mut cell = DayCell::blank(date);

    // Known upstream double-bookings: a lone overtime record whose hours
    // match a configured correction is replaced by its split amounts.
    if mode == GridMode::Overtime {
        if let [single] = records {
            if let Some(replacements) = corrections.lookup(emp_code, date, single.ot_hours) {
                info!(
                    emp_code,
                    %date,
                    original_hours = single.ot_hours,
                    replacement_hours = ?replacements,
                    "applying overtime correction"
                );
                for &hours in replacements {
                    if hours > 0.0 {
                        cell.ot_details.push(hours);
                        cell.ot_hours += hours;
                    }
                }
                cell.has_activity = mode.has_activity(&cell);
                return cell;
            }
        }
    }

    for record in records {
        mode.merge_record(&mut cell, record);
    }
    cell.has_activity = mode.has_activity(&cell);
    cell
}

/// Fabricates the cell for a day with no raw record: all numerics zero, all
/// flags false except the Sunday rest-day default, never active.
pub fn default_cell(date: NaiveDate) -> DayCell {
    let mut cell = DayCell::blank(date);
    cell.is_rest_day = calendar::is_default_rest_day(date);
    cell
}
