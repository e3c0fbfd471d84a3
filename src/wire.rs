// src/wire.rs
//
// Response shaping for the grid API. The core hands over an OutputMatrix
// with per-row cell vectors; the wire format wants each row flattened into
// `day_1..day_N` keys, so the presentation layer can index columns directly.

use serde_json::{json, Map, Value};

use crate::mode::GridMode;
use crate::model::{Employee, EmployeeRow, GangHeaderRow, MatrixRow, OutputMatrix};

/// Body of `/api/attendance-by-loc-enhanced`.
pub fn grid_response(location: &str, mode: GridMode, matrix: &OutputMatrix) -> Value {
    let data: Vec<Value> = matrix.rows.iter().map(row_value).collect();
    json!({
        "success": true,
        "data": data,
        "daysInMonth": matrix.days_in_month,
        "totalEmployees": matrix.total_employees,
        "location": location,
        "gangTotals": &matrix.gang_totals,
        "mode": mode.as_str(),
    })
}

/// Body of `/api/employees-by-loc`.
pub fn employees_response(location: &str, roster: &[Employee]) -> Value {
    let data: Vec<Value> = roster
        .iter()
        .map(|employee| {
            json!({
                "employeeCode": &employee.emp_code,
                "employeeName": employee.display_name(),
                "locationCode": location,
                "gangCode": &employee.gang_code,
            })
        })
        .collect();
    json!({
        "success": true,
        "data": data,
        "count": roster.len(),
    })
}

fn row_value(row: &MatrixRow) -> Value {
    match row {
        MatrixRow::GangHeader(header) => header_row_value(header),
        MatrixRow::Employee(row) => employee_row_value(row),
    }
}

fn header_row_value(header: &GangHeaderRow) -> Value {
    let mut value = Map::new();
    value.insert("isGangHeader".to_string(), Value::Bool(true));
    value.insert("gangCode".to_string(), json!(&header.gang_code));
    if let Some(total) = header.gang_total {
        value.insert("gangTotal".to_string(), json!(total));
    }
    Value::Object(value)
}

fn employee_row_value(row: &EmployeeRow) -> Value {
    let mut value = Map::new();
    value.insert("empCode".to_string(), json!(&row.emp_code));
    value.insert("empName".to_string(), json!(&row.emp_name));
    value.insert("gangCode".to_string(), json!(&row.gang_code));
    value.insert("month".to_string(), json!(row.month));
    value.insert("year".to_string(), json!(row.year));
    value.insert("totalActiveDays".to_string(), json!(row.total_active_days));
    if let Some(total) = row.total_overtime_hours {
        value.insert("totalOvertimeHours".to_string(), json!(total));
    }
    for (offset, cell) in row.cells.iter().enumerate() {
        let key = format!("day_{}", offset + 1);
        value.insert(key, serde_json::to_value(cell).unwrap_or(Value::Null));
    }
    Value::Object(value)
}
