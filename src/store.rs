// src/store.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::info;

use crate::model::{Employee, GangMemberWorkdays, RawEventRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record store query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Read-only view over the upstream HR database. The core never talks SQL;
/// it consumes the roster, raw event rows, and the gang workday aggregate
/// through this seam, which also makes the transport layer testable with a
/// stub.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Ordered roster for a location, each member tagged with an optional
    /// gang.
    async fn fetch_roster(
        &self,
        loc_code: &str,
        include_inactive: bool,
    ) -> Result<Vec<Employee>, StoreError>;

    /// Attendance rows for a location/month (one per employee-day with
    /// activity).
    async fn fetch_attendance(
        &self,
        loc_code: &str,
        year: i32,
        month: u32,
        include_inactive: bool,
    ) -> Result<Vec<RawEventRecord>, StoreError>;

    /// Overtime transactions for a location/date range, possibly several
    /// per employee-day.
    async fn fetch_overtime(
        &self,
        loc_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawEventRecord>, StoreError>;

    /// Distinct qualifying work dates per gang member, for the gang-level
    /// totals. Computed upstream, independent of the attendance rows.
    async fn fetch_gang_workdays(
        &self,
        loc_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<GangMemberWorkdays>, StoreError>;
}

/// Postgres-backed record store over the HR schema (`hr_employment`,
/// `hr_employee`, `hr_gangln`, `pr_emp_attn`, `pr_taskreg`/`pr_taskregln`).
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!(max_connections, "connected to record store");
        Ok(Self { pool })
    }
}

// Upstream code columns are CHAR-padded; trim at the boundary so the core
// only ever sees clean identifiers.
fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn trimmed_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn fetch_roster(
        &self,
        loc_code: &str,
        include_inactive: bool,
    ) -> Result<Vec<Employee>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT emt.emp_code, e.emp_name, g.gang_code \
             FROM hr_employment emt \
             LEFT JOIN hr_employee e ON e.emp_code = emt.emp_code \
             LEFT JOIN hr_gangln g ON g.gang_member = emt.emp_code \
             WHERE emt.loc_code = $1 \
               AND ($2 OR e.status = 1) \
             ORDER BY g.gang_code, emt.emp_code",
        )
        .bind(loc_code)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        let mut roster = Vec::with_capacity(rows.len());
        for row in rows {
            roster.push(Employee {
                emp_code: trimmed(row.get("emp_code")),
                emp_name: trimmed_opt(row.get("emp_name")),
                gang_code: trimmed_opt(row.get("gang_code")),
            });
        }
        Ok(roster)
    }

    async fn fetch_attendance(
        &self,
        loc_code: &str,
        year: i32,
        month: u32,
        include_inactive: bool,
    ) -> Result<Vec<RawEventRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT a.emp_code, a.attn_date, a.work_hours, a.ot_hours, \
                    a.is_on_leave, a.leave_length, a.today_is_rest_day, a.today_is_holiday \
             FROM pr_emp_attn a \
             JOIN hr_employment emt ON emt.emp_code = a.emp_code \
             LEFT JOIN hr_employee e ON e.emp_code = a.emp_code \
             WHERE emt.loc_code = $1 \
               AND a.phys_month = $2 \
               AND a.phys_year = $3 \
               AND ($4 OR e.status = 1) \
             ORDER BY a.emp_code, a.attn_date",
        )
        .bind(loc_code)
        .bind(month as i32)
        .bind(year)
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            // NULL hours become 0 and NULL flags false; the core never sees
            // a nullable numeric.
            records.push(RawEventRecord {
                emp_code: trimmed(row.get("emp_code")),
                attn_date: row.get("attn_date"),
                work_hours: row.get::<Option<f64>, _>("work_hours").unwrap_or(0.0),
                ot_hours: row.get::<Option<f64>, _>("ot_hours").unwrap_or(0.0),
                is_on_leave: row.get::<Option<bool>, _>("is_on_leave").unwrap_or(false),
                leave_length: row.get::<Option<f64>, _>("leave_length").unwrap_or(0.0),
                is_rest_day: row
                    .get::<Option<bool>, _>("today_is_rest_day")
                    .unwrap_or(false),
                is_holiday: row
                    .get::<Option<bool>, _>("today_is_holiday")
                    .unwrap_or(false),
            });
        }
        Ok(records)
    }

    async fn fetch_overtime(
        &self,
        loc_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawEventRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT trl.emp_code, tr.doc_date, trl.hours \
             FROM pr_taskreg tr \
             JOIN pr_taskregln trl ON trl.master_id = tr.id \
             JOIN hr_employment emt ON emt.emp_code = trl.emp_code \
             WHERE emt.loc_code = $1 \
               AND tr.doc_date >= $2 \
               AND tr.doc_date <= $3 \
               AND trl.ot \
             ORDER BY trl.emp_code, tr.doc_date",
        )
        .bind(loc_code)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            records.push(RawEventRecord {
                emp_code: trimmed(row.get("emp_code")),
                attn_date: row.get("doc_date"),
                work_hours: 0.0,
                ot_hours: row.get::<Option<f64>, _>("hours").unwrap_or(0.0),
                is_on_leave: false,
                leave_length: 0.0,
                is_rest_day: false,
                is_holiday: false,
            });
        }
        Ok(records)
    }

    async fn fetch_gang_workdays(
        &self,
        loc_code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<GangMemberWorkdays>, StoreError> {
        let rows = sqlx::query(
            "SELECT g.gang_code, COUNT(DISTINCT tr.doc_date) AS member_workdays \
             FROM pr_taskreg tr \
             JOIN pr_taskregln trl ON trl.master_id = tr.id \
             JOIN hr_employment emt ON emt.emp_code = trl.emp_code \
             LEFT JOIN hr_gangln g ON g.gang_member = emt.emp_code \
             WHERE emt.loc_code = $1 \
               AND tr.doc_date >= $2 \
               AND tr.doc_date <= $3 \
               AND NOT trl.ot \
             GROUP BY g.gang_code, trl.emp_code",
        )
        .bind(loc_code)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        let mut workdays = Vec::with_capacity(rows.len());
        for row in rows {
            workdays.push(GangMemberWorkdays {
                gang_code: trimmed_opt(row.get("gang_code")),
                workdays: row.get::<Option<i64>, _>("member_workdays").unwrap_or(0),
            });
        }
        Ok(workdays)
    }
}
