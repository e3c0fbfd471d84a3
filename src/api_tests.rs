// src/api_tests.rs

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::corrections::CorrectionTable;
    use crate::model::{Employee, GangMemberWorkdays, RawEventRecord};
    use crate::store::{RecordStore, StoreError};
    use crate::{app, AppState};

    /// In-memory record store so the router can be exercised without a
    /// database.
    #[derive(Default, Clone)]
    struct StubStore {
        roster: Vec<Employee>,
        attendance: Vec<RawEventRecord>,
        overtime: Vec<RawEventRecord>,
        gang_workdays: Vec<GangMemberWorkdays>,
        fail: bool,
    }

    #[async_trait]
    impl RecordStore for StubStore {
        async fn fetch_roster(
            &self,
            _loc_code: &str,
            _include_inactive: bool,
        ) -> Result<Vec<Employee>, StoreError> {
            if self.fail {
                return Err(StoreError::Query(sqlx::Error::PoolClosed));
            }
            Ok(self.roster.clone())
        }

        async fn fetch_attendance(
            &self,
            _loc_code: &str,
            _year: i32,
            _month: u32,
            _include_inactive: bool,
        ) -> Result<Vec<RawEventRecord>, StoreError> {
            Ok(self.attendance.clone())
        }

        async fn fetch_overtime(
            &self,
            _loc_code: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<RawEventRecord>, StoreError> {
            Ok(self.overtime.clone())
        }

        async fn fetch_gang_workdays(
            &self,
            _loc_code: &str,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<GangMemberWorkdays>, StoreError> {
            Ok(self.gang_workdays.clone())
        }
    }

    fn employee(code: &str, gang: Option<&str>) -> Employee {
        Employee {
            emp_code: code.to_string(),
            emp_name: Some(format!("Employee {code}")),
            gang_code: gang.map(String::from),
        }
    }

    fn ot_record(code: &str, attn_date: NaiveDate, ot_hours: f64) -> RawEventRecord {
        RawEventRecord {
            emp_code: code.to_string(),
            attn_date,
            work_hours: 0.0,
            ot_hours,
            is_on_leave: false,
            leave_length: 0.0,
            is_rest_day: false,
            is_holiday: false,
        }
    }

    fn state_with(store: StubStore) -> AppState {
        AppState {
            store: Arc::new(store),
            corrections: Arc::new(CorrectionTable::default()),
        }
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let response = app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = get_json(state_with(StubStore::default()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn missing_parameters_are_rejected_before_the_store() {
        let state = state_with(StubStore {
            fail: true, // would 502 if the store were touched
            ..StubStore::default()
        });
        let (status, body) = get_json(
            state,
            "/api/attendance-by-loc-enhanced?month=11&year=2025&mode=hk",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required parameter");
        assert!(body["message"].as_str().unwrap().contains("locCode"));
    }

    #[tokio::test]
    async fn unknown_mode_is_rejected() {
        let (status, body) = get_json(
            state_with(StubStore::default()),
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=11&year=2025&mode=weekly",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid parameter");
    }

    #[tokio::test]
    async fn non_numeric_and_out_of_range_months_are_rejected() {
        let (status, _) = get_json(
            state_with(StubStore::default()),
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=abc&year=2025&mode=hk",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(
            state_with(StubStore::default()),
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=13&year=2025&mode=hk",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_maps_to_bad_gateway() {
        let state = state_with(StubStore {
            fail: true,
            ..StubStore::default()
        });
        let (status, body) = get_json(
            state,
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=11&year=2025&mode=hk",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Record store unavailable");
    }

    #[tokio::test]
    async fn attendance_grid_round_trip() {
        let state = state_with(StubStore {
            roster: vec![employee("A0749", Some("G1")), employee("C2050", Some("G2"))],
            gang_workdays: vec![GangMemberWorkdays {
                gang_code: Some("G1".to_string()),
                workdays: 18,
            }],
            ..StubStore::default()
        });

        let (status, body) = get_json(
            state,
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=11&year=2025&mode=hk",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["daysInMonth"], 30);
        assert_eq!(body["totalEmployees"], 2);
        assert_eq!(body["location"], "LOC01");
        assert_eq!(body["mode"], "hk");
        assert_eq!(body["gangTotals"]["G1"], 18);

        // Two headers and two employee rows, in gang order.
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["isGangHeader"], true);
        assert_eq!(rows[0]["gangTotal"], 18);
        assert_eq!(rows[1]["empCode"], "A0749");
        assert!(rows[1].get("day_30").is_some());
        assert_eq!(rows[2]["isGangHeader"], true);
        assert!(rows[2].get("gangTotal").is_none());
        assert_eq!(rows[3]["empCode"], "C2050");
    }

    #[tokio::test]
    async fn overtime_grid_filters_employees_without_overtime() {
        let state = state_with(StubStore {
            roster: vec![employee("A0749", Some("G1")), employee("B1001", Some("G1"))],
            overtime: vec![
                ot_record("A0749", NaiveDate::from_ymd_opt(2025, 11, 12).unwrap(), 1.5),
                ot_record("A0749", NaiveDate::from_ymd_opt(2025, 11, 12).unwrap(), 2.0),
            ],
            ..StubStore::default()
        });

        let (status, body) = get_json(
            state,
            "/api/attendance-by-loc-enhanced?locCode=LOC01&month=11&year=2025&mode=ot",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "ot");
        assert_eq!(body["totalEmployees"], 1);
        assert_eq!(body["gangTotals"], serde_json::json!({}));

        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 2); // one header, one employee
        let row = &rows[1];
        assert_eq!(row["empCode"], "A0749");
        assert_eq!(row["totalOvertimeHours"], 3.5);
        assert_eq!(row["day_12"]["otDetails"][0], 1.5);
        assert_eq!(row["day_12"]["otDetails"][1], 2.0);
    }

    #[tokio::test]
    async fn employees_by_loc_lists_roster() {
        let state = state_with(StubStore {
            roster: vec![employee("A0749", Some("G1"))],
            ..StubStore::default()
        });
        let (status, body) = get_json(state, "/api/employees-by-loc?locCode=LOC01").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["employeeCode"], "A0749");
        assert_eq!(body["data"][0]["employeeName"], "Employee A0749");
    }
}
