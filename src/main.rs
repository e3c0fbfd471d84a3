// src/main.rs
use std::{env, net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod calendar;
mod cell;
mod corrections;
mod ingest;
mod matrix;
mod mode;
mod model;
mod store;
mod wire;

mod api_tests;

use corrections::CorrectionTable;
use mode::GridMode;
use store::{PgRecordStore, RecordStore};

// --- CLI & Configuration ---

#[derive(Parser, Debug)]
#[command(name = "mustergrid")]
#[command(about = "Attendance and overtime muster grid server", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:5177")]
    bind: SocketAddr,
    /// JSON file with known overtime corrections
    #[arg(long)]
    corrections: Option<PathBuf>,
    /// Record store connection pool size
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

// --- Error Handling ---

#[derive(Error, Debug)]
enum AppError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter {param}: {value}")]
    InvalidParameter { param: &'static str, value: String },
    #[error("Record store error: {0}")]
    Store(#[from] store::StoreError),
    #[error(transparent)]
    Aggregate(#[from] matrix::AggregateError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);

        let (status, error, message) = match &self {
            AppError::MissingParameter(param) => (
                StatusCode::BAD_REQUEST,
                "Missing required parameter",
                format!("Missing required parameter: {param}"),
            ),
            AppError::InvalidParameter { param, value } => (
                StatusCode::BAD_REQUEST,
                "Invalid parameter",
                format!("Invalid value for parameter {param}: {value}"),
            ),
            AppError::Store(_) => (
                StatusCode::BAD_GATEWAY,
                "Record store unavailable",
                // Details stay in the log.
                "The upstream record store could not be queried.".to_string(),
            ),
            AppError::Aggregate(e) => {
                (StatusCode::BAD_REQUEST, "Aggregation failed", e.to_string())
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

// --- Shared Application State ---

#[derive(Clone)]
struct AppState {
    store: Arc<dyn RecordStore>,
    corrections: Arc<CorrectionTable>,
}

fn app(state: AppState) -> Router {
    // Permissive CORS, matching the original deployment on a plant LAN.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route(
            "/api/attendance-by-loc-enhanced",
            get(handle_attendance_grid),
        )
        .route("/api/employees-by-loc", get(handle_employees_by_loc))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Web Handlers ---

/// Query parameters arrive as raw strings so every rejection can carry a
/// structured JSON body instead of the extractor's plain-text 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridQuery {
    loc_code: Option<String>,
    month: Option<String>,
    year: Option<String>,
    mode: Option<String>,
    include_inactive: Option<String>,
}

fn parse_param<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<T, AppError> {
    let raw = value.ok_or(AppError::MissingParameter(name))?;
    raw.parse().map_err(|_| AppError::InvalidParameter {
        param: name,
        value: raw,
    })
}

async fn handle_attendance_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<Value>, AppError> {
    let loc_code = query
        .loc_code
        .ok_or(AppError::MissingParameter("locCode"))?;
    let month: u32 = parse_param("month", query.month)?;
    let year: i32 = parse_param("year", query.year)?;
    let mode_raw = query.mode.ok_or(AppError::MissingParameter("mode"))?;
    let mode = GridMode::parse(&mode_raw).ok_or(AppError::InvalidParameter {
        param: "mode",
        value: mode_raw,
    })?;
    let include_inactive = query.include_inactive.as_deref() == Some("true");

    let (start, end) =
        calendar::month_bounds(year, month).ok_or_else(|| AppError::InvalidParameter {
            param: "month",
            value: month.to_string(),
        })?;

    let roster = state.store.fetch_roster(&loc_code, include_inactive).await?;

    let (records, gang_workdays) = match mode {
        GridMode::Attendance => {
            let records = state
                .store
                .fetch_attendance(&loc_code, year, month, include_inactive)
                .await?;
            let workdays = state
                .store
                .fetch_gang_workdays(&loc_code, start, end)
                .await?;
            (records, workdays)
        }
        GridMode::Overtime => {
            let records = state.store.fetch_overtime(&loc_code, start, end).await?;
            (records, Vec::new())
        }
    };

    let matrix = matrix::aggregate(
        &roster,
        records,
        &gang_workdays,
        year,
        month,
        mode,
        &state.corrections,
    )?;

    info!(
        %loc_code,
        year,
        month,
        mode = mode.as_str(),
        employees = matrix.total_employees,
        "served attendance grid"
    );
    Ok(Json(wire::grid_response(&loc_code, mode, &matrix)))
}

async fn handle_employees_by_loc(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<Value>, AppError> {
    let loc_code = query
        .loc_code
        .ok_or(AppError::MissingParameter("locCode"))?;
    let include_inactive = query.include_inactive.as_deref() == Some("true");

    let roster = state.store.fetch_roster(&loc_code, include_inactive).await?;
    Ok(Json(wire::employees_response(&loc_code, &roster)))
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "OK",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

// --- Main ---

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let database_url =
        env::var("DATABASE_URL").context("DATABASE_URL must be set to the record store")?;

    let corrections = match &cli.corrections {
        Some(path) => CorrectionTable::load_from_file(path)
            .context("failed to load overtime corrections")?,
        None => CorrectionTable::default(),
    };

    let record_store = PgRecordStore::connect(&database_url, cli.max_connections)
        .await
        .context("failed to connect to the record store")?;

    let state = AppState {
        store: Arc::new(record_store),
        corrections: Arc::new(corrections),
    };

    info!(addr = %cli.bind, "starting mustergrid server");
    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
