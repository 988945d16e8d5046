//! Serve command - HTTP RPC surface over extraction and the report store.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use fieldlog_core::error::StoreError;
use fieldlog_core::extraction::{ReportExtractor, ReportParser};
use fieldlog_core::models::config::ExportConfig;
use fieldlog_core::store::ReportStore;
use fieldlog_core::summary::{collection_summary, SummaryOutcome};

use super::load_config;
use crate::output::export_csv;

/// Arguments for the serve command.
#[derive(Args)]
pub struct ServeArgs {
    /// Address to bind (default: from config)
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on (default: from config)
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    db_path: PathBuf,
    extractor: Arc<ReportExtractor>,
    export: ExportConfig,
}

#[derive(Deserialize)]
struct ParseRequest {
    report_text: String,
}

/// Error body returned by RPC handlers.
struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({"status": "error", "message": self.1}));
        (self.0, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

pub async fn run(args: ServeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let state = AppState {
        db_path: config.storage.database.clone(),
        extractor: Arc::new(config.build_extractor()?),
        export: config.export.clone(),
    };

    // Create the database up front so a bad path fails before binding.
    ReportStore::open_or_create(&state.db_path)?;

    let app = router(state);

    let bind = args.bind.unwrap_or(config.serve.bind);
    let port = args.port.unwrap_or(config.serve.port);
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("serve listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/rpc/parse_driver_report", post(parse_driver_report))
        .route("/rpc/get_collection_summary", get(get_collection_summary))
        .route("/rpc/export_data_csv", get(export_data_csv))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}

async fn service_info() -> Json<Value> {
    Json(json!({
        "service": "fieldlog",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "POST /rpc/parse_driver_report",
            "GET /rpc/get_collection_summary",
            "GET /rpc/export_data_csv",
        ],
    }))
}

async fn parse_driver_report(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.report_text.trim().is_empty() {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "report_text is empty".to_string(),
        ));
    }

    let report = state.extractor.extract(&request.report_text);
    let store = ReportStore::open_or_create(&state.db_path)?;
    let stored = store.insert(&report)?;

    Ok(Json(json!({
        "status": "success",
        "id": stored.id,
        "data": stored.report,
    })))
}

async fn get_collection_summary(State(state): State<AppState>) -> Response {
    let outcome = match ReportStore::open_or_create(&state.db_path) {
        Ok(store) => collection_summary(&store),
        Err(e) => SummaryOutcome::failed(&e),
    };

    let status = match outcome {
        SummaryOutcome::Failed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    };
    (status, Json(outcome)).into_response()
}

async fn export_data_csv(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let store = ReportStore::open_or_create(&state.db_path)?;
    let records = store.list_all()?;

    let path = export_csv(&records, &state.export.output_dir, state.export.include_bom)
        .map_err(|e| {
            warn!("Export failed: {}", e);
            ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    Ok(Json(json!({
        "status": "success",
        "filename": path.display().to_string(),
        "records": records.len(),
    })))
}
