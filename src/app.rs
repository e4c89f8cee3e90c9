#![cfg(feature = "web")]
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;

use crate::aggregate::chartable_columns;
use crate::config::AppConfig;
use crate::dataset::TabularDataset;
use crate::downloader::XLSX_MIME;
use crate::error::InventoryError;
use crate::filter::{FilterSelection, filter_options};
use crate::graph::{ChartOptions, render_distribution};
use crate::loader::{SourceLoader, source_for_path};
use crate::record::NewRecordRequest;
use crate::session::Session;
use crate::sink::{CsvFileSink, RecordSink};

pub struct AppState {
    config: AppConfig,
    source: Arc<dyn SourceLoader>,
    sink: Arc<dyn RecordSink>,
    session: RwLock<Session>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        source: Arc<dyn SourceLoader>,
        sink: Arc<dyn RecordSink>,
        session: Session,
    ) -> Self {
        AppState {
            config,
            source,
            sink,
            session: RwLock::new(session),
        }
    }

    /// A copy of the current session; requests never hold the lock while
    /// they work.
    fn session(&self) -> Session {
        match self.session.read() {
            Ok(session) => session.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn replace_session(&self, session: Session) {
        match self.session.write() {
            Ok(mut current) => *current = session,
            Err(poisoned) => *poisoned.into_inner() = session,
        }
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Serialize)]
struct TablePayload<'a> {
    columns: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
    total_rows: usize,
}

#[derive(Serialize)]
struct RecordResponse {
    status: String,
    row: Vec<String>,
    reloaded: bool,
}

/// Error answer of every endpoint: JSON body plus a status code matching
/// the failing party.
struct ApiError(InventoryError);

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InventoryError::InvalidColumn { .. } => StatusCode::BAD_REQUEST,
            InventoryError::SinkUnavailable { .. } | InventoryError::SourceUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("request failed: {}", self.0);
        (
            status,
            Json(StatusResponse {
                status: "error".to_string(),
                message: Some(self.0.to_string()),
            }),
        )
            .into_response()
    }
}

/// Builds the state from `config`: file source and sink, first load.
pub fn build_state(config: AppConfig) -> Result<AppState, InventoryError> {
    let source: Arc<dyn SourceLoader> =
        Arc::from(source_for_path(&config.source.path, config.source.worksheet.clone())?);
    let sink: Arc<dyn RecordSink> = Arc::new(CsvFileSink::new(&config.sink.path));
    let session = Session::open(
        source.as_ref(),
        config.record_layout.clone(),
        config.export.sheet_name.clone(),
    )?;
    Ok(AppState::new(config, source, sink, session))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/dataset", get(get_dataset))
        .route("/api/filters", get(get_filters))
        .route("/api/columns", get(get_columns))
        .route("/api/layout", get(get_layout))
        .route("/api/distribution", get(get_distribution))
        .route("/api/chart.png", get(get_chart))
        .route("/api/export", get(export_xlsx))
        .route("/api/records", post(add_record))
        .route("/api/reload", post(reload))
        .with_state(state)
}

pub async fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let bind_addr = config.bind_addr.clone();
    let state = tokio::task::spawn_blocking(move || build_state(config)).await??;
    let app = router(Arc::new(state));

    // Start server
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reads the repeated `filter=<column>:<value>` parameters of a query into
/// a selection. The column ends at the first `:`; pairs without one are
/// skipped.
pub fn parse_filter_params(params: &[(String, String)]) -> FilterSelection {
    FilterSelection::from_pairs(
        params
            .iter()
            .filter(|(key, _)| key == "filter")
            .filter_map(|(_, value)| value.split_once(':')),
    )
}

async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(include_str!("./static/index.html").replace("{{title}}", &state.config.title))
}

async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let session = state.session();
    let view = session.view(&parse_filter_params(&params))?;
    Ok(Json(table_payload(&view, session.dataset().row_count())).into_response())
}

async fn get_filters(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session();
    Json(filter_options(session.dataset()))
}

async fn get_columns(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.session();
    let columns: Vec<String> = chartable_columns(session.dataset())
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(columns)
}

async fn get_layout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.record_layout.clone())
}

async fn get_distribution(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let column = distribution_column(&params)?;
    let dist = state
        .session()
        .distribution(&parse_filter_params(&params), &column)?;
    Ok(Json(dist).into_response())
}

async fn get_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let column = distribution_column(&params)?;
    let dist = state
        .session()
        .distribution(&parse_filter_params(&params), &column)?;
    let options = ChartOptions::for_column(&column);
    let png = tokio::task::spawn_blocking(move || render_distribution(&dist, &options))
        .await
        .map_err(|e| InventoryError::Chart {
            message: e.to_string(),
        })??;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn export_xlsx(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let bytes = state.session().export(&parse_filter_params(&params))?;
    let disposition = format!("attachment; filename=\"{}\"", state.config.export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn add_record(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewRecordRequest>,
) -> Result<Response, ApiError> {
    let worker = Arc::clone(&state);
    let (row, reloaded) = tokio::task::spawn_blocking(move || {
        let mut session = worker.session();
        let row = session.submit(&request, worker.sink.as_ref())?;
        // The record is stored; a failed reload only leaves the old view.
        let reloaded = session.reload(worker.source.as_ref()).is_ok();
        if reloaded {
            worker.replace_session(session);
        }
        Ok::<_, InventoryError>((row, reloaded))
    })
    .await
    .map_err(|e| InventoryError::SinkUnavailable {
        message: e.to_string(),
    })??;

    Ok(Json(RecordResponse {
        status: "ok".to_string(),
        row,
        reloaded,
    })
    .into_response())
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let worker = Arc::clone(&state);
    tokio::task::spawn_blocking(move || {
        let mut session = worker.session();
        session.reload(worker.source.as_ref())?;
        worker.replace_session(session);
        Ok::<_, InventoryError>(())
    })
    .await
    .map_err(|e| InventoryError::SourceUnavailable {
        origin: state.source.describe(),
        message: e.to_string(),
    })??;

    Ok(Json(StatusResponse {
        status: "ok".to_string(),
        message: None,
    })
    .into_response())
}

/// The `column` parameter of a distribution or chart request. A missing
/// parameter names no column, which is an invalid column.
fn distribution_column(params: &[(String, String)]) -> Result<String, ApiError> {
    params
        .iter()
        .find(|(key, _)| key == "column")
        .map(|(_, value)| value.clone())
        .ok_or_else(|| ApiError(InventoryError::invalid_column("")))
}

fn table_payload(view: &TabularDataset, total_rows: usize) -> TablePayload<'_> {
    TablePayload {
        columns: view.column_names(),
        rows: view.rows().collect(),
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_filter_params_groups_by_column() {
        let selection = parse_filter_params(&params(&[
            ("filter", "Tipo:Bomba"),
            ("filter", "Tipo:Motor"),
            ("filter", "Código Pai/Local:ÁREA:01"),
            ("column", "Fabricante"),
            ("filter", "sem-separador"),
        ]));
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.accepted("Tipo").map(|s| s.len()), Some(2));
        assert!(
            selection
                .accepted("Código Pai/Local")
                .is_some_and(|s| s.contains("ÁREA:01"))
        );
    }

    #[test]
    fn test_distribution_column_is_required() {
        assert!(distribution_column(&params(&[("filter", "Tipo:Bomba")])).is_err());
        let column = distribution_column(&params(&[("column", "Tipo")])).ok();
        assert_eq!(column.as_deref(), Some("Tipo"));
    }
}
