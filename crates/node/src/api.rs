//! Node RPC surface (§6.1): `CreateFragment`, `Insert`, `ScanByRowIds`,
//! `ScanBySchema`, `ScanAll`, realized as axum JSON handlers over
//! `fragment::NodeStore`.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dqe_core::{CoreError, NodeStore};
use dqe_wire::requests::{
    CreateFragmentRequest, ErrorBody, InsertRequest, ScanByRowIdsRequest, ScanByRowIdsResponse,
    ScanBySchemaRequest, ScanBySchemaResponse,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct NodeState {
    pub store: Mutex<NodeStore>,
}

impl NodeState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(NodeStore::new()),
        })
    }
}

pub fn router(state: Arc<NodeState>) -> Router {
    Router::new()
        .route("/api/fragments", post(create_fragment))
        .route("/api/tables/:table/rows", post(insert))
        .route("/api/tables/:table/scan/row-ids", post(scan_by_row_ids))
        .route("/api/tables/:table/scan/schema", post(scan_by_schema))
        .route("/api/tables/:table/scan/all", get(scan_all))
        .with_state(state)
}

fn core_error_response(err: CoreError) -> (StatusCode, Json<ErrorBody>) {
    warn!(error = %err, "rpc handler failed");
    let status = match &err {
        CoreError::UnknownTable(_) | CoreError::UnknownColumn(_) | CoreError::UnknownNode(_) => StatusCode::NOT_FOUND,
        CoreError::Coercion(_) | CoreError::UnknownDataType | CoreError::PlanParse(_) | CoreError::InvalidRequest(_) => {
            StatusCode::BAD_REQUEST
        }
        CoreError::DuplicateColumn(_) => StatusCode::CONFLICT,
        CoreError::Transport(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorBody { error: err.to_string() }))
}

async fn create_fragment(
    State(state): State<Arc<NodeState>>,
    Json(req): Json<CreateFragmentRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    info!(table = %req.logical_schema.table_name, "CreateFragment");
    state
        .store
        .lock()
        .await
        .create_fragment(req.logical_schema, req.fragment_schema, req.projected_column_ids, req.predicates)
        .map_err(core_error_response)?;
    Ok(StatusCode::OK)
}

async fn insert(
    State(state): State<Arc<NodeState>>,
    Path(table): Path<String>,
    Json(req): Json<InsertRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    debug!(table = %table, row_id = req.row_id, "Insert");
    state
        .store
        .lock()
        .await
        .insert(&table, &req.row, req.row_id)
        .map_err(core_error_response)?;
    Ok(StatusCode::OK)
}

async fn scan_by_row_ids(
    State(state): State<Arc<NodeState>>,
    Path(table): Path<String>,
    Json(req): Json<ScanByRowIdsRequest>,
) -> Result<Json<ScanByRowIdsResponse>, (StatusCode, Json<ErrorBody>)> {
    let datasets = state
        .store
        .lock()
        .await
        .scan_by_row_ids(&table, &req.row_ids)
        .map_err(core_error_response)?;
    Ok(Json(ScanByRowIdsResponse { datasets }))
}

async fn scan_by_schema(
    State(state): State<Arc<NodeState>>,
    Path(_table): Path<String>,
    Json(req): Json<ScanBySchemaRequest>,
) -> Result<Json<ScanBySchemaResponse>, (StatusCode, Json<ErrorBody>)> {
    let datasets = state
        .store
        .lock()
        .await
        .scan_by_schema(&req.requested_schema)
        .map_err(core_error_response)?;
    Ok(Json(ScanBySchemaResponse { datasets }))
}

async fn scan_all(
    State(state): State<Arc<NodeState>>,
    Path(table): Path<String>,
) -> Result<Json<dqe_core::Dataset>, (StatusCode, Json<ErrorBody>)> {
    let dataset = state.store.lock().await.scan_all(&table).map_err(core_error_response)?;
    Ok(Json(dataset))
}
