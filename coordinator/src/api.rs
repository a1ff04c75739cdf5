//! Coordinator RPC surface (§6.2/§4): `BuildTable`, `FragmentWrite`, `Join`,
//! realized as axum JSON handlers over `dqe_core::Coordinator` and the
//! configured `NodeRpc` peer set.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use dqe_core::{CoreError, Coordinator, NodeRpc};
use dqe_wire::requests::{
    BuildTableRequest, ErrorBody, FragmentWriteRequest, FragmentWriteResponse, JoinRequest,
};
use tracing::{info, warn};

pub struct CoordinatorState {
    pub coordinator: Coordinator,
    pub nodes: Vec<Arc<dyn NodeRpc>>,
}

impl CoordinatorState {
    pub fn new(nodes: Vec<Arc<dyn NodeRpc>>) -> Arc<Self> {
        Arc::new(Self {
            coordinator: Coordinator::new(),
            nodes,
        })
    }
}

pub fn router(state: Arc<CoordinatorState>) -> Router {
    Router::new()
        .route("/api/tables", post(build_table))
        .route("/api/tables/:table/rows", post(fragment_write))
        .route("/api/join", post(join))
        .with_state(state)
}

fn core_error_response(err: CoreError) -> (StatusCode, Json<ErrorBody>) {
    warn!(error = %err, "coordinator rpc failed");
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

async fn build_table(
    State(state): State<Arc<CoordinatorState>>,
    Json(req): Json<BuildTableRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorBody>)> {
    info!(table = %req.logical_schema.table_name, "BuildTable");
    let plan_bytes = serde_json::to_vec(&req.partition_plan)
        .map_err(|e| core_error_response(CoreError::PlanParse(e.to_string())))?;
    let plan = dqe_plan::parse(&plan_bytes).map_err(|e| core_error_response(CoreError::PlanParse(e.to_string())))?;
    state
        .coordinator
        .build_table(req.logical_schema, plan, &state.nodes)
        .await
        .map_err(core_error_response)?;
    Ok(StatusCode::OK)
}

async fn fragment_write(
    State(state): State<Arc<CoordinatorState>>,
    Path(table): Path<String>,
    Json(req): Json<FragmentWriteRequest>,
) -> Result<Json<FragmentWriteResponse>, (StatusCode, Json<ErrorBody>)> {
    let row_id = state
        .coordinator
        .fragment_write(&table, req.row, &state.nodes)
        .await
        .map_err(core_error_response)?;
    Ok(Json(FragmentWriteResponse { row_id }))
}

async fn join(
    State(state): State<Arc<CoordinatorState>>,
    Json(req): Json<JoinRequest>,
) -> Result<Json<dqe_core::Dataset>, (StatusCode, Json<ErrorBody>)> {
    info!(tables = ?req.tables, "Join");
    let dataset = state.coordinator.join(&req.tables, &state.nodes).await.map_err(core_error_response)?;
    Ok(Json(dataset))
}
