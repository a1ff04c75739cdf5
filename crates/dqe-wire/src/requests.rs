//! Named request/response structs for every RPC in §6 of the
//! specification. The source passed positional heterogeneous argument
//! arrays; per the "Polymorphic RPC arguments" redesign flag, every
//! operation here gets its own `serde`-derived struct instead.

use dqe_core::{Dataset, Predicate, Row, TableSchema};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// ---------------------------------------------------------------------
// Coordinator RPCs
// ---------------------------------------------------------------------

/// `BuildTable([logicalSchema, partitionPlanBytes])`. The partition plan
/// travels as a raw JSON value; the handler re-serializes it to bytes and
/// hands it to `dqe_plan::parse`, exactly mirroring the "bytes" framing of
/// §6.2 while staying native JSON over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTableRequest {
    pub logical_schema: TableSchema,
    pub partition_plan: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentWriteRequest {
    pub row: Row,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentWriteResponse {
    pub row_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub tables: Vec<String>,
}

// ---------------------------------------------------------------------
// Node RPCs
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFragmentRequest {
    pub logical_schema: TableSchema,
    pub fragment_schema: TableSchema,
    pub projected_column_ids: Vec<usize>,
    pub predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsertRequest {
    pub row: Row,
    pub row_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanByRowIdsRequest {
    pub row_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanBySchemaRequest {
    pub requested_schema: TableSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanByRowIdsResponse {
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanBySchemaResponse {
    pub datasets: Vec<Dataset>,
}
