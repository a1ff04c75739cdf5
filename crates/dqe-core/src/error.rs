//! Typed errors for the engine core.

use thiserror::Error;

/// Errors surfaced by the fragment admission engine, dataset algebra and
/// coordinator planner. Every variant maps to one of the error kinds in the
/// external interface (`Cast`, `Schema reference`, `Unknown node`,
/// `Predicate evaluation`, `Unknown table`); `Transport` lives in
/// `dqe-wire` and is folded in here only when it aborts a coordinator
/// request.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("unknown data type")]
    UnknownDataType,

    #[error("cannot coerce value: {0}")]
    Coercion(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown node: {0}")]
    UnknownNode(String),

    #[error("duplicate column name in schema: {0}")]
    DuplicateColumn(String),

    #[error("malformed partition plan: {0}")]
    PlanParse(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
