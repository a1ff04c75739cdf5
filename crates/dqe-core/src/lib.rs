//! dqe-core — the fragment-relational engine core.
//!
//! This crate holds every piece of the distributed engine that does not
//! itself speak to the network: typed value coercion, row storage, schema
//! algebra, predicate evaluation, per-node fragment admission, the dataset
//! algebra used to stitch partial scans back together, and the coordinator's
//! table-build / fragment-write / natural-join planner logic.
//!
//! Transport (HTTP), wire encoding and partition-plan parsing live in the
//! sibling `dqe-wire` and `dqe-plan` crates; this crate only assumes it is
//! told, synchronously, what a remote node replied.

pub mod coordinator;
pub mod dataset;
pub mod error;
pub mod fragment;
pub mod predicate;
pub mod row_store;
pub mod schema;
pub mod value;

pub use coordinator::{Coordinator, FragmentRule, NodeRpc, PartitionPlan, RawPredicate};
pub use dataset::Dataset;
pub use error::CoreError;
pub use fragment::{Fragment, NodeStore};
pub use predicate::{Predicate, PredicateOp};
pub use row_store::{Row, RowStore};
pub use schema::{ColumnSchema, DataType, TableSchema};
pub use value::Value;
