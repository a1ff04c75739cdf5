//! Coordinator (cluster front-end): table build, fragment write broadcast,
//! and the distributed natural-join planner/executor.
//!
//! The coordinator never talks to a node directly — it only knows the
//! `NodeRpc` contract below. `dqe-wire` supplies the real implementation
//! (an HTTP client against a running `node` process); tests in this crate
//! supply an in-process one backed directly by `fragment::NodeStore`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tokio::sync::{Mutex, RwLock};

use crate::dataset::{self, Dataset};
use crate::error::CoreError;
use crate::predicate::{Predicate, PredicateOp};
use crate::row_store::Row;
use crate::schema::{DataType, TableSchema};
use crate::value::Value;

/// The node-facing RPC surface the coordinator depends on (§6 of the
/// specification, node side). An implementor fronts exactly one node.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    async fn create_fragment(
        &self,
        logical_schema: TableSchema,
        fragment_schema: TableSchema,
        projected_column_ids: Vec<usize>,
        predicates: Vec<Predicate>,
    ) -> Result<(), CoreError>;

    async fn insert(&self, table_name: &str, row: Row, row_id: i64) -> Result<(), CoreError>;

    async fn scan_by_row_ids(&self, table_name: &str, row_ids: &[i64]) -> Result<Vec<Dataset>, CoreError>;

    async fn scan_by_schema(&self, requested_schema: &TableSchema) -> Result<Vec<Dataset>, CoreError>;

    async fn scan_all(&self, table_name: &str) -> Result<Dataset, CoreError>;
}

/// One literal predicate clause parsed out of a partition-plan rule, prior
/// to resolving its column's declared datatype (that happens against the
/// table's logical schema inside `build_table`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawPredicate {
    pub column_name: String,
    pub op: PredicateOp,
    pub value: Value,
}

/// One `nodeSpec -> {column, predicate}` entry of a partition plan, already
/// split on `|` into individual node ordinals. `dqe-plan` is responsible
/// for turning partition-plan JSON bytes into a `Vec<FragmentRule>`; this
/// type lives in `dqe-core` because `build_table`'s validation rules
/// (§4.6) are part of the core, not the wire format.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentRule {
    pub node_ordinals: Vec<usize>,
    pub columns: Vec<String>,
    pub predicates: Vec<RawPredicate>,
}

pub type PartitionPlan = Vec<FragmentRule>;

/// Coordinator state: the logical schema and next row-id per table. This
/// is the *only* mutable coordinator state (§3 Lifecycle); both maps are
/// single-writer through their respective locks.
#[derive(Default)]
pub struct Coordinator {
    logical_schemas: RwLock<HashMap<String, TableSchema>>,
    row_counts: Mutex<HashMap<String, i64>>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn logical_schema(&self, table_name: &str) -> Result<TableSchema, CoreError> {
        self.logical_schemas
            .read()
            .await
            .get(table_name)
            .cloned()
            .ok_or_else(|| CoreError::UnknownTable(table_name.to_string()))
    }

    /// `BuildTable`: install the logical schema, then validate and push
    /// every fragment rule in the plan to its named nodes (§4.6). Any
    /// error fails the whole build; no rollback of already-RPC'd nodes is
    /// attempted (the caller must retry).
    pub async fn build_table(
        &self,
        logical_schema: TableSchema,
        plan: PartitionPlan,
        nodes: &[Arc<dyn NodeRpc>],
    ) -> Result<(), CoreError> {
        let table_name = logical_schema.table_name.clone();
        self.logical_schemas
            .write()
            .await
            .insert(table_name.clone(), logical_schema.clone());
        self.row_counts.lock().await.entry(table_name).or_insert(0);

        for rule in plan {
            let mut projected_column_ids = Vec::with_capacity(rule.columns.len());
            for col in &rule.columns {
                let id = logical_schema.column_id(col);
                if id < 0 {
                    return Err(CoreError::UnknownColumn(col.clone()));
                }
                projected_column_ids.push(id as usize);
            }
            let fragment_schema = logical_schema.sub(&projected_column_ids);

            let mut predicates = Vec::with_capacity(rule.predicates.len());
            for rp in &rule.predicates {
                let data_type = logical_schema.data_type(&rp.column_name)?;
                predicates.push(Predicate::new(
                    rp.column_name.clone(),
                    rp.op,
                    data_type,
                    rp.value.clone(),
                ));
            }

            let mut targets = Vec::with_capacity(rule.node_ordinals.len());
            for &ordinal in &rule.node_ordinals {
                targets.push(
                    nodes
                        .get(ordinal)
                        .ok_or_else(|| CoreError::UnknownNode(ordinal.to_string()))?,
                );
            }
            try_join_all(targets.into_iter().map(|node| {
                node.create_fragment(
                    logical_schema.clone(),
                    fragment_schema.clone(),
                    projected_column_ids.clone(),
                    predicates.clone(),
                )
            }))
            .await?;
        }
        Ok(())
    }

    /// `FragmentWrite`: reserve the next row-id for `table_name`, then
    /// broadcast `Insert` to every node. The row-id is consumed even if a
    /// downstream insert fails (SPEC_FULL.md §9 decision 4) — the next
    /// write still gets `row_id + 1`.
    pub async fn fragment_write(
        &self,
        table_name: &str,
        row: Row,
        nodes: &[Arc<dyn NodeRpc>],
    ) -> Result<i64, CoreError> {
        if !self.logical_schemas.read().await.contains_key(table_name) {
            return Err(CoreError::UnknownTable(table_name.to_string()));
        }

        let row_id = {
            let mut counts = self.row_counts.lock().await;
            let counter = counts.entry(table_name.to_string()).or_insert(0);
            let id = *counter;
            *counter += 1;
            id
        };

        try_join_all(nodes.iter().map(|node| node.insert(table_name, row.clone(), row_id))).await?;
        Ok(row_id)
    }

    /// Broadcast `ScanBySchema` to every node and reconcile the per-node
    /// datasets into one. Nodes are queried concurrently (§5 permits
    /// parallel fan-out); `try_join_all` preserves `nodes`' order in its
    /// result regardless of which RPC lands first, which `reconcile`'s
    /// later-dataset merge order depends on.
    async fn broadcast_scan_by_schema(
        &self,
        requested_schema: &TableSchema,
        nodes: &[Arc<dyn NodeRpc>],
    ) -> Result<Dataset, CoreError> {
        let per_node = try_join_all(nodes.iter().map(|node| node.scan_by_schema(requested_schema))).await?;
        let all: Vec<Dataset> = per_node.into_iter().flatten().collect();
        Ok(dataset::reconcile(all, requested_schema)?.unwrap_or_else(|| Dataset::empty(requested_schema.clone())))
    }

    /// Broadcast `ScanByRowIds` to every node and gather the requested
    /// columns by row-id. Same concurrent-fan-out/order-preservation
    /// reasoning as `broadcast_scan_by_schema`.
    async fn broadcast_scan_by_row_ids(
        &self,
        table_schema: &TableSchema,
        row_ids: &[i64],
        nodes: &[Arc<dyn NodeRpc>],
    ) -> Result<Dataset, CoreError> {
        let per_node =
            try_join_all(nodes.iter().map(|node| node.scan_by_row_ids(&table_schema.table_name, row_ids))).await?;
        let all: Vec<Dataset> = per_node.into_iter().flatten().collect();
        dataset::gather_by_row_ids(&all, table_schema, row_ids)
    }

    /// `Join`: left-deep pairwise semi-join over an evolving `cache`
    /// dataset (§4.7). Delivers the natural join of `tables` in
    /// declaration order.
    pub async fn join(&self, tables: &[String], nodes: &[Arc<dyn NodeRpc>]) -> Result<Dataset, CoreError> {
        if tables.is_empty() {
            return Err(CoreError::InvalidRequest("join requires at least one table".to_string()));
        }

        let mut schemas = Vec::with_capacity(tables.len());
        for t in tables {
            schemas.push(self.logical_schema(t).await?);
        }

        if schemas.len() == 1 {
            return self.broadcast_scan_by_schema(&schemas[0], nodes).await;
        }

        let mut cache: Option<Dataset> = None;

        for i in 0..schemas.len() - 1 {
            let left_schema = match &cache {
                Some(c) => c.schema.clone(),
                None => schemas[i].clone(),
            };
            let right_schema = schemas[i + 1].clone();

            let (left_ids, right_ids) = left_schema.foreign_keys(&right_schema);
            if left_ids.is_empty() {
                continue;
            }
            let key_types: Vec<DataType> = left_ids.iter().map(|&id| left_schema.columns[id].data_type).collect();

            let right_key_schema = right_schema.sub(&right_ids);
            let right_keys = self.broadcast_scan_by_schema(&right_key_schema, nodes).await?;

            let left_keys = match &cache {
                None => {
                    let left_key_schema = left_schema.sub(&left_ids);
                    self.broadcast_scan_by_schema(&left_key_schema, nodes).await?
                }
                Some(c) => c.sub_column(&left_ids),
            };

            let mut left_match_row_ids = Vec::new();
            let mut right_match_row_ids = Vec::new();
            for lrow in &left_keys.rows {
                let lkey = &lrow[..lrow.len() - 1];
                let l_rid = lrow.last().expect("key dataset rows always carry a trailing row-id").as_i64()?;
                for rrow in &right_keys.rows {
                    let rkey = &rrow[..rrow.len() - 1];
                    if keys_equal(lkey, rkey, &key_types)? {
                        let r_rid = rrow.last().expect("key dataset rows always carry a trailing row-id").as_i64()?;
                        left_match_row_ids.push(l_rid);
                        right_match_row_ids.push(r_rid);
                    }
                }
            }

            let right_side = self.broadcast_scan_by_row_ids(&right_schema, &right_match_row_ids, nodes).await?;
            let left_side = match &cache {
                None => self.broadcast_scan_by_row_ids(&left_schema, &left_match_row_ids, nodes).await?,
                // `left_match_row_ids` here are positions into `c` (`sub_column`
                // retags by position, not by `c`'s own preserved row-id), so
                // this must select positionally, not by row-id value — see
                // `Dataset::sub_row_by_index`.
                Some(c) => c.sub_row_by_index(&left_match_row_ids),
            };

            cache = Some(left_side.union(&right_side)?);
        }

        Ok(cache.unwrap_or_else(|| Dataset::empty(schemas[0].clone())))
    }
}

/// Equality of two key tuples, each cell coerced into the paired column's
/// declared datatype before comparing (natural-join key = name **and**
/// datatype equality, SPEC_FULL.md §9 decision 3 — the stored cells
/// themselves are never retroactively coerced at insert time, so this
/// normalizes them at comparison time instead).
fn keys_equal(a: &[Value], b: &[Value], types: &[DataType]) -> Result<bool, CoreError> {
    for (i, dt) in types.iter().enumerate() {
        if a[i].coerce_to(*dt)? != b[i].coerce_to(*dt)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::NodeStore;
    use crate::schema::ColumnSchema;

    /// In-process `NodeRpc` fronting a single `NodeStore`, used to exercise
    /// the coordinator's planner logic without any transport.
    struct LocalNode(Mutex<NodeStore>);

    impl LocalNode {
        fn new() -> Arc<dyn NodeRpc> {
            Arc::new(Self(Mutex::new(NodeStore::new())))
        }
    }

    #[async_trait]
    impl NodeRpc for LocalNode {
        async fn create_fragment(
            &self,
            logical_schema: TableSchema,
            fragment_schema: TableSchema,
            projected_column_ids: Vec<usize>,
            predicates: Vec<Predicate>,
        ) -> Result<(), CoreError> {
            self.0
                .lock()
                .await
                .create_fragment(logical_schema, fragment_schema, projected_column_ids, predicates)
        }

        async fn insert(&self, table_name: &str, row: Row, row_id: i64) -> Result<(), CoreError> {
            self.0.lock().await.insert(table_name, &row, row_id)
        }

        async fn scan_by_row_ids(&self, table_name: &str, row_ids: &[i64]) -> Result<Vec<Dataset>, CoreError> {
            self.0.lock().await.scan_by_row_ids(table_name, row_ids)
        }

        async fn scan_by_schema(&self, requested_schema: &TableSchema) -> Result<Vec<Dataset>, CoreError> {
            self.0.lock().await.scan_by_schema(requested_schema)
        }

        async fn scan_all(&self, table_name: &str) -> Result<Dataset, CoreError> {
            self.0.lock().await.scan_all(table_name)
        }
    }

    fn sales_schema() -> TableSchema {
        TableSchema::new(
            "sales",
            vec![
                ColumnSchema::new("object_id", DataType::Int32),
                ColumnSchema::new("object_name", DataType::String),
                ColumnSchema::new("sale_price", DataType::Float64),
                ColumnSchema::new("on_sale", DataType::Bool),
            ],
        )
        .unwrap()
    }

    fn on_sale_plan() -> PartitionPlan {
        vec![FragmentRule {
            node_ordinals: vec![0],
            columns: vec![
                "object_id".to_string(),
                "object_name".to_string(),
                "sale_price".to_string(),
                "on_sale".to_string(),
            ],
            predicates: vec![RawPredicate {
                column_name: "on_sale".to_string(),
                op: PredicateOp::Eq,
                value: Value::Bool(true),
            }],
        }]
    }

    #[tokio::test]
    async fn build_table_then_write_then_scan_round_trips() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];
        coordinator
            .build_table(sales_schema(), on_sale_plan(), &nodes)
            .await
            .unwrap();

        let rows: Vec<Row> = vec![
            vec![Value::Int32(1), Value::String("toothbrush".into()), Value::Float64(20.0), Value::Bool(true)],
            vec![Value::Int32(2), Value::String("toothpaste".into()), Value::Float64(25.0), Value::Bool(false)],
        ];
        for row in rows {
            coordinator.fragment_write("sales", row, &nodes).await.unwrap();
        }

        let joined = coordinator.join(&["sales".to_string()], &nodes).await.unwrap();
        assert_eq!(joined.rows.len(), 1);
    }

    #[tokio::test]
    async fn build_table_rejects_unknown_column() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];
        let mut plan = on_sale_plan();
        plan[0].columns.push("nonexistent".to_string());
        let err = coordinator.build_table(sales_schema(), plan, &nodes).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownColumn(_)));
    }

    #[tokio::test]
    async fn build_table_rejects_unknown_node() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];
        let mut plan = on_sale_plan();
        plan[0].node_ordinals = vec![5];
        let err = coordinator.build_table(sales_schema(), plan, &nodes).await.unwrap_err();
        assert!(matches!(err, CoreError::UnknownNode(_)));
    }

    #[tokio::test]
    async fn fragment_write_increments_row_count_even_with_zero_admitted_fragments() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];
        coordinator
            .build_table(sales_schema(), on_sale_plan(), &nodes)
            .await
            .unwrap();

        let rejected = vec![Value::Int32(1), Value::String("x".into()), Value::Float64(1.0), Value::Bool(false)];
        let row_id_a = coordinator.fragment_write("sales", rejected, &nodes).await.unwrap();
        let admitted = vec![Value::Int32(2), Value::String("y".into()), Value::Float64(1.0), Value::Bool(true)];
        let row_id_b = coordinator.fragment_write("sales", admitted, &nodes).await.unwrap();
        assert_eq!(row_id_a, 0);
        assert_eq!(row_id_b, 1);
    }

    #[tokio::test]
    async fn two_table_natural_join() {
        let coordinator = Coordinator::new();
        let node = LocalNode::new();
        let nodes = vec![node];

        let st_schema = TableSchema::new(
            "st",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("tid", DataType::Int32),
                ColumnSchema::new("sname", DataType::String),
            ],
        )
        .unwrap();
        let ts_schema = TableSchema::new(
            "ts",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("tid", DataType::Int32),
                ColumnSchema::new("tname", DataType::String),
            ],
        )
        .unwrap();

        let all_cols_plan = |table: &TableSchema| -> PartitionPlan {
            vec![FragmentRule {
                node_ordinals: vec![0],
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
                predicates: vec![],
            }]
        };

        coordinator.build_table(st_schema.clone(), all_cols_plan(&st_schema), &nodes).await.unwrap();
        coordinator.build_table(ts_schema.clone(), all_cols_plan(&ts_schema), &nodes).await.unwrap();

        for sid in 0..2i32 {
            for tid in 0..2i32 {
                coordinator
                    .fragment_write(
                        "st",
                        vec![Value::Int32(sid), Value::Int32(tid), Value::String(format!("s{}-{}", sid, tid))],
                        &nodes,
                    )
                    .await
                    .unwrap();
                coordinator
                    .fragment_write(
                        "ts",
                        vec![Value::Int32(sid), Value::Int32(tid), Value::String(format!("t{}-{}", sid, tid))],
                        &nodes,
                    )
                    .await
                    .unwrap();
            }
        }

        let joined = coordinator.join(&["st".to_string(), "ts".to_string()], &nodes).await.unwrap();
        assert_eq!(joined.rows.len(), 4);
        let names: Vec<&str> = joined.schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sid", "tid", "sname", "tname"]);
    }

    /// S4: a three-table left-deep chain (`student` -> `courseReg` ->
    /// `course`) where the join key changes between steps (`sid`, then
    /// `courseId`), exercising the cache's schema evolving across more
    /// than one pairwise step.
    #[tokio::test]
    async fn three_table_chain_join() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];

        let student_schema = TableSchema::new(
            "student",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("sname", DataType::String),
                ColumnSchema::new("age", DataType::Int32),
                ColumnSchema::new("grade", DataType::Int32),
            ],
        )
        .unwrap();
        let course_reg_schema = TableSchema::new(
            "courseReg",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("courseId", DataType::Int32),
            ],
        )
        .unwrap();
        let course_schema = TableSchema::new(
            "course",
            vec![
                ColumnSchema::new("courseId", DataType::Int32),
                ColumnSchema::new("cname", DataType::String),
            ],
        )
        .unwrap();

        let all_cols_plan = |table: &TableSchema| -> PartitionPlan {
            vec![FragmentRule {
                node_ordinals: vec![0],
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
                predicates: vec![],
            }]
        };
        coordinator.build_table(student_schema.clone(), all_cols_plan(&student_schema), &nodes).await.unwrap();
        coordinator.build_table(course_reg_schema.clone(), all_cols_plan(&course_reg_schema), &nodes).await.unwrap();
        coordinator.build_table(course_schema.clone(), all_cols_plan(&course_schema), &nodes).await.unwrap();

        for (sid, sname, age, grade) in [(1, "a", 20, 1), (2, "b", 21, 2)] {
            coordinator
                .fragment_write(
                    "student",
                    vec![Value::Int32(sid), Value::String(sname.to_string()), Value::Int32(age), Value::Int32(grade)],
                    &nodes,
                )
                .await
                .unwrap();
        }
        for (sid, course_id) in [(1, 100), (1, 200), (2, 100)] {
            coordinator
                .fragment_write("courseReg", vec![Value::Int32(sid), Value::Int32(course_id)], &nodes)
                .await
                .unwrap();
        }
        for (course_id, cname) in [(100, "math"), (200, "science")] {
            coordinator
                .fragment_write("course", vec![Value::Int32(course_id), Value::String(cname.to_string())], &nodes)
                .await
                .unwrap();
        }

        let joined = coordinator
            .join(&["student".to_string(), "courseReg".to_string(), "course".to_string()], &nodes)
            .await
            .unwrap();

        let names: Vec<&str> = joined.schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sid", "sname", "age", "grade", "courseId", "cname"]);
        assert_eq!(joined.rows.len(), 3);

        let as_tuples: std::collections::HashSet<(i32, String, i32)> = joined
            .rows
            .iter()
            .map(|r| (r[0].as_i32().unwrap(), r[1].as_string().unwrap(), r[4].as_i32().unwrap()))
            .collect();
        assert!(as_tuples.contains(&(1, "a".to_string(), 100)));
        assert!(as_tuples.contains(&(1, "a".to_string(), 200)));
        assert!(as_tuples.contains(&(2, "b".to_string(), 100)));
    }

    /// S3: node 0 carries two partition-plan rules sharing the same
    /// (empty) predicate set but disjoint columns — `[sid, name]` and
    /// `[age, grade]` — which must coalesce into one merged fragment
    /// (`[sid, name, age, grade]`) rather than two. The join against
    /// `courseReg` must still see every column of the merged fragment.
    #[tokio::test]
    async fn merged_schema_fragment_still_joins_correctly() {
        let coordinator = Coordinator::new();
        let node = LocalNode::new();
        let nodes = vec![node];

        let student_schema = TableSchema::new(
            "student",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("name", DataType::String),
                ColumnSchema::new("age", DataType::Int32),
                ColumnSchema::new("grade", DataType::Int32),
            ],
        )
        .unwrap();
        let course_reg_schema = TableSchema::new(
            "courseReg",
            vec![
                ColumnSchema::new("sid", DataType::Int32),
                ColumnSchema::new("courseId", DataType::Int32),
            ],
        )
        .unwrap();

        // Two rules against the same node, same (empty) predicate set,
        // disjoint columns: `NodeStore::create_fragment` must merge them
        // into a single fragment rather than keep two.
        let student_plan: PartitionPlan = vec![
            FragmentRule {
                node_ordinals: vec![0],
                columns: vec!["sid".to_string(), "name".to_string()],
                predicates: vec![],
            },
            FragmentRule {
                node_ordinals: vec![0],
                columns: vec!["age".to_string(), "grade".to_string()],
                predicates: vec![],
            },
        ];
        coordinator.build_table(student_schema.clone(), student_plan, &nodes).await.unwrap();
        coordinator
            .build_table(
                course_reg_schema.clone(),
                vec![FragmentRule {
                    node_ordinals: vec![0],
                    columns: vec!["sid".to_string(), "courseId".to_string()],
                    predicates: vec![],
                }],
                &nodes,
            )
            .await
            .unwrap();

        coordinator
            .fragment_write(
                "student",
                vec![Value::Int32(1), Value::String("alice".into()), Value::Int32(20), Value::Int32(1)],
                &nodes,
            )
            .await
            .unwrap();
        coordinator.fragment_write("courseReg", vec![Value::Int32(1), Value::Int32(100)], &nodes).await.unwrap();

        let joined = coordinator.join(&["student".to_string(), "courseReg".to_string()], &nodes).await.unwrap();
        let names: Vec<&str> = joined.schema.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["sid", "name", "age", "grade", "courseId"]);
        assert_eq!(joined.rows.len(), 1);
        assert_eq!(joined.rows[0][1], Value::String("alice".into()));
        assert_eq!(joined.rows[0][2], Value::Int32(20));
    }

    /// S6: a row whose key columns match nothing on the other side of the
    /// join is absent from the result, and its absence does not block the
    /// rows that do match.
    #[tokio::test]
    async fn non_matching_row_is_excluded_without_blocking_others() {
        let coordinator = Coordinator::new();
        let nodes = vec![LocalNode::new()];

        let st_schema = TableSchema::new(
            "st",
            vec![ColumnSchema::new("sid", DataType::Int32), ColumnSchema::new("sname", DataType::String)],
        )
        .unwrap();
        let ts_schema = TableSchema::new(
            "ts",
            vec![ColumnSchema::new("sid", DataType::Int32), ColumnSchema::new("tname", DataType::String)],
        )
        .unwrap();

        let all_cols_plan = |table: &TableSchema| -> PartitionPlan {
            vec![FragmentRule {
                node_ordinals: vec![0],
                columns: table.columns.iter().map(|c| c.name.clone()).collect(),
                predicates: vec![],
            }]
        };
        coordinator.build_table(st_schema.clone(), all_cols_plan(&st_schema), &nodes).await.unwrap();
        coordinator.build_table(ts_schema.clone(), all_cols_plan(&ts_schema), &nodes).await.unwrap();

        coordinator.fragment_write("st", vec![Value::Int32(1), Value::String("alice".into())], &nodes).await.unwrap();
        // sid 2 has no counterpart in "ts" at all.
        coordinator.fragment_write("st", vec![Value::Int32(2), Value::String("bob".into())], &nodes).await.unwrap();
        coordinator.fragment_write("ts", vec![Value::Int32(1), Value::String("math".into())], &nodes).await.unwrap();

        let joined = coordinator.join(&["st".to_string(), "ts".to_string()], &nodes).await.unwrap();
        assert_eq!(joined.rows.len(), 1);
        assert_eq!(joined.rows[0][0], Value::Int32(1));
        assert_eq!(joined.rows[0][2], Value::String("math".into()));
    }

    /// S1: a table horizontally partitioned across several nodes by
    /// disjoint predicates must reconcile into the *union* of every node's
    /// rows, not just the first node queried. `Join([T])` for a
    /// single-table join goes straight through `broadcast_scan_by_schema`,
    /// so this exercises `dataset::reconcile` with one dataset per node.
    #[tokio::test]
    async fn single_table_join_unions_rows_across_horizontally_partitioned_nodes() {
        let coordinator = Coordinator::new();
        let nodes: Vec<Arc<dyn NodeRpc>> = vec![LocalNode::new(), LocalNode::new(), LocalNode::new()];

        let schema = TableSchema::new(
            "sales",
            vec![ColumnSchema::new("object_id", DataType::Int32), ColumnSchema::new("sale_price", DataType::Float64)],
        )
        .unwrap();

        // Three disjoint price-range predicates, one per node, each
        // projecting the full column set.
        let plan = vec![
            FragmentRule {
                node_ordinals: vec![0],
                columns: vec!["object_id".to_string(), "sale_price".to_string()],
                predicates: vec![RawPredicate {
                    column_name: "sale_price".to_string(),
                    op: PredicateOp::Lt,
                    value: Value::Float64(10.0),
                }],
            },
            FragmentRule {
                node_ordinals: vec![1],
                columns: vec!["object_id".to_string(), "sale_price".to_string()],
                predicates: vec![
                    RawPredicate {
                        column_name: "sale_price".to_string(),
                        op: PredicateOp::Ge,
                        value: Value::Float64(10.0),
                    },
                    RawPredicate {
                        column_name: "sale_price".to_string(),
                        op: PredicateOp::Lt,
                        value: Value::Float64(20.0),
                    },
                ],
            },
            FragmentRule {
                node_ordinals: vec![2],
                columns: vec!["object_id".to_string(), "sale_price".to_string()],
                predicates: vec![RawPredicate {
                    column_name: "sale_price".to_string(),
                    op: PredicateOp::Ge,
                    value: Value::Float64(20.0),
                }],
            },
        ];
        coordinator.build_table(schema, plan, &nodes).await.unwrap();

        coordinator.fragment_write("sales", vec![Value::Int32(1), Value::Float64(5.0)], &nodes).await.unwrap();
        coordinator.fragment_write("sales", vec![Value::Int32(2), Value::Float64(15.0)], &nodes).await.unwrap();
        coordinator.fragment_write("sales", vec![Value::Int32(3), Value::Float64(25.0)], &nodes).await.unwrap();

        let joined = coordinator.join(&["sales".to_string()], &nodes).await.unwrap();
        assert_eq!(joined.rows.len(), 3);
        let object_ids: Vec<i32> = joined
            .rows
            .iter()
            .map(|r| match &r[0] {
                Value::Int32(v) => *v,
                other => panic!("expected Int32, got {other:?}"),
            })
            .collect();
        assert_eq!(object_ids, vec![1, 2, 3]);
    }
}
