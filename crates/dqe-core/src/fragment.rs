//! Per-node fragment admission: `CreateFragment`, `Insert`, and the three
//! scan shapes a node answers (`ScanByRowIds`, `ScanBySchema`, `ScanAll`).

use crate::dataset::Dataset;
use crate::error::CoreError;
use crate::predicate::Predicate;
use crate::row_store::{Row, RowStore};
use crate::schema::TableSchema;
use crate::value::Value;
use std::collections::HashMap;

/// A horizontally-filtered, vertically-projected slice of a table, stored
/// on one node. Addressed externally by `tableName-<ordinal>`; `ordinal`
/// is this fragment's position within its table's fragment list.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub table_name: String,
    pub ordinal: usize,
    pub fragment_schema: TableSchema,
    pub projected_column_ids: Vec<usize>,
    pub predicates: Vec<Predicate>,
    pub logical_schema: TableSchema,
    pub rows: RowStore,
}

impl Fragment {
    pub fn key(&self) -> String {
        format!("{}-{}", self.table_name, self.ordinal)
    }

    /// Conjunction of all predicates against a logical row, resolving
    /// each predicate's column by name through `logical_schema`.
    pub fn predicate_check(&self, row: &Row) -> Result<bool, CoreError> {
        for p in &self.predicates {
            let col_id = self.logical_schema.column_id(&p.column_name);
            if col_id < 0 {
                return Err(CoreError::UnknownColumn(p.column_name.clone()));
            }
            let cell = row.get(col_id as usize).ok_or_else(|| {
                CoreError::Coercion(format!(
                    "row has {} cells, logical schema expects index {}",
                    row.len(),
                    col_id
                ))
            })?;
            if !p.evaluate(cell)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn unordered_predicate_eq(a: &[Predicate], b: &[Predicate]) -> bool {
        if a.len() != b.len() {
            return false;
        }
        let mut remaining: Vec<&Predicate> = b.iter().collect();
        for pa in a {
            match remaining.iter().position(|pb| *pb == pa) {
                Some(pos) => {
                    remaining.remove(pos);
                }
                None => return false,
            }
        }
        true
    }
}

/// Per-node state: a fragment list per table, ordinal = index into the
/// list (dense, starting at 0, strictly growing).
#[derive(Debug, Default)]
pub struct NodeStore {
    fragments: HashMap<String, Vec<Fragment>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self {
            fragments: HashMap::new(),
        }
    }

    /// Scan existing fragments for the table in ordinal order; a matching
    /// predicate-set either no-ops (identical schema) or merges schemas
    /// (differing schema), otherwise a fresh fragment is appended.
    pub fn create_fragment(
        &mut self,
        logical_schema: TableSchema,
        fragment_schema: TableSchema,
        projected_column_ids: Vec<usize>,
        predicates: Vec<Predicate>,
    ) -> Result<(), CoreError> {
        let table_name = logical_schema.table_name.clone();
        let table_fragments = self.fragments.entry(table_name.clone()).or_default();

        for frag in table_fragments.iter_mut() {
            if Fragment::unordered_predicate_eq(&frag.predicates, &predicates) {
                if frag.fragment_schema == fragment_schema {
                    return Ok(());
                }
                let (merged, ok_list) = frag.fragment_schema.merge(&fragment_schema);
                frag.fragment_schema = merged;
                for (i, ok) in ok_list.iter().enumerate() {
                    if *ok {
                        frag.projected_column_ids.push(projected_column_ids[i]);
                    }
                }
                return Ok(());
            }
        }

        let ordinal = table_fragments.len();
        table_fragments.push(Fragment {
            table_name,
            ordinal,
            fragment_schema,
            projected_column_ids,
            predicates,
            logical_schema,
            rows: RowStore::new(),
        });
        Ok(())
    }

    /// Project `row` into every admitted fragment of `table_name`,
    /// appending `row_id` as the trailing cell. A predicate-evaluation
    /// error aborts this single insert (the caller's enclosing broadcast
    /// is unaffected; see coordinator::Coordinator::fragment_write).
    pub fn insert(&mut self, table_name: &str, row: &Row, row_id: i64) -> Result<(), CoreError> {
        let fragments = self
            .fragments
            .get_mut(table_name)
            .ok_or_else(|| CoreError::UnknownTable(table_name.to_string()))?;

        for frag in fragments.iter_mut() {
            if frag.predicate_check(row)? {
                let mut projected: Row = frag
                    .projected_column_ids
                    .iter()
                    .map(|&id| row[id].clone())
                    .collect();
                projected.push(Value::Int64(row_id));
                frag.rows.append(projected);
            }
        }
        Ok(())
    }

    /// One `Dataset` per fragment of `table_name`; for each, emit exactly
    /// one row per requested row-id, in requested order, skipping ids not
    /// present in that fragment.
    pub fn scan_by_row_ids(&self, table_name: &str, row_ids: &[i64]) -> Result<Vec<Dataset>, CoreError> {
        let fragments = self
            .fragments
            .get(table_name)
            .ok_or_else(|| CoreError::UnknownTable(table_name.to_string()))?;

        let mut out = Vec::with_capacity(fragments.len());
        for frag in fragments {
            let mut index: HashMap<i64, &Row> = HashMap::new();
            for row in frag.rows.iter() {
                let rid = row.last().expect("fragment rows always carry a trailing row-id").as_i64()?;
                index.insert(rid, row);
            }
            let rows: Vec<Row> = row_ids
                .iter()
                .filter_map(|id| index.get(id).map(|r| (*r).clone()))
                .collect();
            out.push(Dataset::new(frag.fragment_schema.clone(), rows));
        }
        Ok(out)
    }

    /// One `Dataset` per fragment of `requested_schema.table_name`. For
    /// each fragment, emit nothing if the column intersection is empty;
    /// otherwise project stored rows to the intersecting columns and keep
    /// the original trailing row-id.
    pub fn scan_by_schema(&self, requested_schema: &TableSchema) -> Result<Vec<Dataset>, CoreError> {
        let fragments = self
            .fragments
            .get(&requested_schema.table_name)
            .ok_or_else(|| CoreError::UnknownTable(requested_schema.table_name.clone()))?;

        let mut out = Vec::new();
        for frag in fragments {
            let ids: Vec<usize> = frag
                .fragment_schema
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| requested_schema.columns.contains(c))
                .map(|(i, _)| i)
                .collect();
            if ids.is_empty() {
                continue;
            }
            let schema = frag.fragment_schema.sub(&ids);
            let rows: Vec<Row> = frag
                .rows
                .iter()
                .map(|row| {
                    let mut out_row: Row = ids.iter().map(|&i| row[i].clone()).collect();
                    out_row.push(row.last().expect("fragment rows always carry a trailing row-id").clone());
                    out_row
                })
                .collect();
            out.push(Dataset::new(schema, rows));
        }
        Ok(out)
    }

    /// Diagnostic-only: all admitted rows of the *first* fragment of
    /// `table_name`, in insertion order, with the row-id cell stripped.
    pub fn scan_all(&self, table_name: &str) -> Result<Dataset, CoreError> {
        let fragments = self
            .fragments
            .get(table_name)
            .ok_or_else(|| CoreError::UnknownTable(table_name.to_string()))?;
        let frag = fragments
            .first()
            .ok_or_else(|| CoreError::UnknownTable(format!("{}-0", table_name)))?;
        let rows: Vec<Row> = frag
            .rows
            .iter()
            .map(|row| row[..row.len() - 1].to_vec())
            .collect();
        Ok(Dataset::new(frag.fragment_schema.clone(), rows))
    }

    pub fn fragment_count(&self, table_name: &str) -> usize {
        self.fragments.get(table_name).map(Vec::len).unwrap_or(0)
    }
}
