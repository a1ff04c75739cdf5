//! Dataset algebra: the glue that reassembles partial, per-fragment scan
//! results (and per-table join intermediates) into wider relations.
//!
//! Every `Dataset` row carries a trailing row-id cell, exactly like a
//! stored fragment row; `schema` never names that trailing column. Per
//! the binding decision recorded in SPEC_FULL.md §9.1, the trailing cell
//! is always a **row-id value**, looked up by value (never by positional
//! index) when a `Dataset` needs to select a subset of its own rows.

use crate::error::CoreError;
use crate::row_store::Row;
use crate::schema::TableSchema;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub schema: TableSchema,
    pub rows: Vec<Row>,
}

impl Dataset {
    pub fn new(schema: TableSchema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn empty(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    fn row_id_of(row: &Row) -> Result<i64, CoreError> {
        row.last()
            .ok_or_else(|| CoreError::Coercion("row has no row-id cell".to_string()))?
            .as_i64()
    }

    /// Project to `ids` (against `self.schema`), tagging each output row
    /// with `i`, its position within *this* dataset, as the new row-id.
    pub fn sub_column(&self, ids: &[usize]) -> Dataset {
        let schema = self.schema.sub(ids);
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut out: Row = ids.iter().map(|&id| row[id].clone()).collect();
                out.push(Value::Int64(i as i64));
                out
            })
            .collect();
        Dataset { schema, rows }
    }

    /// Select rows by **row-id value**, in the order the ids are given,
    /// dropping ids not present in this dataset. Used when the ids being
    /// resolved are genuine external row-ids (node-fetched fragment/table
    /// data) — never for indexing into the join planner's own `cache`,
    /// see `sub_row_by_index`.
    pub fn sub_row_by_row_id(&self, row_ids: &[i64]) -> Result<Dataset, CoreError> {
        let mut index: HashMap<i64, &Row> = HashMap::new();
        for row in &self.rows {
            index.insert(Self::row_id_of(row)?, row);
        }
        let rows = row_ids
            .iter()
            .filter_map(|id| index.get(id).map(|r| (*r).clone()))
            .collect();
        Ok(Dataset {
            schema: self.schema.clone(),
            rows,
        })
    }

    /// Select rows by **position**, in the order the positions are given,
    /// dropping out-of-range positions. `sub_column` tags its output rows
    /// with their position within `self`, not a preserved row-id value
    /// (§4.8, verbatim); any later step that matches against a
    /// `sub_column`-derived key dataset (the join planner's `cache`, see
    /// `coordinator::join`) must re-select by that same position
    /// convention, not by `sub_row_by_row_id`'s value lookup — `cache`'s
    /// own trailing cell is a carried-over row-id from the left-most
    /// table and can repeat across rows once a step produces a
    /// one-to-many match, which breaks a by-value lookup (SPEC_FULL.md
    /// §9.1).
    pub fn sub_row_by_index(&self, positions: &[i64]) -> Dataset {
        let rows = positions
            .iter()
            .filter_map(|&i| usize::try_from(i).ok())
            .filter_map(|i| self.rows.get(i).cloned())
            .collect();
        Dataset {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Align `other`'s rows to `self` by row-id equality and append
    /// `other`'s new columns (per `schema.merge`'s `okList`). Both
    /// datasets must be row-id-ascending for the single-cursor walk to be
    /// correct (see SPEC_FULL.md §9.2); if any `self` row fails to find a
    /// mate, the whole merge reverts to `self`'s original schema/rows
    /// (partial-merge rejection).
    pub fn merge(&self, other: &Dataset) -> Result<Dataset, CoreError> {
        let (merged_schema, ok_list) = self.schema.merge(&other.schema);
        let new_col_ids: Vec<usize> = ok_list
            .iter()
            .enumerate()
            .filter(|(_, ok)| **ok)
            .map(|(i, _)| i)
            .collect();

        if new_col_ids.is_empty() {
            return Ok(self.clone());
        }

        let mut other_cursor = 0usize;
        let mut out_rows = Vec::with_capacity(self.rows.len());
        let mut complete = true;

        for row in &self.rows {
            let row_id = Self::row_id_of(row)?;
            while other_cursor < other.rows.len()
                && Self::row_id_of(&other.rows[other_cursor])? < row_id
            {
                other_cursor += 1;
            }
            if other_cursor < other.rows.len()
                && Self::row_id_of(&other.rows[other_cursor])? == row_id
            {
                let mate = &other.rows[other_cursor];
                let mut new_row = row[..row.len() - 1].to_vec();
                for &id in &new_col_ids {
                    new_row.push(mate[id].clone());
                }
                new_row.push(Value::Int64(row_id));
                out_rows.push(new_row);
            } else {
                complete = false;
                break;
            }
        }

        if !complete {
            return Ok(self.clone());
        }

        Ok(Dataset {
            schema: merged_schema,
            rows: out_rows,
        })
    }

    /// Positional column-append: `other`'s new columns are appended to
    /// `self`'s row at the same index (row-i <-> row-i). Used to combine
    /// the matched left/right sides of a semi-join into a wider row.
    pub fn union(&self, other: &Dataset) -> Result<Dataset, CoreError> {
        if self.rows.len() != other.rows.len() {
            return Err(CoreError::Coercion(format!(
                "union requires equal row counts: {} vs {}",
                self.rows.len(),
                other.rows.len()
            )));
        }
        let (merged_schema, ok_list) = self.schema.merge(&other.schema);
        let new_col_ids: Vec<usize> = ok_list
            .iter()
            .enumerate()
            .filter(|(_, ok)| **ok)
            .map(|(i, _)| i)
            .collect();

        let rows = self
            .rows
            .iter()
            .zip(other.rows.iter())
            .map(|(lrow, rrow)| {
                let row_id = lrow[lrow.len() - 1].clone();
                let mut out = lrow[..lrow.len() - 1].to_vec();
                for &id in &new_col_ids {
                    out.push(rrow[id].clone());
                }
                out.push(row_id);
                out
            })
            .collect();

        Ok(Dataset {
            schema: merged_schema,
            rows,
        })
    }

    /// Reorder columns in place so `self.schema.columns` matches
    /// `target.columns`'s order; the trailing row-id cell is preserved.
    /// No-op if already aligned.
    pub fn change_schema(&mut self, target: &TableSchema) {
        if self.schema.columns == target.columns {
            return;
        }
        let perm: Vec<usize> = target
            .columns
            .iter()
            .map(|tc| {
                self.schema
                    .columns
                    .iter()
                    .position(|c| c == tc)
                    .expect("change_schema target must be a permutation of self.schema")
            })
            .collect();

        for row in &mut self.rows {
            let row_id = row[row.len() - 1].clone();
            let reordered: Row = perm.iter().map(|&i| row[i].clone()).collect();
            *row = reordered;
            row.push(row_id);
        }
        self.schema = target.clone();
    }

    /// Stable sort by trailing row-id ascending, then drop consecutive
    /// duplicate row-ids (keep the first occurrence).
    pub fn sort_rows(&mut self) -> Result<(), CoreError> {
        let mut tagged: Vec<(i64, Row)> = self
            .rows
            .drain(..)
            .map(|r| Ok((Self::row_id_of(&r)?, r)))
            .collect::<Result<_, CoreError>>()?;
        tagged.sort_by_key(|(id, _)| *id);
        tagged.dedup_by_key(|(id, _)| *id);
        self.rows = tagged.into_iter().map(|(_, r)| r).collect();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reconcile `ScanByRowIds` fan-out without disturbing row order.
///
/// `ScanByRowIds` must preserve the caller's requested row-id order
/// (duplicates included) — the semi-join step zips two such reconciled
/// datasets positionally in `union`, so row *i* of the left result must
/// correspond to the same match pair as row *i* of the right result. The
/// generic `reconcile` above sorts inputs before merging and would
/// silently reorder the result, so row-id materialization uses this
/// column-source gather instead (SPEC_FULL.md §9.2's "hash-join on
/// row-id" resolution): for each target column, find the first fragment
/// dataset that declares it, then for each requested row-id pull the
/// cell from that dataset's row-id index. A row missing any target
/// column is dropped, mirroring "drop if still incomplete".
pub fn gather_by_row_ids(
    datasets: &[Dataset],
    target: &TableSchema,
    row_ids: &[i64],
) -> Result<Dataset, CoreError> {
    let mut sources: Vec<Option<(usize, usize)>> = vec![None; target.columns.len()];
    for (ti, tc) in target.columns.iter().enumerate() {
        for (di, d) in datasets.iter().enumerate() {
            if let Some(ci) = d.schema.columns.iter().position(|c| c == tc) {
                sources[ti] = Some((di, ci));
                break;
            }
        }
    }

    let indices: Vec<HashMap<i64, &Row>> = datasets
        .iter()
        .map(|d| {
            let mut m = HashMap::new();
            for row in &d.rows {
                m.insert(Dataset::row_id_of(row)?, row);
            }
            Ok(m)
        })
        .collect::<Result<_, CoreError>>()?;

    let mut out_rows = Vec::with_capacity(row_ids.len());
    'ids: for &rid in row_ids {
        let mut row = Vec::with_capacity(target.columns.len() + 1);
        for src in &sources {
            let (di, ci) = match src {
                Some(s) => *s,
                None => continue 'ids,
            };
            match indices[di].get(&rid) {
                Some(r) => row.push(r[ci].clone()),
                None => continue 'ids,
            }
        }
        row.push(Value::Int64(rid));
        out_rows.push(row);
    }

    Ok(Dataset::new(target.clone(), out_rows))
}

/// Reconciliation of multi-fragment scans, used after every
/// `ScanBySchema`/`ScanByRowIds` fan-out. Every fragment's dataset whose
/// column count already matches `target` contributes its rows as-is
/// (the horizontally-partitioned case: each fragment already carries the
/// full schema, just a disjoint row subset). Every fragment that falls
/// short is merged forward with the fragments after it (the
/// vertically-partitioned case) until its column count reaches
/// `target`'s, then `change_schema`d into `target`'s column order and its
/// rows contributed too. A fragment that never completes contributes
/// nothing. All contributed rows are combined and `sort_rows`-deduped at
/// the end, so no node's rows are silently dropped.
pub fn reconcile(mut datasets: Vec<Dataset>, target: &TableSchema) -> Result<Option<Dataset>, CoreError> {
    if datasets.is_empty() {
        return Ok(None);
    }
    for d in &mut datasets {
        d.sort_rows()?;
    }

    let mut out_rows = Vec::new();
    for i in 0..datasets.len() {
        if datasets[i].schema.columns.len() == target.columns.len() {
            out_rows.extend(datasets[i].rows.iter().cloned());
            continue;
        }
        let mut candidate = datasets[i].clone();
        for other in datasets.iter().skip(i + 1) {
            candidate = candidate.merge(other)?;
        }
        if candidate.schema.columns.len() == target.columns.len() {
            candidate.change_schema(target);
            out_rows.extend(candidate.rows);
        }
    }

    if out_rows.is_empty() {
        return Ok(None);
    }
    let mut result = Dataset::new(target.clone(), out_rows);
    result.sort_rows()?;
    Ok(Some(result))
}
