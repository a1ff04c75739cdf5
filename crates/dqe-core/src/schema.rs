//! Schema algebra: column lookup, subset projection, subset-equality,
//! common-column discovery and schema merge.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer tags for the six column datatypes; the wire protocol
/// preserves these values verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DataType {
    Int32 = 0,
    Int64 = 1,
    Float32 = 2,
    Float64 = 3,
    Bool = 4,
    String = 5,
}

impl DataType {
    pub fn tag(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for DataType {
    type Error = CoreError;

    fn try_from(tag: i32) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(DataType::Int32),
            1 => Ok(DataType::Int64),
            2 => Ok(DataType::Float32),
            3 => Ok(DataType::Float64),
            4 => Ok(DataType::Bool),
            5 => Ok(DataType::String),
            _ => Err(CoreError::UnknownDataType),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Bool => "bool",
            DataType::String => "string",
        };
        write!(f, "{}", s)
    }
}

impl Serialize for DataType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.tag())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = i32::deserialize(deserializer)?;
        DataType::try_from(tag).map_err(serde::de::Error::custom)
    }
}

/// `(name, datatype)`. Two column schemas are equal iff both match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// `(tableName, [ColumnSchema...])`. Column names are unique within a
/// schema by name alone; this invariant is enforced at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, columns: Vec<ColumnSchema>) -> Result<Self, CoreError> {
        let mut seen = std::collections::HashSet::new();
        for c in &columns {
            if !seen.insert(c.name.as_str()) {
                return Err(CoreError::DuplicateColumn(c.name.clone()));
            }
        }
        Ok(Self {
            table_name: table_name.into(),
            columns,
        })
    }

    /// Column index by name, or `-1` if absent (mirrors the source's sentinel).
    pub fn column_id(&self, name: &str) -> i64 {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(|i| i as i64)
            .unwrap_or(-1)
    }

    /// Declared datatype of `name`, or `Err` if the column is absent.
    pub fn data_type(&self, name: &str) -> Result<DataType, CoreError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.data_type)
            .ok_or_else(|| CoreError::UnknownColumn(name.to_string()))
    }

    /// `self ⊑ other`: every column of `self` appears in `other`.
    pub fn is_subset_of(&self, other: &TableSchema) -> bool {
        self.columns.iter().all(|c| other.columns.contains(c))
    }

    /// Common columns by `(name, datatype)` equality, in `self`'s
    /// declaration order. Returns the matching column ids on each side;
    /// empty when the two schemas share nothing.
    pub fn foreign_keys(&self, other: &TableSchema) -> (Vec<usize>, Vec<usize>) {
        let mut left_ids = Vec::new();
        let mut right_ids = Vec::new();
        for (i, lc) in self.columns.iter().enumerate() {
            if let Some(j) = other.columns.iter().position(|rc| rc == lc) {
                left_ids.push(i);
                right_ids.push(j);
            }
        }
        (left_ids, right_ids)
    }

    /// Select columns by index, preserving `self.table_name`.
    pub fn sub(&self, ids: &[usize]) -> TableSchema {
        TableSchema {
            table_name: self.table_name.clone(),
            columns: ids.iter().map(|&i| self.columns[i].clone()).collect(),
        }
    }

    /// `merge(A, B) -> (C, okList)`: `C` is `A` followed by the columns of
    /// `B` not already present in `A` (by full column-schema equality);
    /// `okList[i]` is true iff `B`'s i-th column contributed a new column.
    pub fn merge(&self, other: &TableSchema) -> (TableSchema, Vec<bool>) {
        let mut columns = self.columns.clone();
        let mut ok_list = Vec::with_capacity(other.columns.len());
        for c in &other.columns {
            if columns.contains(c) {
                ok_list.push(false);
            } else {
                columns.push(c.clone());
                ok_list.push(true);
            }
        }
        (
            TableSchema {
                table_name: self.table_name.clone(),
                columns,
            },
            ok_list,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(cols: &[(&str, DataType)]) -> TableSchema {
        TableSchema::new(
            "t",
            cols.iter()
                .map(|(n, dt)| ColumnSchema::new(*n, *dt))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_column_names_rejected() {
        let err = TableSchema::new(
            "t",
            vec![
                ColumnSchema::new("a", DataType::Int32),
                ColumnSchema::new("a", DataType::String),
            ],
        );
        assert!(err.is_err());
    }

    #[test]
    fn column_id_and_data_type() {
        let s = schema(&[("sid", DataType::Int32), ("sname", DataType::String)]);
        assert_eq!(s.column_id("sname"), 1);
        assert_eq!(s.column_id("missing"), -1);
        assert_eq!(s.data_type("sid").unwrap(), DataType::Int32);
        assert!(s.data_type("missing").is_err());
    }

    #[test]
    fn subset_equality() {
        let full = schema(&[
            ("sid", DataType::Int32),
            ("sname", DataType::String),
            ("age", DataType::Int32),
        ]);
        let part = schema(&[("sid", DataType::Int32), ("sname", DataType::String)]);
        assert!(part.is_subset_of(&full));
        assert!(!full.is_subset_of(&part));
    }

    #[test]
    fn foreign_keys_requires_name_and_datatype_match() {
        let st = schema(&[
            ("sid", DataType::Int32),
            ("tid", DataType::Int32),
            ("sname", DataType::String),
        ]);
        let ts = schema(&[
            ("sid", DataType::Int32),
            ("tid", DataType::Int32),
            ("tname", DataType::String),
        ]);
        let (left, right) = st.foreign_keys(&ts);
        assert_eq!(left, vec![0, 1]);
        assert_eq!(right, vec![0, 1]);
    }

    #[test]
    fn foreign_keys_name_match_wrong_datatype_is_not_a_key() {
        let a = schema(&[("id", DataType::Int32)]);
        let b = schema(&[("id", DataType::String)]);
        let (left, right) = a.foreign_keys(&b);
        assert!(left.is_empty());
        assert!(right.is_empty());
    }

    #[test]
    fn merge_appends_only_new_columns() {
        let a = schema(&[("sid", DataType::Int32), ("name", DataType::String)]);
        let b = schema(&[("name", DataType::String), ("age", DataType::Int32)]);
        let (merged, ok) = a.merge(&b);
        assert_eq!(
            merged.columns.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            vec!["sid", "name", "age"]
        );
        assert_eq!(ok, vec![false, true]);
    }

    #[test]
    fn datatype_tag_roundtrip() {
        for dt in [
            DataType::Int32,
            DataType::Int64,
            DataType::Float32,
            DataType::Float64,
            DataType::Bool,
            DataType::String,
        ] {
            assert_eq!(DataType::try_from(dt.tag()).unwrap(), dt);
        }
        assert!(DataType::try_from(99).is_err());
    }
}
