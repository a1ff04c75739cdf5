//! Predicate representation and typed evaluation against a row cell.

use crate::error::CoreError;
use crate::schema::DataType;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

/// `(columnName, operator, datatype, literalValue)`. `datatype` is the
/// logical column's declared type; `value` is coerced to it on evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column_name: String,
    pub op: PredicateOp,
    pub data_type: DataType,
    pub value: Value,
}

impl Predicate {
    pub fn new(column_name: impl Into<String>, op: PredicateOp, data_type: DataType, value: Value) -> Self {
        Self {
            column_name: column_name.into(),
            op,
            data_type,
            value,
        }
    }

    /// Evaluate `row_cell op literal` under this predicate's datatype.
    /// Boolean columns only support `==`/`!=`; the ordering operators
    /// always reject (their "less" outcome is forced false).
    pub fn evaluate(&self, row_cell: &Value) -> Result<bool, CoreError> {
        if self.data_type == DataType::Bool {
            let lhs = row_cell.as_bool()?;
            let rhs = self.value.as_bool()?;
            return Ok(match self.op {
                PredicateOp::Eq => lhs == rhs,
                PredicateOp::Ne => lhs != rhs,
                _ => false,
            });
        }

        let ordering = compare(row_cell, &self.value, self.data_type)?;
        Ok(match self.op {
            PredicateOp::Lt => ordering == Ordering::Less,
            PredicateOp::Le => ordering != Ordering::Greater,
            PredicateOp::Eq => ordering == Ordering::Equal,
            PredicateOp::Ne => ordering != Ordering::Equal,
            PredicateOp::Gt => ordering == Ordering::Greater,
            PredicateOp::Ge => ordering != Ordering::Less,
        })
    }
}

fn compare(lhs: &Value, rhs: &Value, dt: DataType) -> Result<Ordering, CoreError> {
    Ok(match dt {
        DataType::Int32 => lhs.as_i32()?.cmp(&rhs.as_i32()?),
        DataType::Int64 => lhs.as_i64()?.cmp(&rhs.as_i64()?),
        DataType::Float32 => lhs
            .as_f32()?
            .partial_cmp(&rhs.as_f32()?)
            .ok_or_else(|| CoreError::Coercion("NaN is not orderable".to_string()))?,
        DataType::Float64 => lhs
            .as_f64()?
            .partial_cmp(&rhs.as_f64()?)
            .ok_or_else(|| CoreError::Coercion("NaN is not orderable".to_string()))?,
        DataType::Bool => unreachable!("bool handled by evaluate()"),
        DataType::String => lhs.as_string()?.cmp(&rhs.as_string()?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_equality_operators_work() {
        let p = Predicate::new("on_sale", PredicateOp::Ne, DataType::Bool, Value::Bool(false));
        assert!(p.evaluate(&Value::Int32(1)).unwrap());
    }

    #[test]
    fn bool_ordering_operators_always_reject() {
        let p = Predicate::new("on_sale", PredicateOp::Gt, DataType::Bool, Value::Bool(false));
        assert!(!p.evaluate(&Value::Bool(true)).unwrap());
    }

    #[test]
    fn numeric_range_under_double_coercion() {
        let gt = Predicate::new("sale_price", PredicateOp::Gt, DataType::Float64, Value::Float64(2000.0));
        let le = Predicate::new("sale_price", PredicateOp::Le, DataType::Float64, Value::Float64(5000.0));
        let cell = Value::String("3000".to_string());
        assert!(gt.evaluate(&cell).unwrap());
        assert!(le.evaluate(&cell).unwrap());
    }

    #[test]
    fn string_comparison_is_lexicographic() {
        let p = Predicate::new("name", PredicateOp::Lt, DataType::String, Value::String("m".to_string()));
        assert!(p.evaluate(&Value::String("albumen".to_string())).unwrap());
        assert!(!p.evaluate(&Value::String("zebra".to_string())).unwrap());
    }
}
