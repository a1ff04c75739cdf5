//! Partition-plan JSON parsing and validation (§6.2 of the specification).
//!
//! A partition plan is a JSON object whose keys are pipe-separated node
//! ordinals (`"0"`, `"0|1"`) and whose values name the fragment's declared
//! column order and its conjunctive predicate set. This crate only turns
//! the wire bytes into `dqe_core::coordinator::PartitionPlan`; column-name
//! and node-ordinal validation against a table's logical schema is
//! `Coordinator::build_table`'s job (it needs the logical schema, which
//! this crate never sees).

use std::collections::HashMap;

use dqe_core::{FragmentRule, PartitionPlan, PredicateOp, RawPredicate, Value};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("malformed partition plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed node spec {0:?}: node ordinals must be decimal integers separated by '|'")]
    NodeSpec(String),

    #[error("unsupported literal value in predicate: {0}")]
    Literal(String),
}

#[derive(Debug, Deserialize)]
struct WirePredicateClause {
    op: PredicateOp,
    val: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireFragmentRule {
    column: Vec<String>,
    #[serde(default)]
    predicate: HashMap<String, Vec<WirePredicateClause>>,
}

type WirePlan = HashMap<String, WireFragmentRule>;

/// Parse partition-plan JSON bytes into `dqe_core`'s domain representation.
pub fn parse(bytes: &[u8]) -> Result<PartitionPlan, PlanError> {
    let wire: WirePlan = serde_json::from_slice(bytes)?;
    let mut plan = Vec::with_capacity(wire.len());

    for (node_spec, rule) in wire {
        let node_ordinals = parse_node_spec(&node_spec)?;

        let mut predicates = Vec::new();
        for (column_name, clauses) in rule.predicate {
            for clause in clauses {
                predicates.push(RawPredicate {
                    column_name: column_name.clone(),
                    op: clause.op,
                    value: json_to_value(&clause.val)?,
                });
            }
        }

        plan.push(FragmentRule {
            node_ordinals,
            columns: rule.column,
            predicates,
        });
    }

    Ok(plan)
}

fn parse_node_spec(spec: &str) -> Result<Vec<usize>, PlanError> {
    spec.split('|')
        .map(|part| part.trim().parse::<usize>().map_err(|_| PlanError::NodeSpec(spec.to_string())))
        .collect()
}

/// Literal JSON values map onto the six `Value` shapes: whole numbers to
/// `Int64`, fractional numbers to `Float64`, and `bool`/`string` directly.
fn json_to_value(v: &serde_json::Value) -> Result<Value, PlanError> {
    match v {
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int64(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float64(f))
            } else {
                Err(PlanError::Literal(n.to_string()))
            }
        }
        other => Err(PlanError::Literal(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_node_fragment_with_one_predicate() {
        let json = br#"{
            "0": {
                "column": ["object_id", "object_name", "sale_price", "on_sale"],
                "predicate": { "on_sale": [{"op": "==", "val": true}] }
            }
        }"#;
        let plan = parse(json).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].node_ordinals, vec![0]);
        assert_eq!(plan[0].columns.len(), 4);
        assert_eq!(plan[0].predicates.len(), 1);
        assert_eq!(plan[0].predicates[0].column_name, "on_sale");
        assert_eq!(plan[0].predicates[0].op, PredicateOp::Eq);
        assert_eq!(plan[0].predicates[0].value, Value::Bool(true));
    }

    #[test]
    fn pipe_separated_node_spec_shares_one_rule_across_nodes() {
        let json = br#"{
            "0|1": { "column": ["sid", "name"], "predicate": {} }
        }"#;
        let plan = parse(json).unwrap();
        assert_eq!(plan[0].node_ordinals, vec![0, 1]);
    }

    #[test]
    fn multiple_predicates_on_one_column_conjoin() {
        let json = br#"{
            "0": {
                "column": ["sale_price"],
                "predicate": {
                    "sale_price": [
                        {"op": ">", "val": 2000},
                        {"op": "<=", "val": 5000}
                    ]
                }
            }
        }"#;
        let plan = parse(json).unwrap();
        assert_eq!(plan[0].predicates.len(), 2);
    }

    #[test]
    fn numeric_literal_without_fraction_is_int64() {
        let json = br#"{"0": {"column": ["a"], "predicate": {"a": [{"op": "==", "val": 5}]}}}"#;
        let plan = parse(json).unwrap();
        assert_eq!(plan[0].predicates[0].value, Value::Int64(5));
    }

    #[test]
    fn fractional_literal_is_float64() {
        let json = br#"{"0": {"column": ["a"], "predicate": {"a": [{"op": "==", "val": 3.5}]}}}"#;
        let plan = parse(json).unwrap();
        assert_eq!(plan[0].predicates[0].value, Value::Float64(3.5));
    }

    #[test]
    fn malformed_node_spec_errors() {
        let json = br#"{"0|x": {"column": ["a"], "predicate": {}}}"#;
        assert!(matches!(parse(json), Err(PlanError::NodeSpec(_))));
    }

    #[test]
    fn invalid_json_errors() {
        assert!(matches!(parse(b"not json"), Err(PlanError::Json(_))));
    }
}
