//! Dynamically-typed cell values and the cross-type coercion rules that let
//! a column declared under one datatype accept a literal stored under
//! another. See `schema::DataType` for the six declared column types that
//! values are coerced *into*.

use crate::error::CoreError;
use crate::schema::DataType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell. At rest a `Value` carries exactly one of the six shapes
/// below; which shape a *column* expects is carried separately by its
/// `DataType`, and readout always goes through one of the `as_*` coercions
/// rather than a direct variant match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn as_i32(&self) -> Result<i32, CoreError> {
        match self {
            Value::Int32(v) => Ok(*v),
            Value::Int64(v) => Ok(*v as i32),
            Value::Float32(v) => Ok(*v as i32),
            Value::Float64(v) => Ok(*v as i32),
            Value::Bool(v) => Ok(if *v { 1 } else { 0 }),
            Value::String(s) => s
                .parse::<i32>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i32))
                .map_err(|_| CoreError::Coercion(format!("cannot parse {:?} as int32", s))),
        }
    }

    pub fn as_i64(&self) -> Result<i64, CoreError> {
        match self {
            Value::Int32(v) => Ok(*v as i64),
            Value::Int64(v) => Ok(*v),
            Value::Float32(v) => Ok(*v as i64),
            Value::Float64(v) => Ok(*v as i64),
            Value::Bool(v) => Ok(if *v { 1 } else { 0 }),
            Value::String(s) => s
                .parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .map_err(|_| CoreError::Coercion(format!("cannot parse {:?} as int64", s))),
        }
    }

    pub fn as_f32(&self) -> Result<f32, CoreError> {
        match self {
            Value::Int32(v) => Ok(*v as f32),
            Value::Int64(v) => Ok(*v as f32),
            Value::Float32(v) => Ok(*v),
            Value::Float64(v) => Ok(*v as f32),
            Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Value::String(s) => s
                .parse::<f32>()
                .map_err(|_| CoreError::Coercion(format!("cannot parse {:?} as float32", s))),
        }
    }

    pub fn as_f64(&self) -> Result<f64, CoreError> {
        match self {
            Value::Int32(v) => Ok(*v as f64),
            Value::Int64(v) => Ok(*v as f64),
            Value::Float32(v) => Ok(*v as f64),
            Value::Float64(v) => Ok(*v),
            Value::Bool(v) => Ok(if *v { 1.0 } else { 0.0 }),
            Value::String(s) => s
                .parse::<f64>()
                .map_err(|_| CoreError::Coercion(format!("cannot parse {:?} as float64", s))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, CoreError> {
        match self {
            Value::Int32(v) => Ok(*v != 0),
            Value::Int64(v) => Ok(*v != 0),
            Value::Float32(v) => Ok(*v != 0.0),
            Value::Float64(v) => Ok(*v != 0.0),
            Value::Bool(v) => Ok(*v),
            Value::String(s) => match s.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                other => Err(CoreError::Coercion(format!(
                    "cannot parse {:?} as bool",
                    other
                ))),
            },
        }
    }

    /// Standard decimal for integers, scientific (`E` format, full
    /// precision) for floats, `"true"`/`"false"` for bool.
    pub fn as_string(&self) -> Result<String, CoreError> {
        match self {
            Value::Int32(v) => Ok(v.to_string()),
            Value::Int64(v) => Ok(v.to_string()),
            Value::Float32(v) => Ok(format!("{:E}", v)),
            Value::Float64(v) => Ok(format!("{:E}", v)),
            Value::Bool(v) => Ok(v.to_string()),
            Value::String(s) => Ok(s.clone()),
        }
    }

    /// Coerce this value into the canonical `Value` shape of `dt`.
    pub fn coerce_to(&self, dt: DataType) -> Result<Value, CoreError> {
        Ok(match dt {
            DataType::Int32 => Value::Int32(self.as_i32()?),
            DataType::Int64 => Value::Int64(self.as_i64()?),
            DataType::Float32 => Value::Float32(self.as_f32()?),
            DataType::Float64 => Value::Float64(self.as_f64()?),
            DataType::Bool => Value::Bool(self.as_bool()?),
            DataType::String => Value::String(self.as_string()?),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_string() {
            Ok(s) => write!(f, "{}", s),
            Err(_) => write!(f, "<unrepresentable>"),
        }
    }
}
