//! Copyright © 2026 The Glance Authors. All Rights Reserved.
//!
//! This file is part of Glance.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Tree-walking interpreter for the expression AST.
//!
//! Evaluation is dynamically typed over `serde_json::Value` with a
//! small, documented set of coercions:
//!
//! - arithmetic coerces via [`to_number`] and errors on non-coercible
//!   operands (callers map the error to `null`/`false` per policy)
//! - equality compares numbers numerically and everything else
//!   strictly; mixed types are never equal
//! - the textual string operators compare case-sensitively on
//!   [`to_display_string`] renderings; a missing field renders as ""
//! - aggregate helpers coerce non-numeric entries to 0 rather than
//!   erroring, per their contract

use serde_json::{Number, Value};

use crate::errors::{GlError, Result};
use crate::expr::ast::{GlBinaryOp, GlExpr, GlFunc, GlUnaryOp};
use crate::paths::resolve_flat;
use crate::record::GlColumns;

/// Numeric coercion: numbers as themselves, booleans as 0/1, numeric
/// strings parsed. Everything else is not a number.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn number_or_zero(value: &Value) -> f64 {
    to_number(value).unwrap_or(0.0)
}

/// String rendering used by the textual operators and free-text search.
///
/// Null renders empty, arrays join their rendered elements with `", "`,
/// objects fall back to compact JSON.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Truthiness: null and absent are false, zero and NaN are false, the
/// empty string is false, arrays and objects are always true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0 && !n.is_nan()).unwrap_or(false),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Evaluates an expression against one row's columns.
///
/// Field references resolve through the dotted-path accessor; a missing
/// field yields `null` and flows through the coercions above. Errors
/// are returned, never panicked; the calculated-field and logic layers
/// decide what a failed row degrades to.
pub fn eval_expr(expr: &GlExpr, columns: &GlColumns) -> Result<Value> {
    match expr {
        GlExpr::Null => Ok(Value::Null),
        GlExpr::Bool(flag) => Ok(Value::Bool(*flag)),
        GlExpr::Number(value) => Ok(finite_number(*value)?),
        GlExpr::Str(text) => Ok(Value::String(text.clone())),
        GlExpr::Field(path) => Ok(resolve_flat(columns, path).cloned().unwrap_or(Value::Null)),
        GlExpr::Unary { op, operand } => eval_unary(*op, operand, columns),
        GlExpr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, columns),
        GlExpr::Call { func, args } => eval_call(*func, args, columns),
    }
}

fn eval_unary(op: GlUnaryOp, operand: &GlExpr, columns: &GlColumns) -> Result<Value> {
    match op {
        GlUnaryOp::Not => {
            let value = eval_expr(operand, columns)?;
            Ok(Value::Bool(!is_truthy(&value)))
        }
        GlUnaryOp::Neg => {
            let value = eval_expr(operand, columns)?;
            let number = to_number(&value)
                .ok_or_else(|| GlError::internal("cannot negate a non-numeric value"))?;
            finite_number(-number)
        }
    }
}

fn eval_binary(op: GlBinaryOp, lhs: &GlExpr, rhs: &GlExpr, columns: &GlColumns) -> Result<Value> {
    match op {
        GlBinaryOp::And => {
            let left = eval_expr(lhs, columns)?;
            if !is_truthy(&left) {
                return Ok(Value::Bool(false));
            }
            let right = eval_expr(rhs, columns)?;
            Ok(Value::Bool(is_truthy(&right)))
        }
        GlBinaryOp::Or => {
            let left = eval_expr(lhs, columns)?;
            if is_truthy(&left) {
                return Ok(Value::Bool(true));
            }
            let right = eval_expr(rhs, columns)?;
            Ok(Value::Bool(is_truthy(&right)))
        }
        GlBinaryOp::Add | GlBinaryOp::Sub | GlBinaryOp::Mul | GlBinaryOp::Div | GlBinaryOp::Rem => {
            let left = eval_expr(lhs, columns)?;
            let right = eval_expr(rhs, columns)?;
            let a = to_number(&left)
                .ok_or_else(|| GlError::internal("left operand is not numeric"))?;
            let b = to_number(&right)
                .ok_or_else(|| GlError::internal("right operand is not numeric"))?;
            let result = match op {
                GlBinaryOp::Add => a + b,
                GlBinaryOp::Sub => a - b,
                GlBinaryOp::Mul => a * b,
                GlBinaryOp::Div => a / b,
                GlBinaryOp::Rem => a % b,
                _ => unreachable!(),
            };
            finite_number(result)
        }
        GlBinaryOp::Eq => {
            let left = eval_expr(lhs, columns)?;
            let right = eval_expr(rhs, columns)?;
            Ok(Value::Bool(values_equal(&left, &right)))
        }
        GlBinaryOp::Ne => {
            let left = eval_expr(lhs, columns)?;
            let right = eval_expr(rhs, columns)?;
            Ok(Value::Bool(!values_equal(&left, &right)))
        }
        GlBinaryOp::Lt | GlBinaryOp::Le | GlBinaryOp::Gt | GlBinaryOp::Ge => {
            let left = eval_expr(lhs, columns)?;
            let right = eval_expr(rhs, columns)?;
            let ordering = compare_values(&left, &right)?;
            let holds = match op {
                GlBinaryOp::Lt => ordering.is_lt(),
                GlBinaryOp::Le => ordering.is_le(),
                GlBinaryOp::Gt => ordering.is_gt(),
                GlBinaryOp::Ge => ordering.is_ge(),
                _ => unreachable!(),
            };
            Ok(Value::Bool(holds))
        }
        GlBinaryOp::Contains | GlBinaryOp::StartsWith | GlBinaryOp::EndsWith => {
            let left = to_display_string(&eval_expr(lhs, columns)?);
            let right = to_display_string(&eval_expr(rhs, columns)?);
            let holds = match op {
                GlBinaryOp::Contains => left.contains(&right),
                GlBinaryOp::StartsWith => left.starts_with(&right),
                GlBinaryOp::EndsWith => left.ends_with(&right),
                _ => unreachable!(),
            };
            Ok(Value::Bool(holds))
        }
    }
}

fn eval_call(func: GlFunc, args: &[GlExpr], columns: &GlColumns) -> Result<Value> {
    // The parser enforces arity, but Call nodes can also be built by
    // hand, so a mismatch is an error rather than an indexing panic.
    if args.len() != func.arity() {
        return Err(GlError::internal(format!(
            "{func:?} expects {} argument(s), got {}",
            func.arity(),
            args.len()
        )));
    }
    match func {
        GlFunc::If => {
            let condition = eval_expr(&args[0], columns)?;
            if is_truthy(&condition) {
                eval_expr(&args[1], columns)
            } else {
                eval_expr(&args[2], columns)
            }
        }
        GlFunc::Sum => {
            let value = eval_expr(&args[0], columns)?;
            finite_number(sum_of(&value))
        }
        GlFunc::Avg => {
            let value = eval_expr(&args[0], columns)?;
            let result = match &value {
                Value::Array(items) if items.is_empty() => 0.0,
                Value::Array(items) => sum_of(&value) / items.len() as f64,
                other => number_or_zero(other),
            };
            finite_number(result)
        }
        GlFunc::Len => {
            let value = eval_expr(&args[0], columns)?;
            let length = match &value {
                Value::Array(items) => items.len(),
                Value::String(text) => text.chars().count(),
                Value::Null => 0,
                Value::Number(_) | Value::Bool(_) => 1,
                Value::Object(map) => map.len(),
            };
            Ok(Value::Number(Number::from(length as u64)))
        }
    }
}

/// Sum with aggregate coercion: array entries that are not numeric
/// (objects, nulls, junk strings) count as 0.
fn sum_of(value: &Value) -> f64 {
    match value {
        Value::Array(items) => items.iter().map(number_or_zero).sum(),
        other => number_or_zero(other),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Value::Number(_), Value::Number(_)) = (a, b) {
        return match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        };
    }
    a == b
}

fn compare_values(a: &Value, b: &Value) -> Result<std::cmp::Ordering> {
    if let (Some(x), Some(y)) = (to_number(a), to_number(b)) {
        return x
            .partial_cmp(&y)
            .ok_or_else(|| GlError::internal("NaN comparison"));
    }
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return Ok(x.cmp(y));
    }
    Err(GlError::internal("operands are not comparable"))
}

fn finite_number(value: f64) -> Result<Value> {
    Number::from_f64(value)
        .map(Value::Number)
        .ok_or_else(|| GlError::internal("non-finite numeric result"))
}
