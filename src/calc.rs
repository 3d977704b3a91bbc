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

//! # Glance Calculated Fields
//!
//! A calculated field derives a new column from an expression over the
//! existing columns. Two disjoint shapes exist:
//!
//! - **Row-level**: any general expression, evaluated once per row.
//!   Row-level fields run first, in declaration order, and each newly
//!   written column is visible to the row-level fields after it.
//! - **Column-level**: an expression that is exactly `SUM(field)`,
//!   `AVG(field)`, or `LEN(field)`. It runs once over the whole column
//!   (as the dataset stands after the row-level pass) and the scalar is
//!   broadcast to every row.
//!
//! A field that fails to compile or evaluate writes `null` instead of
//! aborting the pass; the error is logged for diagnosis. Names may
//! collide with existing columns, in which case the new value silently
//! overwrites.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::expr::{eval_expr, parse_expression, to_number, GlExpr, GlFunc};
use crate::record::GlRowSet;

/// A user-defined derived column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlCalculatedField {
    /// Output column key.
    pub name: String,
    /// Expression source text.
    pub expression: String,
    /// Display-type hint for the field configuration UI; never enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

enum CompiledField<'a> {
    RowLevel(&'a GlCalculatedField, GlExpr),
    ColumnLevel(&'a GlCalculatedField, GlFunc, String),
    /// Compile failure: the column is still added, as null everywhere.
    Broken(&'a GlCalculatedField),
}

/// Applies all calculated fields to a row-set in place.
///
/// Row-level fields run first in declaration order, then column-level
/// aggregates over the post-row-level dataset.
pub fn apply_calculated_fields(rows: &mut GlRowSet, fields: &[GlCalculatedField]) {
    let mut row_level = Vec::new();
    let mut column_level = Vec::new();

    for field in fields {
        if field.name.is_empty() || field.expression.trim().is_empty() {
            continue;
        }
        match parse_expression(&field.expression) {
            Ok(expr) => match expr.as_aggregate_call() {
                Some((func, path)) => {
                    column_level.push(CompiledField::ColumnLevel(field, func, path.to_string()));
                }
                None => row_level.push(CompiledField::RowLevel(field, expr)),
            },
            Err(err) => {
                log::warn!("calculated field '{}' failed to compile: {err}", field.name);
                row_level.push(CompiledField::Broken(field));
            }
        }
    }

    for compiled in &row_level {
        match compiled {
            CompiledField::RowLevel(field, expr) => {
                for row in rows.iter_mut() {
                    let value = match eval_expr(expr, &row.columns) {
                        Ok(value) => value,
                        Err(err) => {
                            log::debug!(
                                "calculated field '{}' failed on a row: {err}",
                                field.name
                            );
                            Value::Null
                        }
                    };
                    row.set(field.name.clone(), value);
                }
            }
            CompiledField::Broken(field) => {
                for row in rows.iter_mut() {
                    row.set(field.name.clone(), Value::Null);
                }
            }
            CompiledField::ColumnLevel(..) => unreachable!(),
        }
    }

    for compiled in &column_level {
        if let CompiledField::ColumnLevel(field, func, path) = compiled {
            let value = aggregate_column(rows, *func, path);
            for row in rows.iter_mut() {
                row.set(field.name.clone(), value.clone());
            }
        }
    }
}

/// Computes a whole-column aggregate.
///
/// `SUM`/`AVG` skip missing and null entries, then coerce the rest
/// (non-numeric survivors count as 0; an array entry contributes the
/// sum of its coerced elements). `LEN` is the column length, i.e. the
/// number of rows.
fn aggregate_column(rows: &GlRowSet, func: GlFunc, path: &str) -> Value {
    match func {
        GlFunc::Len => Value::Number(Number::from(rows.len() as u64)),
        GlFunc::Sum | GlFunc::Avg => {
            let entries: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(path))
                .filter(|value| !value.is_null())
                .map(entry_number)
                .collect();
            let sum: f64 = entries.iter().sum();
            let result = match func {
                GlFunc::Sum => sum,
                GlFunc::Avg if entries.is_empty() => 0.0,
                GlFunc::Avg => sum / entries.len() as f64,
                _ => unreachable!(),
            };
            Number::from_f64(result).map(Value::Number).unwrap_or(Value::Null)
        }
        GlFunc::If => Value::Null,
    }
}

fn entry_number(value: &Value) -> f64 {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| to_number(item).unwrap_or(0.0))
            .sum(),
        other => to_number(other).unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GlRow;
    use serde_json::json;

    fn rows(values: Vec<Value>) -> GlRowSet {
        values.iter().map(GlRow::from_record).collect()
    }

    fn field(name: &str, expression: &str) -> GlCalculatedField {
        GlCalculatedField {
            name: name.to_string(),
            expression: expression.to_string(),
            value_type: None,
        }
    }

    #[test]
    fn row_level_fields_see_earlier_fields() {
        let mut data = rows(vec![json!({"amt": 5})]);
        apply_calculated_fields(
            &mut data,
            &[field("double", "amt * 2"), field("quad", "double * 2")],
        );
        assert_eq!(data[0].columns["double"], json!(10.0));
        assert_eq!(data[0].columns["quad"], json!(20.0));
    }

    #[test]
    fn column_level_runs_after_row_level() {
        let mut data = rows(vec![json!({"amt": 5}), json!({"amt": 7})]);
        apply_calculated_fields(
            &mut data,
            &[field("grandTotal", "SUM(amt)"), field("total", "amt * 2")],
        );
        // grandTotal is declared first but still sums the raw column;
        // total exists on every row by then.
        assert_eq!(data[0].columns["grandTotal"], json!(12.0));
        assert_eq!(data[1].columns["grandTotal"], json!(12.0));
        assert_eq!(data[0].columns["total"], json!(10.0));
    }

    #[test]
    fn broken_expression_yields_null_everywhere() {
        let mut data = rows(vec![json!({"amt": 5}), json!({"amt": 7})]);
        apply_calculated_fields(&mut data, &[field("bad", "amt +")]);
        assert_eq!(data[0].columns["bad"], Value::Null);
        assert_eq!(data[1].columns["bad"], Value::Null);
    }

    #[test]
    fn name_collision_overwrites() {
        let mut data = rows(vec![json!({"amt": 5})]);
        apply_calculated_fields(&mut data, &[field("amt", "amt + 1")]);
        assert_eq!(data[0].columns["amt"], json!(6.0));
    }

    #[test]
    fn column_aggregates_skip_nulls() {
        let mut data = rows(vec![
            json!({"amt": 4}),
            json!({"amt": null}),
            json!({"other": 1}),
            json!({"amt": 8}),
        ]);
        apply_calculated_fields(
            &mut data,
            &[field("avgAmt", "AVG(amt)"), field("count", "LEN(amt)")],
        );
        assert_eq!(data[0].columns["avgAmt"], json!(6.0));
        assert_eq!(data[0].columns["count"], json!(4));
    }
}
