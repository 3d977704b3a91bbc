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

//! # Glance Path Module
//!
//! Dotted-path access, record flattening, and coarse type detection.
//! Everything else in the engine builds on the three contracts here:
//!
//! - [`resolve_path`] walks `a.b.c` through a nested record and yields
//!   `None` the moment traversal fails; it never panics
//! - [`flatten_value`] merges nested objects into dotted top-level keys
//!   while leaving arrays intact for the aggregate helpers
//! - [`detect_kind`] produces an advisory kind tag for field
//!   configuration UIs; nothing in evaluation consults it

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::GlColumns;

/// Resolves a dotted path against a nested record.
///
/// Returns `None` as soon as an intermediate value is missing, null, or
/// not an object. No side effects, no errors.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            _ => return None,
        }
    }
    Some(current)
}

/// Resolves a dotted path against a flat column map.
///
/// A flat dotted key wins outright; otherwise the path is walked through
/// whatever nested structure the columns still hold. Rows produced by
/// [`flatten_value`] always hit the first case.
pub fn resolve_flat<'a>(columns: &'a GlColumns, path: &str) -> Option<&'a Value> {
    if let Some(value) = columns.get(path) {
        return Some(value);
    }
    let (head, rest) = path.split_once('.')?;
    resolve_path(columns.get(head)?, rest)
}

/// Flattens a nested record into a single-level dotted-path column map.
///
/// Nested objects are merged into the parent as `parent.child` keys.
/// Arrays are assigned directly under their key without recursing into
/// element objects, so `SUM(lineItems)` can still see the whole array.
/// Null leaves pass through unchanged under their full path. Flattening
/// an already-flat record is a no-op, which makes the operation
/// idempotent.
///
/// A non-object record lands under a single `value` key.
pub fn flatten_value(record: &Value) -> GlColumns {
    let mut columns = Map::new();
    match record {
        Value::Object(map) => {
            for (key, value) in map {
                flatten_into(&mut columns, key, value);
            }
        }
        other => {
            columns.insert("value".to_string(), other.clone());
        }
    }
    columns
}

fn flatten_into(columns: &mut GlColumns, prefix: &str, value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = format!("{prefix}.{key}");
                flatten_into(columns, &path, child);
            }
        }
        other => {
            columns.insert(prefix.to_string(), other.clone());
        }
    }
}

/// Coarse value kind reported to field-configuration UIs.
///
/// Advisory only: evaluation semantics never branch on this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlValueKind {
    Null,
    Array,
    Number,
    Date,
    Boolean,
    String,
    Object,
}

impl GlValueKind {
    /// Display tag matching what the host UI shows next to a field.
    pub fn as_str(self) -> &'static str {
        match self {
            GlValueKind::Null => "null",
            GlValueKind::Array => "array",
            GlValueKind::Number => "number",
            GlValueKind::Date => "date",
            GlValueKind::Boolean => "boolean",
            GlValueKind::String => "string",
            GlValueKind::Object => "object",
        }
    }
}

/// Infers a coarse kind for a leaf value.
///
/// Check order: null, array, finite number, date-parseable string, then
/// the value's own primitive tag.
pub fn detect_kind(value: &Value) -> GlValueKind {
    match value {
        Value::Null => GlValueKind::Null,
        Value::Array(_) => GlValueKind::Array,
        Value::Number(number) => {
            if number.as_f64().map(f64::is_finite).unwrap_or(false) {
                GlValueKind::Number
            } else {
                GlValueKind::String
            }
        }
        Value::String(text) => {
            if parse_date(text).is_some() {
                GlValueKind::Date
            } else {
                GlValueKind::String
            }
        }
        Value::Bool(_) => GlValueKind::Boolean,
        Value::Object(_) => GlValueKind::Object,
    }
}

/// Parses a date string into a naive timestamp.
///
/// Accepted shapes, in order: RFC 3339, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`.
/// Shared by [`detect_kind`] and the date filter operator so both agree
/// on what counts as a date.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }
    None
}
