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

//! # Glance Row Module
//!
//! Core data structures for the row-sets that flow through the preview
//! pipeline. A [`GlRow`] is the fundamental unit of data: a single-level
//! mapping from dotted-path column names to JSON leaf values, plus a
//! hidden back-reference to the nested record it was flattened from.
//!
//! ## Design Principles
//!
//! - **Flexibility**: rows carry `serde_json::Value` leaves, so records
//!   of any shape pass through without a declared schema
//! - **Drill-down friendly**: the pre-calculation source record rides
//!   along on every row so a chart click can recover the original
//! - **Immutability-friendly**: every pipeline stage produces new rows;
//!   source records are never mutated in place
//!
//! ## Usage Example
//!
//! ```rust
//! use glance::record::GlRow;
//! use serde_json::json;
//!
//! let row = GlRow::from_record(&json!({
//!     "id": 1,
//!     "customer": { "name": "Alice", "address": { "city": "Lyon" } },
//!     "lineItems": [3, 4, 5],
//! }));
//!
//! assert_eq!(row.get("customer.address.city"), Some(&json!("Lyon")));
//! assert_eq!(row.get("lineItems"), Some(&json!([3, 4, 5])));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::paths::{flatten_value, resolve_flat};

/// Single-level mapping from dotted-path column name to leaf value.
///
/// Invariant: no value in the map is a JSON object. Arrays are preserved
/// verbatim so aggregate helpers such as `SUM(lineItems)` can consume
/// them; nested objects have been merged into the parent under
/// `parent.child` keys.
pub type GlColumns = Map<String, Value>;

/// Ordered mapping from source identifier to its raw (nested) records.
///
/// Identifiers are dataset ids chosen by the host, or the reserved
/// uploaded-table token. A `BTreeMap` keeps iteration deterministic so
/// repeated preview passes over unchanged inputs yield identical output.
pub type GlNamedRowSets = BTreeMap<String, Vec<Value>>;

/// A flattened row moving through the preview pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlRow {
    /// Flat dotted-path columns for this row.
    pub columns: GlColumns,

    /// Back-reference to the pre-calculation source record.
    ///
    /// Populated when the row is flattened from a raw record and carried
    /// through joins, so the host can hand the original nested record to
    /// a drill-down click handler. Skipped during serialization when
    /// absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl GlRow {
    /// Constructs a row from already-flat columns, with no back-reference.
    pub fn new(columns: GlColumns) -> Self {
        GlRow {
            columns,
            source: None,
        }
    }

    /// Flattens a raw nested record into a row, keeping the record as the
    /// drill-down back-reference.
    ///
    /// Non-object records (bare scalars or arrays) land under a single
    /// `value` column so heterogenous sources still produce usable rows.
    pub fn from_record(record: &Value) -> Self {
        GlRow {
            columns: flatten_value(record),
            source: Some(record.clone()),
        }
    }

    /// Attaches a back-reference to the row.
    pub fn with_source(mut self, source: Value) -> Self {
        self.source = Some(source);
        self
    }

    /// Resolves a dotted path against this row.
    ///
    /// Flat dotted keys win; a nested-path walk is the fallback so rows
    /// built by hand from nested columns still resolve.
    pub fn get(&self, path: &str) -> Option<&Value> {
        resolve_flat(&self.columns, path)
    }

    /// Sets a column value, overwriting any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.columns.insert(key.into(), value);
    }
}

/// Convenience alias for an ordered sequence of rows.
pub type GlRowSet = Vec<GlRow>;
