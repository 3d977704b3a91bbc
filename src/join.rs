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

//! # Glance Join Engine
//!
//! Combines named row-sets with an ordered chain of join specs. The
//! accumulator starts from the primary source's flattened rows; each
//! spec reads its right side freshly from the original row-sets (never
//! from a previous join's output), builds a hash index over the
//! canonicalized right key, and merges per its join type. The final
//! accumulator is truncated to the sample limit.
//!
//! Join keys compare as trimmed string renderings on both sides
//! ([`canonical_key`]); a missing or null key renders as the empty
//! string. This is the documented canonicalization for heterogeneous
//! key types (numeric ids joined against string ids match).

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::{GlNamedRowSets, GlRow, GlRowSet};

/// Hard cap on rows retained after the join/union stage.
///
/// Protects interactive responsiveness; truncation beyond it is silent
/// apart from a diagnostic log line.
pub const GL_SAMPLE_LIMIT: usize = 5000;

/// How two row-sets combine in one join step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlJoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

/// One step in a join chain.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlJoinSpec {
    #[serde(default)]
    pub left_source: String,
    #[serde(default)]
    pub left_field: String,
    #[serde(default)]
    pub right_source: String,
    #[serde(default)]
    pub right_field: String,
    #[serde(rename = "type", default)]
    pub join_type: GlJoinType,
}

impl GlJoinSpec {
    /// A join is only usable once all four identifying fields are set.
    /// Incomplete specs are skipped, not errors.
    pub fn is_complete(&self) -> bool {
        !self.left_source.is_empty()
            && !self.left_field.is_empty()
            && !self.right_source.is_empty()
            && !self.right_field.is_empty()
    }
}

/// Canonical join-key rendering: trimmed stringification.
///
/// Strings render without quotes, numbers/booleans via their JSON text,
/// missing and null as `""`. Applied identically to both sides of every
/// index so `10` joins `"10"`.
pub fn canonical_key(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Joins named row-sets per an ordered list of specs.
///
/// The accumulator starts from `primary`'s flattened rows (first
/// row-set in key order when unspecified or unknown). Each complete
/// spec then merges the accumulator against its freshly-read right
/// side. The result is truncated to `sample_limit`.
pub fn join_row_sets(
    sets: &GlNamedRowSets,
    specs: &[GlJoinSpec],
    primary: Option<&str>,
    sample_limit: usize,
) -> GlRowSet {
    let primary_key = primary
        .filter(|key| sets.contains_key(*key))
        .map(str::to_string)
        .or_else(|| sets.keys().next().cloned());

    let mut accumulator: GlRowSet = match primary_key.as_deref().and_then(|key| sets.get(key)) {
        Some(records) => records.iter().map(GlRow::from_record).collect(),
        None => Vec::new(),
    };

    for spec in specs {
        if !spec.is_complete() {
            log::warn!("skipping incomplete join spec {spec:?}");
            continue;
        }
        let right_rows: GlRowSet = match sets.get(&spec.right_source) {
            Some(records) => records.iter().map(GlRow::from_record).collect(),
            None => {
                log::warn!("join right source '{}' has no rows", spec.right_source);
                Vec::new()
            }
        };
        accumulator = join_step(accumulator, &right_rows, spec);
    }

    if accumulator.len() > sample_limit {
        log::debug!(
            "join produced {} rows, truncating to sample limit {}",
            accumulator.len(),
            sample_limit
        );
        accumulator.truncate(sample_limit);
    }
    accumulator
}

/// Shallow right-over-left column merge. The merged row keeps the left
/// side's drill-down back-reference (primary-chain provenance).
fn merge_rows(left: &GlRow, right: &GlRow) -> GlRow {
    let mut columns = left.columns.clone();
    for (key, value) in &right.columns {
        columns.insert(key.clone(), value.clone());
    }
    GlRow {
        columns,
        source: left.source.clone().or_else(|| right.source.clone()),
    }
}

fn index_rows(rows: &[GlRow], field: &str) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (position, row) in rows.iter().enumerate() {
        index
            .entry(canonical_key(row.get(field)))
            .or_default()
            .push(position);
    }
    index
}

fn join_step(left: GlRowSet, right: &[GlRow], spec: &GlJoinSpec) -> GlRowSet {
    match spec.join_type {
        GlJoinType::Inner | GlJoinType::Left => {
            let index = index_rows(right, &spec.right_field);
            let mut out = Vec::new();
            for left_row in &left {
                let key = canonical_key(left_row.get(&spec.left_field));
                match index.get(&key) {
                    Some(matches) => {
                        for &position in matches {
                            out.push(merge_rows(left_row, &right[position]));
                        }
                    }
                    None => {
                        if spec.join_type == GlJoinType::Left {
                            out.push(left_row.clone());
                        }
                    }
                }
            }
            out
        }
        GlJoinType::Right => {
            // Right side drives; unmatched left rows are dropped for
            // this step.
            let index = index_rows(&left, &spec.left_field);
            let mut out = Vec::new();
            for right_row in right {
                let key = canonical_key(right_row.get(&spec.right_field));
                match index.get(&key) {
                    Some(matches) => {
                        for &position in matches {
                            out.push(merge_rows(&left[position], right_row));
                        }
                    }
                    None => out.push(right_row.clone()),
                }
            }
            out
        }
        GlJoinType::Full => {
            // Matched pairs, then unmatched rights inline, then leftover
            // lefts. Matched-left tracking is scoped to this step only.
            let index = index_rows(&left, &spec.left_field);
            let mut matched_left: HashSet<usize> = HashSet::new();
            let mut out = Vec::new();
            for right_row in right {
                let key = canonical_key(right_row.get(&spec.right_field));
                match index.get(&key) {
                    Some(matches) => {
                        for &position in matches {
                            matched_left.insert(position);
                            out.push(merge_rows(&left[position], right_row));
                        }
                    }
                    None => out.push(right_row.clone()),
                }
            }
            for (position, left_row) in left.iter().enumerate() {
                if !matched_left.contains(&position) {
                    out.push(left_row.clone());
                }
            }
            out
        }
    }
}
