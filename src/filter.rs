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

//! # Glance Filter Engine
//!
//! Typed filter rules applied conjunctively over a row-set. A spec with
//! an empty `field` is vacuously true and skipped. Per type:
//!
//! - **text**: case-insensitive contains/equals/starts/ends, plus a
//!   case-insensitive regex operator
//! - **number**: min/max bounds; a bound only fails a row when it is
//!   actually set and violated; a non-numeric value violates any set
//!   bound
//! - **date**: the field must parse as a date or the row is excluded;
//!   bounds are inclusive
//! - **dropdown**: exact membership in the configured options, no
//!   coercion
//! - **regex**: case-sensitive pattern test; a pattern that fails to
//!   compile matches nothing

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::expr::to_display_string;
use crate::paths::parse_date;
use crate::record::{GlRow, GlRowSet};

/// Comparison mode for text filters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlTextOperator {
    #[default]
    Contains,
    Equals,
    Starts,
    Ends,
    Regex,
}

/// A typed filter rule, tagged by `type` in the persisted JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GlFilterSpec {
    Text {
        #[serde(default)]
        field: String,
        #[serde(default)]
        operator: GlTextOperator,
        #[serde(default)]
        value: String,
    },
    Number {
        #[serde(default)]
        field: String,
        #[serde(default, deserialize_with = "lenient_number")]
        min: Option<f64>,
        #[serde(default, deserialize_with = "lenient_number")]
        max: Option<f64>,
    },
    Date {
        #[serde(default)]
        field: String,
        #[serde(default, rename = "startDate")]
        start_date: Option<String>,
        #[serde(default, rename = "endDate")]
        end_date: Option<String>,
    },
    Dropdown {
        #[serde(default)]
        field: String,
        #[serde(default, rename = "dropdownOptions")]
        dropdown_options: Vec<Value>,
    },
    Regex {
        #[serde(default)]
        field: String,
        #[serde(default)]
        pattern: String,
    },
}

impl GlFilterSpec {
    fn field(&self) -> &str {
        match self {
            GlFilterSpec::Text { field, .. }
            | GlFilterSpec::Number { field, .. }
            | GlFilterSpec::Date { field, .. }
            | GlFilterSpec::Dropdown { field, .. }
            | GlFilterSpec::Regex { field, .. } => field,
        }
    }
}

/// Bounds arrive from the UI as numbers, numeric strings, or empty
/// strings; empty and junk both mean "not set".
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_bound))
}

fn coerce_bound(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Applies all filter specs as a conjunction.
pub fn apply_filters(rows: GlRowSet, specs: &[GlFilterSpec]) -> GlRowSet {
    let compiled: Vec<CompiledFilter> = specs
        .iter()
        .filter(|spec| !spec.field().is_empty())
        .map(CompiledFilter::new)
        .collect();
    if compiled.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| compiled.iter().all(|filter| filter.matches(row)))
        .collect()
}

/// A filter spec with its regexes compiled once per pass.
struct CompiledFilter<'a> {
    spec: &'a GlFilterSpec,
    regex: Option<Regex>,
    regex_broken: bool,
}

impl<'a> CompiledFilter<'a> {
    fn new(spec: &'a GlFilterSpec) -> Self {
        let (pattern, case_insensitive) = match spec {
            GlFilterSpec::Text {
                operator: GlTextOperator::Regex,
                value,
                ..
            } => (Some(value.as_str()), true),
            GlFilterSpec::Regex { pattern, .. } => (Some(pattern.as_str()), false),
            _ => (None, false),
        };
        match pattern {
            Some(pattern) => match RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .build()
            {
                Ok(regex) => CompiledFilter {
                    spec,
                    regex: Some(regex),
                    regex_broken: false,
                },
                Err(err) => {
                    log::warn!("filter regex '{pattern}' failed to compile: {err}");
                    CompiledFilter {
                        spec,
                        regex: None,
                        regex_broken: true,
                    }
                }
            },
            None => CompiledFilter {
                spec,
                regex: None,
                regex_broken: false,
            },
        }
    }

    fn matches(&self, row: &GlRow) -> bool {
        let resolved = row.get(self.spec.field());
        match self.spec {
            GlFilterSpec::Text {
                operator, value, ..
            } => {
                if *operator == GlTextOperator::Regex {
                    return self.regex_matches(resolved);
                }
                let haystack = resolved.map(to_display_string).unwrap_or_default().to_lowercase();
                let needle = value.to_lowercase();
                match operator {
                    GlTextOperator::Contains => haystack.contains(&needle),
                    GlTextOperator::Equals => haystack == needle,
                    GlTextOperator::Starts => haystack.starts_with(&needle),
                    GlTextOperator::Ends => haystack.ends_with(&needle),
                    GlTextOperator::Regex => unreachable!(),
                }
            }
            GlFilterSpec::Number { min, max, .. } => {
                if min.is_none() && max.is_none() {
                    return true;
                }
                let number = resolved.and_then(crate::expr::to_number);
                let above_min = match (min, number) {
                    (None, _) => true,
                    (Some(bound), Some(n)) => n >= *bound,
                    (Some(_), None) => false,
                };
                let below_max = match (max, number) {
                    (None, _) => true,
                    (Some(bound), Some(n)) => n <= *bound,
                    (Some(_), None) => false,
                };
                above_min && below_max
            }
            GlFilterSpec::Date {
                start_date,
                end_date,
                ..
            } => {
                let rendered = resolved.map(to_display_string).unwrap_or_default();
                let Some(date) = parse_date(&rendered) else {
                    return false;
                };
                let after_start = start_date
                    .as_deref()
                    .and_then(parse_date)
                    .map(|bound| date >= bound)
                    .unwrap_or(true);
                let before_end = end_date
                    .as_deref()
                    .and_then(parse_date)
                    .map(|bound| date <= bound)
                    .unwrap_or(true);
                after_start && before_end
            }
            GlFilterSpec::Dropdown {
                dropdown_options, ..
            } => match resolved {
                Some(value) => dropdown_options.contains(value),
                None => false,
            },
            GlFilterSpec::Regex { .. } => self.regex_matches(resolved),
        }
    }

    fn regex_matches(&self, resolved: Option<&Value>) -> bool {
        if self.regex_broken {
            return false;
        }
        match &self.regex {
            Some(regex) => {
                let haystack = resolved.map(to_display_string).unwrap_or_default();
                regex.is_match(&haystack)
            }
            None => false,
        }
    }
}
