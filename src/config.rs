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

//! # Glance Dashboard Configuration
//!
//! The persisted shape a published dashboard serializes to, and the
//! shape the engine rehydrates its working state from. Storage and
//! transport are the host's concern; the contract here is the serde
//! round-trip.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calc::GlCalculatedField;
use crate::errors::{GlError, Result};
use crate::filter::GlFilterSpec;
use crate::join::GlJoinSpec;
use crate::logic::GlLogicRule;

/// Aggregation applied to a chart's y values per x bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlAggregation {
    #[default]
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

/// A persisted chart definition.
///
/// Carried and round-tripped so published dashboards rehydrate intact;
/// actual drawing belongs to the host's chart layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlChartSpec {
    #[serde(default)]
    pub chart_type: String,
    #[serde(default)]
    pub x_field: String,
    #[serde(default)]
    pub y_field: String,
    #[serde(default)]
    pub aggregation: GlAggregation,
}

/// Everything a published dashboard persists about its data pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlDashboardConfig {
    /// Selected source identifiers, in selection order.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Primary source the join accumulator starts from; defaults to the
    /// first selected source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_source: Option<String>,

    #[serde(default)]
    pub joins: Vec<GlJoinSpec>,

    #[serde(default)]
    pub calculated_fields: Vec<GlCalculatedField>,

    #[serde(default)]
    pub logic_rules: Vec<GlLogicRule>,

    /// The unsaved expression currently in the logic editor.
    #[serde(default)]
    pub active_expression: String,

    #[serde(default)]
    pub filters: Vec<GlFilterSpec>,

    #[serde(default)]
    pub charts: Vec<GlChartSpec>,
}

impl GlDashboardConfig {
    /// Rehydrates a configuration from its persisted JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes the configuration to its persisted JSON value.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Checks referential consistency of the configuration.
    ///
    /// The preview pass itself degrades gracefully (an unknown source
    /// joins against an empty row-set), so this check is for hosts that
    /// want to surface configuration mistakes in the editor instead.
    pub fn validate(&self) -> Result<()> {
        if let Some(primary) = &self.primary_source {
            if !self.sources.contains(primary) {
                return Err(GlError::validation(format!(
                    "primary source '{primary}' is not among the selected sources"
                )));
            }
        }
        for join in &self.joins {
            for source in [&join.left_source, &join.right_source] {
                if !source.is_empty() && !self.sources.contains(source) {
                    return Err(GlError::validation(format!(
                        "join references unselected source '{source}'"
                    )));
                }
            }
        }
        Ok(())
    }
}
