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

//! # Glance Preview Pipeline
//!
//! Orchestrates one full preview pass whenever any input changes:
//!
//! 1. assemble named row-sets (uploaded table supersedes selections)
//! 2. join, or union/single-select when no join is configured
//! 3. calculated fields (row-level, then column-level broadcast)
//! 4. logic rules (active expression AND every saved rule)
//! 5. free-text search across all column values
//! 6. typed filters
//!
//! The sample cap is applied exactly once, at the end of stage 2, so
//! every later stage is bounded. The pass is a synchronous pure
//! function over a snapshot of configuration and cached rows: re-running
//! it with unchanged inputs yields identical output.

use crate::calc::apply_calculated_fields;
use crate::config::{GlAggregation, GlChartSpec, GlDashboardConfig};
use crate::errors::Result;
use crate::expr::{to_display_string, to_number};
use crate::filter::apply_filters;
use crate::join::{join_row_sets, GL_SAMPLE_LIMIT};
use crate::logic::GlLogicFilter;
use crate::record::{GlNamedRowSets, GlRow, GlRowSet};
use crate::source::{GlDataSource, GlSourceCache, GL_UPLOADED_TABLE_KEY};
use serde_json::Value;

/// The preview engine: configuration, cached source rows, and the
/// transient free-text query.
#[derive(Debug, Default)]
pub struct GlPreviewPipeline {
    config: GlDashboardConfig,
    cache: GlSourceCache,
    search_query: String,
}

impl GlPreviewPipeline {
    pub fn new(config: GlDashboardConfig) -> Self {
        GlPreviewPipeline {
            config,
            cache: GlSourceCache::new(),
            search_query: String::new(),
        }
    }

    /// Rehydrates a pipeline from a persisted dashboard configuration.
    pub fn from_config_value(value: Value) -> Result<Self> {
        Ok(GlPreviewPipeline::new(GlDashboardConfig::from_value(value)?))
    }

    pub fn config(&self) -> &GlDashboardConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut GlDashboardConfig {
        &mut self.config
    }

    pub fn cache(&self) -> &GlSourceCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut GlSourceCache {
        &mut self.cache
    }

    /// Sets the free-text search query (not part of the persisted
    /// configuration; it is editor session state).
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Installs a synchronously-parsed uploaded table.
    pub fn set_uploaded_table(&mut self, rows: Vec<Value>) {
        self.cache.insert_uploaded(rows);
    }

    /// Fetches every selected dataset through the host's source,
    /// settling concurrent fetches before any contributes rows.
    pub async fn refresh_sources(&mut self, source: &dyn GlDataSource) {
        let ids = self.config.sources.clone();
        self.cache.refresh(source, &ids).await;
    }

    /// Runs one full preview pass over the current snapshot.
    pub fn run(&self) -> GlRowSet {
        let named = self.assemble_row_sets();
        let mut rows = self.base_rows(&named);
        apply_calculated_fields(&mut rows, &self.config.calculated_fields);
        rows = self.apply_logic(rows);
        rows = search_rows(rows, &self.search_query);
        apply_filters(rows, &self.config.filters)
    }

    /// Builds the named row-sets for this pass. An installed uploaded
    /// table supersedes dataset selections entirely.
    fn assemble_row_sets(&self) -> GlNamedRowSets {
        let mut named = GlNamedRowSets::new();
        if self.cache.has_uploaded() {
            if let Some(rows) = self.cache.get(GL_UPLOADED_TABLE_KEY) {
                named.insert(GL_UPLOADED_TABLE_KEY.to_string(), rows.clone());
            }
            return named;
        }
        for id in &self.config.sources {
            let rows = self.cache.get(id).cloned().unwrap_or_default();
            named.insert(id.clone(), rows);
        }
        named
    }

    /// Stage 2: join when any join is configured, else the union of the
    /// selected sources in selection order (a single selection or the
    /// uploaded table degenerates to that one row-set).
    fn base_rows(&self, named: &GlNamedRowSets) -> GlRowSet {
        if !self.config.joins.is_empty() {
            let primary = self
                .config
                .primary_source
                .as_deref()
                .or_else(|| self.selection_order().into_iter().next());
            return join_row_sets(named, &self.config.joins, primary, GL_SAMPLE_LIMIT);
        }

        let mut rows = Vec::new();
        for id in self.selection_order() {
            if let Some(records) = named.get(id) {
                rows.extend(records.iter().map(GlRow::from_record));
            }
        }
        if rows.len() > GL_SAMPLE_LIMIT {
            log::debug!(
                "union produced {} rows, truncating to sample limit {GL_SAMPLE_LIMIT}",
                rows.len()
            );
            rows.truncate(GL_SAMPLE_LIMIT);
        }
        rows
    }

    fn selection_order(&self) -> Vec<&str> {
        if self.cache.has_uploaded() {
            vec![GL_UPLOADED_TABLE_KEY]
        } else {
            self.config.sources.iter().map(String::as_str).collect()
        }
    }

    /// Stage 4: the active expression and every saved rule, ANDed.
    fn apply_logic(&self, rows: GlRowSet) -> GlRowSet {
        let mut predicates = vec![GlLogicFilter::compile(&self.config.active_expression)];
        for rule in &self.config.logic_rules {
            predicates.push(GlLogicFilter::compile(&rule.expression));
        }
        rows.into_iter()
            .filter(|row| predicates.iter().all(|p| p.matches(&row.columns)))
            .collect()
    }
}

/// Stage 5: case-insensitive substring search across every column
/// value of a row; array values are joined with `", "` before matching.
pub fn search_rows(rows: GlRowSet, query: &str) -> GlRowSet {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|row| {
            row.columns
                .values()
                .any(|value| to_display_string(value).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Folds a preview row-set into `(x, aggregated y)` series points for a
/// chart definition, preserving first-appearance order of x buckets.
///
/// This is data shaping for the host's chart layer; drawing stays out
/// of the engine.
pub fn group_for_chart(rows: &GlRowSet, chart: &GlChartSpec) -> Vec<(String, f64)> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: std::collections::HashMap<String, Vec<f64>> =
        std::collections::HashMap::new();

    for row in rows {
        let x = row
            .get(&chart.x_field)
            .map(to_display_string)
            .unwrap_or_default();
        let y = row
            .get(&chart.y_field)
            .and_then(to_number)
            .unwrap_or(0.0);
        if !buckets.contains_key(&x) {
            order.push(x.clone());
        }
        buckets.entry(x).or_default().push(y);
    }

    order
        .into_iter()
        .map(|x| {
            let values = &buckets[&x];
            let y = match chart.aggregation {
                GlAggregation::Sum => values.iter().sum(),
                GlAggregation::Avg => values.iter().sum::<f64>() / values.len() as f64,
                GlAggregation::Count => values.len() as f64,
                GlAggregation::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
                GlAggregation::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            };
            (x, y)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_joins_arrays_before_matching() {
        let rows = vec![
            GlRow::from_record(&json!({"tags": ["alpha", "beta"]})),
            GlRow::from_record(&json!({"tags": ["gamma"]})),
        ];
        let hits = search_rows(rows, "ALPHA, BE");
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn uploaded_table_supersedes_selection() {
        let mut pipeline = GlPreviewPipeline::new(GlDashboardConfig {
            sources: vec!["orders".into()],
            ..Default::default()
        });
        pipeline.cache_mut().insert("orders", vec![json!({"id": 1})]);
        pipeline.set_uploaded_table(vec![json!({"row": "a"}), json!({"row": "b"})]);
        let preview = pipeline.run();
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].columns["row"], json!("a"));
    }
}
