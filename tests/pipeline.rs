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

//! The full preview pass: configuration rehydration, stage ordering,
//! async source refresh, search, and chart grouping.

use async_trait::async_trait;
use serde_json::{json, Value};

use glance::{
    group_for_chart, GlDataSource, GlError, GlPreviewPipeline, Result,
};

struct Stores;

#[async_trait]
impl GlDataSource for Stores {
    async fn run(&self, dataset_id: &str) -> Result<Vec<Value>> {
        match dataset_id {
            "orders" => Ok(vec![
                json!({"id": 1, "custId": 10, "amt": 5}),
                json!({"id": 2, "custId": 11, "amt": 7}),
                json!({"id": 3, "custId": 10, "amt": 9}),
            ]),
            "customers" => Ok(vec![
                json!({"id": 10, "name": "Alice", "region": "west"}),
                json!({"id": 11, "name": "Bob", "region": "east"}),
            ]),
            other => Err(GlError::source(other, "unknown dataset")),
        }
    }
}

fn dashboard() -> Value {
    json!({
        "sources": ["orders", "customers"],
        "primarySource": "orders",
        "joins": [{
            "leftSource": "orders",
            "leftField": "custId",
            "rightSource": "customers",
            "rightField": "id",
            "type": "inner",
        }],
        "calculatedFields": [
            {"name": "total", "expression": "amt * 2"},
            {"name": "grandTotal", "expression": "SUM(amt)"},
        ],
        "logicRules": [{"name": "big", "expression": "total > 10"}],
        "activeExpression": "",
        "filters": [{"type": "text", "field": "name", "operator": "contains", "value": "ali"}],
        "charts": [{"chartType": "bar", "xField": "region", "yField": "amt", "aggregation": "sum"}],
    })
}

#[tokio::test]
async fn preview_runs_every_stage_in_order() {
    let mut pipeline =
        GlPreviewPipeline::from_config_value(dashboard()).expect("config must rehydrate");
    pipeline.refresh_sources(&Stores).await;

    let rows = pipeline.run();

    // Join keeps all three orders; calc adds total (10, 14, 18) and a
    // grandTotal of 21 across the joined sample; the logic rule drops
    // the first order; the text filter keeps Alice's remaining order.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["amt"], json!(9));
    assert_eq!(rows[0].columns["total"], json!(18.0));
    assert_eq!(rows[0].columns["grandTotal"], json!(21.0));
    assert_eq!(rows[0].columns["name"], json!("Alice"));
}

#[tokio::test]
async fn rerunning_the_pass_is_idempotent() {
    let mut pipeline =
        GlPreviewPipeline::from_config_value(dashboard()).expect("config must rehydrate");
    pipeline.refresh_sources(&Stores).await;

    let first = pipeline.run();
    let second = pipeline.run();

    assert_eq!(first, second);
}

#[tokio::test]
async fn failed_source_fetch_yields_empty_preview() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["ghost"],
    }))
    .expect("config must rehydrate");
    pipeline.refresh_sources(&Stores).await;

    assert!(pipeline.run().is_empty());
}

#[test]
fn union_concatenates_selected_sources_in_order() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["orders", "customers"],
    }))
    .expect("config must rehydrate");
    pipeline
        .cache_mut()
        .insert("orders", vec![json!({"id": 1}), json!({"id": 2})]);
    pipeline
        .cache_mut()
        .insert("customers", vec![json!({"name": "Alice"})]);

    let rows = pipeline.run();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].columns["id"], json!(1));
    assert_eq!(rows[2].columns["name"], json!("Alice"));
}

#[test]
fn sample_cap_applies_before_filters() {
    // 5100 raw rows; only indexes past the cap would satisfy the
    // filter, so the capped sample filters down to nothing.
    let rows: Vec<Value> = (0..5100).map(|i| json!({"idx": i})).collect();
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["big"],
        "filters": [{"type": "number", "field": "idx", "min": 5050}],
    }))
    .expect("config must rehydrate");
    pipeline.cache_mut().insert("big", rows);

    assert!(pipeline.run().is_empty());
}

#[test]
fn search_is_case_insensitive_across_all_columns() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["people"],
    }))
    .expect("config must rehydrate");
    pipeline.cache_mut().insert(
        "people",
        vec![
            json!({"name": "Alice", "city": "Lisbon"}),
            json!({"name": "Bob", "city": "Oslo"}),
        ],
    );

    pipeline.set_search_query("LISB");
    assert_eq!(pipeline.run().len(), 1);

    pipeline.set_search_query("");
    assert_eq!(pipeline.run().len(), 2);
}

#[test]
fn uploaded_table_supersedes_sources_and_feeds_stages() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["orders"],
        "calculatedFields": [{"name": "double", "expression": "n * 2"}],
        "activeExpression": "double > 2",
    }))
    .expect("config must rehydrate");
    pipeline.cache_mut().insert("orders", vec![json!({"n": 100})]);
    pipeline.set_uploaded_table(vec![json!({"n": 1}), json!({"n": 3})]);

    let rows = pipeline.run();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["double"], json!(6.0));
}

#[test]
fn config_round_trips_through_json() {
    let mut pipeline =
        GlPreviewPipeline::from_config_value(dashboard()).expect("config must rehydrate");

    let saved = pipeline.config().to_value().expect("config must serialize");
    let reloaded = GlPreviewPipeline::from_config_value(saved).expect("saved config must reload");

    assert_eq!(pipeline.config(), reloaded.config());
    assert_eq!(pipeline.config_mut().sources.len(), 2);
}

#[test]
fn rows_carry_a_source_back_reference() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["orders"],
    }))
    .expect("config must rehydrate");
    pipeline
        .cache_mut()
        .insert("orders", vec![json!({"order": {"amt": 4}})]);

    let rows = pipeline.run();

    assert_eq!(rows[0].columns["order.amt"], json!(4));
    assert_eq!(rows[0].source, Some(json!({"order": {"amt": 4}})));
}

#[tokio::test]
async fn chart_grouping_aggregates_per_bucket() {
    let mut pipeline = GlPreviewPipeline::from_config_value(json!({
        "sources": ["orders", "customers"],
        "primarySource": "orders",
        "joins": [{
            "leftSource": "orders",
            "leftField": "custId",
            "rightSource": "customers",
            "rightField": "id",
            "type": "inner",
        }],
        "charts": [{"chartType": "bar", "xField": "region", "yField": "amt", "aggregation": "sum"}],
    }))
    .expect("config must rehydrate");
    pipeline.refresh_sources(&Stores).await;

    let rows = pipeline.run();
    let chart = pipeline.config().charts[0].clone();
    let series = group_for_chart(&rows, &chart);

    // west holds orders 1 and 3 (5 + 9), east holds order 2.
    assert_eq!(series, vec![("west".to_string(), 14.0), ("east".to_string(), 7.0)]);
}
