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

//! Typed filter rules: the five filter types, their persisted JSON
//! shape, and conjunctive application.

use serde_json::{from_value, json};

use glance::{apply_filters, GlFilterSpec, GlRow, GlRowSet};

fn people() -> GlRowSet {
    vec![
        GlRow::from_record(&json!({"name": "Alice", "age": 31, "joined": "2024-03-05"})),
        GlRow::from_record(&json!({"name": "Bob", "age": "42", "joined": "2023-11-20"})),
        GlRow::from_record(&json!({"name": "Cara", "age": null, "joined": "bad date"})),
    ]
}

fn parse(spec: serde_json::Value) -> GlFilterSpec {
    from_value(spec).expect("filter spec fixture must deserialize")
}

#[test]
fn text_contains_is_case_insensitive() {
    let spec = parse(json!({"type": "text", "field": "name", "operator": "contains", "value": "ali"}));

    let rows = apply_filters(people(), &[spec]);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["name"], json!("Alice"));
}

#[test]
fn text_equals_starts_ends() {
    let equals = parse(json!({"type": "text", "field": "name", "operator": "equals", "value": "bob"}));
    assert_eq!(apply_filters(people(), &[equals]).len(), 1);

    let starts = parse(json!({"type": "text", "field": "name", "operator": "starts", "value": "ca"}));
    assert_eq!(apply_filters(people(), &[starts]).len(), 1);

    let ends = parse(json!({"type": "text", "field": "name", "operator": "ends", "value": "E"}));
    let rows = apply_filters(people(), &[ends]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["name"], json!("Alice"));
}

#[test]
fn number_bounds_accept_numeric_strings_in_data() {
    let spec = parse(json!({"type": "number", "field": "age", "min": 40, "max": null}));

    let rows = apply_filters(people(), &[spec]);

    // Bob's age is the string "42" but still passes the bound; Cara's
    // null age violates a set bound.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["name"], json!("Bob"));
}

#[test]
fn number_bounds_arrive_as_ui_strings() {
    let spec = parse(json!({"type": "number", "field": "age", "min": "30", "max": ""}));

    let rows = apply_filters(people(), &[spec]);

    assert_eq!(rows.len(), 2);
}

#[test]
fn unset_number_bounds_pass_everything() {
    let spec = parse(json!({"type": "number", "field": "age"}));

    assert_eq!(apply_filters(people(), &[spec]).len(), 3);
}

#[test]
fn date_range_is_inclusive_and_drops_unparseable_values() {
    let spec = parse(json!({
        "type": "date",
        "field": "joined",
        "startDate": "2023-11-20",
        "endDate": "2024-03-05",
    }));

    let rows = apply_filters(people(), &[spec]);

    // Both real dates sit on the inclusive bounds; "bad date" is out.
    assert_eq!(rows.len(), 2);
}

#[test]
fn unparseable_date_bound_is_ignored() {
    let spec = parse(json!({
        "type": "date",
        "field": "joined",
        "startDate": "whenever",
        "endDate": "2023-12-31",
    }));

    let rows = apply_filters(people(), &[spec]);

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["name"], json!("Bob"));
}

#[test]
fn dropdown_is_exact_membership() {
    let spec = parse(json!({
        "type": "dropdown",
        "field": "name",
        "dropdownOptions": ["Alice", "Cara"],
    }));

    assert_eq!(apply_filters(people(), &[spec]).len(), 2);

    let empty = parse(json!({"type": "dropdown", "field": "name", "dropdownOptions": []}));
    assert!(apply_filters(people(), &[empty]).is_empty());
}

#[test]
fn regex_filter_is_case_sensitive() {
    let spec = parse(json!({"type": "regex", "field": "name", "pattern": "^[AB]"}));

    assert_eq!(apply_filters(people(), &[spec]).len(), 2);

    let lower = parse(json!({"type": "regex", "field": "name", "pattern": "^[ab]"}));
    assert!(apply_filters(people(), &[lower]).is_empty());
}

#[test]
fn invalid_regex_matches_nothing() {
    let spec = parse(json!({"type": "regex", "field": "name", "pattern": "("}));

    assert!(apply_filters(people(), &[spec]).is_empty());
}

#[test]
fn filters_apply_as_a_conjunction() {
    let text = parse(json!({"type": "text", "field": "name", "operator": "contains", "value": "a"}));
    let number = parse(json!({"type": "number", "field": "age", "min": 30, "max": null}));

    let rows = apply_filters(people(), &[text, number]);

    // "a" matches Alice and Cara; the age bound then drops Cara.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].columns["name"], json!("Alice"));
}

#[test]
fn blank_field_spec_is_skipped() {
    let spec = parse(json!({"type": "text", "field": "", "operator": "contains", "value": "zzz"}));

    assert_eq!(apply_filters(people(), &[spec]).len(), 3);
}
