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

//! Logic-expression evaluation over preview rows: boolean composition,
//! textual operators, and the degrade-to-false error policy.

use serde_json::json;

use glance::{evaluate_logic, flatten_value, GlColumns, GlLogicFilter};

fn columns(record: serde_json::Value) -> GlColumns {
    flatten_value(&record)
}

#[test]
fn and_of_comparisons_selects_matching_rows() {
    let expression = "(amt > 5) AND (custId = 10)";
    let rows = [
        json!({"amt": 5, "custId": 10}),
        json!({"amt": 7, "custId": 10}),
        json!({"amt": 7, "custId": 11}),
    ];

    let survivors: Vec<bool> = rows
        .iter()
        .map(|row| evaluate_logic(&columns(row.clone()), expression))
        .collect();

    assert_eq!(survivors, vec![false, true, false]);
}

#[test]
fn blank_expression_is_the_identity_filter() {
    assert!(evaluate_logic(&columns(json!({"amt": 1})), ""));
    assert!(evaluate_logic(&columns(json!({"amt": 1})), "   "));
}

#[test]
fn broken_expression_rejects_every_row() {
    let filter = GlLogicFilter::compile("amt >");
    assert!(!filter.matches(&columns(json!({"amt": 99}))));
}

#[test]
fn evaluation_error_excludes_the_row() {
    // Arithmetic on a non-numeric operand fails; the row is excluded,
    // not the whole pass.
    let filter = GlLogicFilter::compile("amt * 2 > 5");
    assert!(filter.matches(&columns(json!({"amt": 4}))));
    assert!(!filter.matches(&columns(json!({"amt": {"nested": true}}))));
}

#[test]
fn single_equals_is_strict_equality() {
    assert!(evaluate_logic(&columns(json!({"name": "Alice"})), "name = 'Alice'"));
    assert!(!evaluate_logic(&columns(json!({"name": "Alice"})), "name = 'alice'"));
    assert!(evaluate_logic(&columns(json!({"n": 10})), "n = 10"));
}

#[test]
fn textual_operators_are_case_sensitive() {
    let cols = columns(json!({"name": "Alice"}));
    assert!(evaluate_logic(&cols, "name CONTAINS 'lic'"));
    assert!(!evaluate_logic(&cols, "name CONTAINS 'LIC'"));
    assert!(evaluate_logic(&cols, "name STARTS WITH 'Al'"));
    assert!(evaluate_logic(&cols, "name ENDS WITH 'ce'"));
    assert!(!evaluate_logic(&cols, "name STARTS WITH 'al'"));
}

#[test]
fn missing_field_coerces_to_empty_string_for_text_tests() {
    let cols = columns(json!({"other": 1}));
    assert!(!evaluate_logic(&cols, "name CONTAINS 'a'"));
    assert!(evaluate_logic(&cols, "name STARTS WITH ''"));
}

#[test]
fn not_binds_looser_than_comparison() {
    let cols = columns(json!({"amt": 3}));
    // NOT (amt > 5), not (NOT amt) > 5.
    assert!(evaluate_logic(&cols, "NOT amt > 5"));
    assert!(!evaluate_logic(&cols, "NOT amt < 5"));
}

#[test]
fn keywords_are_case_insensitive() {
    let cols = columns(json!({"amt": 7}));
    assert!(evaluate_logic(&cols, "amt > 5 and amt < 10"));
    assert!(evaluate_logic(&cols, "amt > 100 or amt > 5"));
    assert!(evaluate_logic(&cols, "not amt > 100"));
}

#[test]
fn null_and_undefined_compare_equal_to_missing() {
    let cols = columns(json!({"gone": null}));
    assert!(evaluate_logic(&cols, "gone = null"));
    assert!(evaluate_logic(&cols, "absent = undefined"));
    assert!(!evaluate_logic(&cols, "gone != null"));
}

#[test]
fn dotted_field_references_resolve() {
    let cols = columns(json!({"customer": {"tier": "gold"}}));
    assert!(evaluate_logic(&cols, "customer.tier = 'gold'"));
}
