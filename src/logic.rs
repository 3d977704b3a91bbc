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

//! # Glance Logic Rules
//!
//! Boolean expressions used as reusable row predicates. A saved rule is
//! a named expression; the dashboard editor additionally holds one
//! unsaved "active" expression. The pipeline ANDs all of them together.
//!
//! Policy: a blank expression is the identity filter (keeps every row);
//! a compile error or a per-row evaluation error excludes the row and
//! is logged, never propagated.

use serde::{Deserialize, Serialize};

use crate::expr::{eval_expr, is_truthy, parse_expression, GlExpr};
use crate::record::GlColumns;

/// A saved, named boolean expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlLogicRule {
    pub name: String,
    pub expression: String,
}

enum Compiled {
    /// Blank expression: identity filter.
    Pass,
    /// Compile failure: excludes every row.
    Reject,
    Expr(GlExpr),
}

/// A logic expression compiled once and applied per row.
pub struct GlLogicFilter {
    compiled: Compiled,
}

impl GlLogicFilter {
    /// Compiles an expression string into a reusable predicate.
    pub fn compile(expression: &str) -> Self {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return GlLogicFilter {
                compiled: Compiled::Pass,
            };
        }
        match parse_expression(trimmed) {
            Ok(expr) => GlLogicFilter {
                compiled: Compiled::Expr(expr),
            },
            Err(err) => {
                log::warn!("logic expression failed to compile: {err}");
                GlLogicFilter {
                    compiled: Compiled::Reject,
                }
            }
        }
    }

    /// Evaluates the predicate for one row. Errors exclude the row.
    pub fn matches(&self, columns: &GlColumns) -> bool {
        match &self.compiled {
            Compiled::Pass => true,
            Compiled::Reject => false,
            Compiled::Expr(expr) => match eval_expr(expr, columns) {
                Ok(value) => is_truthy(&value),
                Err(err) => {
                    log::debug!("logic expression failed on a row: {err}");
                    false
                }
            },
        }
    }
}

/// One-shot convenience: compile and evaluate against a single row.
pub fn evaluate_logic(columns: &GlColumns, expression: &str) -> bool {
    GlLogicFilter::compile(expression).matches(columns)
}
