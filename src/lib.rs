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

//! # Glance Core Library
//!
//! The in-memory analytical engine behind the Glance dashboard builder.
//! A host application hands it raw JSON records from whatever datasets
//! the user selected; the engine joins, derives, filters, and shapes
//! them into the preview row-set the dashboard renders. Everything runs
//! synchronously over an in-memory sample; only source fetching is
//! async.
//!
//! ## Module Overview
//!
//! - **record**: the flattened preview row and named row-set containers
//! - **paths**: dotted-path resolution, flattening, value-kind detection
//! - **expr**: the shared expression language (lexer, parser, AST,
//!   evaluator) used by calculated fields and logic rules
//! - **calc**: calculated-field application, row-level and column-level
//! - **logic**: boolean logic rules over preview rows
//! - **join**: multi-step, multi-type joins across named row-sets
//! - **filter**: typed filters (text, number, date, dropdown, regex)
//! - **source**: the async data-source trait and the generation-guarded
//!   row cache
//! - **config**: the persisted dashboard configuration
//! - **pipeline**: the preview pass that strings the stages together,
//!   plus free-text search and chart grouping helpers
//! - **errors**: the `GlError` type shared by every module
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glance::{GlDashboardConfig, GlPreviewPipeline};
//!
//! let config = GlDashboardConfig::from_value(saved_json)?;
//! let mut pipeline = GlPreviewPipeline::new(config);
//! pipeline.refresh_sources(&host_source).await;
//! let preview = pipeline.run();
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, GlError>`. User-authored
//! expressions degrade instead of failing the pass: a broken
//! calculated field yields null, a broken logic rule rejects rows, and
//! both are logged.

pub mod errors;
pub mod paths;
pub mod record;

pub mod expr;

pub mod calc;
pub mod config;
pub mod filter;
pub mod join;
pub mod logic;
pub mod pipeline;
pub mod source;

pub use errors::{GlError, Result};
pub use record::{GlColumns, GlNamedRowSets, GlRow, GlRowSet};

pub use paths::{detect_kind, flatten_value, parse_date, resolve_flat, resolve_path, GlValueKind};

pub use expr::{
    eval_expr, is_truthy, parse_expression, to_display_string, to_number, GlBinaryOp, GlExpr,
    GlFunc, GlUnaryOp,
};

pub use calc::{apply_calculated_fields, GlCalculatedField};
pub use config::{GlAggregation, GlChartSpec, GlDashboardConfig};
pub use filter::{apply_filters, GlFilterSpec, GlTextOperator};
pub use join::{canonical_key, join_row_sets, GlJoinSpec, GlJoinType, GL_SAMPLE_LIMIT};
pub use logic::{evaluate_logic, GlLogicFilter, GlLogicRule};
pub use pipeline::{group_for_chart, search_rows, GlPreviewPipeline};
pub use source::{GlDataSource, GlSourceCache, GL_UPLOADED_TABLE_KEY};
