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

//! # Glance Error Module
//!
//! Error types and utilities used throughout the Glance engine.
//!
//! ## Error Handling Philosophy
//!
//! No error raised inside the preview pipeline is fatal to the host
//! process. The engine distinguishes two tiers:
//!
//! - **Configuration-time errors** (`Validation`, `Serde`) surface as
//!   `Result` values to the caller rehydrating a dashboard.
//! - **Evaluation-time errors** (`Expression`, `Source`) are caught at
//!   the stage boundary and degrade to a per-row `null`, a `false`
//!   predicate, or an empty row-set. The original error is logged for
//!   diagnosis but never aborts a preview pass.
//!
//! ## Error Categories
//!
//! - **Expression**: a calculated-field or logic expression failed to
//!   parse or evaluate
//! - **Validation**: invalid parameters or configuration shapes
//! - **Source**: an external dataset fetch rejected
//! - **Serde**: serialization/deserialization issues
//! - **Internal**: unexpected internal failures

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience result type used throughout Glance.
pub type Result<T> = std::result::Result<T, GlError>;

/// Canonical error enumeration for the Glance engine.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum GlError {
    /// A user-supplied expression failed to parse or evaluate.
    #[error("expression error in '{expression}': {message}")]
    Expression { expression: String, message: String },

    /// Validation errors triggered by invalid parameters or inputs.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// An external dataset fetch rejected.
    #[error("source '{source_id}' failed: {message}")]
    Source { source_id: String, message: String },

    /// Wrapper for serde-style serialization issues.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Catch-all variant for unexpected situations.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for GlError {
    fn from(err: serde_json::Error) -> Self {
        GlError::Serde(err.to_string())
    }
}

impl GlError {
    /// Helper to construct expression errors.
    pub fn expression(expression: impl Into<String>, message: impl Into<String>) -> Self {
        GlError::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Helper to construct simple validation errors.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        GlError::Validation {
            message: message.into(),
        }
    }

    /// Helper to construct source fetch errors.
    pub fn source(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        GlError::Source {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Helper to construct internal errors.
    pub fn internal<T: Into<String>>(message: T) -> Self {
        GlError::Internal(message.into())
    }
}
