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

//! # Glance Expression Module
//!
//! User expressions (calculated fields and logic rules) are parsed
//! into a small typed AST and interpreted directly. No host-language
//! code is ever generated from user input; the only callable functions
//! are the allow-listed helpers `SUM`, `AVG`, `LEN`, and `IF`.
//!
//! The surface language supports arithmetic, comparisons (a single `=`
//! means strict equality, never assignment), boolean connectives in
//! both symbolic (`&&`, `||`, `!`) and textual (`AND`, `OR`, `NOT`)
//! form, and the textual string operators `CONTAINS`, `STARTS WITH`,
//! and `ENDS WITH`. Identifiers may contain dots and resolve as field
//! references against the current row.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;

pub use ast::{GlBinaryOp, GlExpr, GlFunc, GlUnaryOp};
pub use eval::{eval_expr, is_truthy, to_display_string, to_number};
pub use parser::parse_expression;
