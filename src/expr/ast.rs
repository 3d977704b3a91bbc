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

/// Aggregate and utility helpers callable inside expressions.
///
/// This is the complete allow-list; any other call target is a parse
/// error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlFunc {
    Sum,
    Avg,
    Len,
    If,
}

impl GlFunc {
    /// Looks a function up by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(GlFunc::Sum),
            "AVG" => Some(GlFunc::Avg),
            "LEN" => Some(GlFunc::Len),
            "IF" => Some(GlFunc::If),
            _ => None,
        }
    }

    /// Number of arguments the helper requires.
    pub fn arity(self) -> usize {
        match self {
            GlFunc::If => 3,
            _ => 1,
        }
    }

    /// Whether the helper can run as a whole-column aggregate.
    pub fn is_aggregate(self) -> bool {
        matches!(self, GlFunc::Sum | GlFunc::Avg | GlFunc::Len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlUnaryOp {
    /// Boolean negation (`NOT x`, `!x`).
    Not,
    /// Numeric negation (`-x`).
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    /// Strict equality; both `=` and `==` parse to this.
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    /// Case-sensitive substring test on string coercions.
    Contains,
    StartsWith,
    EndsWith,
}

/// Typed expression tree.
///
/// Field references keep their full dotted path; resolution against a
/// row happens at evaluation time, so the same compiled expression is
/// reusable across every row of a pass.
#[derive(Clone, Debug, PartialEq)]
pub enum GlExpr {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Field(String),
    Unary {
        op: GlUnaryOp,
        operand: Box<GlExpr>,
    },
    Binary {
        op: GlBinaryOp,
        lhs: Box<GlExpr>,
        rhs: Box<GlExpr>,
    },
    Call {
        func: GlFunc,
        args: Vec<GlExpr>,
    },
}

impl GlExpr {
    /// Detects the bare aggregate-call shape `FUNC(field)`.
    ///
    /// A calculated field whose entire expression has this shape runs
    /// once over the whole column and broadcasts the scalar; anything
    /// else evaluates per row.
    pub fn as_aggregate_call(&self) -> Option<(GlFunc, &str)> {
        if let GlExpr::Call { func, args } = self {
            if func.is_aggregate() {
                if let [GlExpr::Field(path)] = args.as_slice() {
                    return Some((*func, path.as_str()));
                }
            }
        }
        None
    }
}
