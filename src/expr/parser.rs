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

use crate::errors::{GlError, Result};
use crate::expr::ast::{GlBinaryOp, GlExpr, GlFunc, GlUnaryOp};
use crate::expr::lexer::{tokenize, GlToken};

/// Parses an expression string into its typed AST.
///
/// Precedence, loosest to tightest: `OR`, `AND`, `NOT`, comparisons and
/// textual string operators, additive, multiplicative, unary minus,
/// primary. `NOT` binds looser than comparisons so `NOT amt > 5`
/// negates the whole comparison.
pub fn parse_expression(source: &str) -> Result<GlExpr> {
    let tokens = tokenize(source)?;
    if tokens.is_empty() {
        return Err(GlError::expression(source, "empty expression"));
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        source,
    };
    let expr = parser.parse_or()?;
    if parser.pos != parser.tokens.len() {
        return Err(GlError::expression(
            source,
            format!("unexpected trailing input at token {}", parser.pos),
        ));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: Vec<GlToken>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&GlToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<GlToken> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> GlError {
        GlError::expression(self.source, message)
    }

    fn parse_or(&mut self) -> Result<GlExpr> {
        let mut lhs = self.parse_and()?;
        while self.peek() == Some(&GlToken::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = binary(GlBinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<GlExpr> {
        let mut lhs = self.parse_not()?;
        while self.peek() == Some(&GlToken::And) {
            self.advance();
            let rhs = self.parse_not()?;
            lhs = binary(GlBinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<GlExpr> {
        if self.peek() == Some(&GlToken::Not) {
            self.advance();
            let operand = self.parse_not()?;
            return Ok(GlExpr::Unary {
                op: GlUnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<GlExpr> {
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.peek().and_then(comparison_op) {
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<GlExpr> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(GlToken::Plus) => GlBinaryOp::Add,
                Some(GlToken::Minus) => GlBinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<GlExpr> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(GlToken::Star) => GlBinaryOp::Mul,
                Some(GlToken::Slash) => GlBinaryOp::Div,
                Some(GlToken::Percent) => GlBinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<GlExpr> {
        if self.peek() == Some(&GlToken::Minus) {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(GlExpr::Unary {
                op: GlUnaryOp::Neg,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<GlExpr> {
        match self.advance() {
            Some(GlToken::Number(value)) => Ok(GlExpr::Number(value)),
            Some(GlToken::Str(value)) => Ok(GlExpr::Str(value)),
            Some(GlToken::True) => Ok(GlExpr::Bool(true)),
            Some(GlToken::False) => Ok(GlExpr::Bool(false)),
            Some(GlToken::Null) => Ok(GlExpr::Null),
            Some(GlToken::LParen) => {
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(GlToken::RParen) => Ok(inner),
                    _ => Err(self.error("expected ')'")),
                }
            }
            Some(GlToken::Ident(name)) => {
                if self.peek() == Some(&GlToken::LParen) {
                    self.advance();
                    let func = GlFunc::from_name(&name)
                        .ok_or_else(|| self.error(format!("unknown function '{name}'")))?;
                    let args = self.parse_args()?;
                    if args.len() != func.arity() {
                        return Err(self.error(format!(
                            "{name} expects {} argument(s), got {}",
                            func.arity(),
                            args.len()
                        )));
                    }
                    Ok(GlExpr::Call { func, args })
                } else {
                    Ok(GlExpr::Field(name))
                }
            }
            Some(other) => Err(self.error(format!("unexpected token {other:?}"))),
            None => Err(self.error("unexpected end of expression")),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<GlExpr>> {
        let mut args = Vec::new();
        if self.peek() == Some(&GlToken::RParen) {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_or()?);
            match self.advance() {
                Some(GlToken::Comma) => continue,
                Some(GlToken::RParen) => return Ok(args),
                _ => return Err(self.error("expected ',' or ')' in argument list")),
            }
        }
    }
}

fn binary(op: GlBinaryOp, lhs: GlExpr, rhs: GlExpr) -> GlExpr {
    GlExpr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn comparison_op(token: &GlToken) -> Option<GlBinaryOp> {
    match token {
        GlToken::Eq => Some(GlBinaryOp::Eq),
        GlToken::Ne => Some(GlBinaryOp::Ne),
        GlToken::Lt => Some(GlBinaryOp::Lt),
        GlToken::Le => Some(GlBinaryOp::Le),
        GlToken::Gt => Some(GlBinaryOp::Gt),
        GlToken::Ge => Some(GlBinaryOp::Ge),
        GlToken::Contains => Some(GlBinaryOp::Contains),
        GlToken::StartsWith => Some(GlBinaryOp::StartsWith),
        GlToken::EndsWith => Some(GlBinaryOp::EndsWith),
        _ => None,
    }
}
