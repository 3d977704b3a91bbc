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

/// Lexical token of the expression language.
#[derive(Clone, Debug, PartialEq)]
pub enum GlToken {
    Number(f64),
    Str(String),
    /// Identifier, possibly dotted (`customer.address.city`).
    Ident(String),
    True,
    False,
    Null,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    /// `=` and `==` both mean strict equality.
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
    Contains,
    StartsWith,
    EndsWith,
}

/// Tokenizes an expression source string.
///
/// Keyword operators (`AND`, `OR`, `NOT`, `CONTAINS`, `STARTS WITH`,
/// `ENDS WITH`) match case-insensitively. The reserved literals `true`,
/// `false`, `null`, `undefined`, `NaN`, and `Infinity` never become
/// field references.
pub fn tokenize(source: &str) -> Result<Vec<GlToken>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let ch = chars[pos];
        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        match ch {
            '(' => {
                tokens.push(GlToken::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(GlToken::RParen);
                pos += 1;
            }
            ',' => {
                tokens.push(GlToken::Comma);
                pos += 1;
            }
            '+' => {
                tokens.push(GlToken::Plus);
                pos += 1;
            }
            '-' => {
                tokens.push(GlToken::Minus);
                pos += 1;
            }
            '*' => {
                tokens.push(GlToken::Star);
                pos += 1;
            }
            '/' => {
                tokens.push(GlToken::Slash);
                pos += 1;
            }
            '%' => {
                tokens.push(GlToken::Percent);
                pos += 1;
            }
            '=' => {
                // Either `=` or `==`, both strict equality.
                pos += if chars.get(pos + 1) == Some(&'=') { 2 } else { 1 };
                tokens.push(GlToken::Eq);
            }
            '!' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(GlToken::Ne);
                    pos += 2;
                } else {
                    tokens.push(GlToken::Not);
                    pos += 1;
                }
            }
            '<' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(GlToken::Le);
                    pos += 2;
                } else {
                    tokens.push(GlToken::Lt);
                    pos += 1;
                }
            }
            '>' => {
                if chars.get(pos + 1) == Some(&'=') {
                    tokens.push(GlToken::Ge);
                    pos += 2;
                } else {
                    tokens.push(GlToken::Gt);
                    pos += 1;
                }
            }
            '&' => {
                if chars.get(pos + 1) == Some(&'&') {
                    tokens.push(GlToken::And);
                    pos += 2;
                } else {
                    return Err(GlError::expression(source, "unexpected '&'"));
                }
            }
            '|' => {
                if chars.get(pos + 1) == Some(&'|') {
                    tokens.push(GlToken::Or);
                    pos += 2;
                } else {
                    return Err(GlError::expression(source, "unexpected '|'"));
                }
            }
            '"' | '\'' => {
                let (literal, next) = scan_string(&chars, pos, source)?;
                tokens.push(GlToken::Str(literal));
                pos = next;
            }
            _ if ch.is_ascii_digit() => {
                let (number, next) = scan_number(&chars, pos, source)?;
                tokens.push(GlToken::Number(number));
                pos = next;
            }
            _ if is_ident_start(ch) => {
                let (word, next) = scan_ident(&chars, pos);
                pos = next;
                tokens.push(keyword_or_ident(word, &chars, &mut pos, source)?);
            }
            _ => {
                return Err(GlError::expression(
                    source,
                    format!("unexpected character '{ch}'"),
                ));
            }
        }
    }

    Ok(tokens)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn scan_string(chars: &[char], start: usize, source: &str) -> Result<(String, usize)> {
    let quote = chars[start];
    let mut literal = String::new();
    let mut pos = start + 1;
    while pos < chars.len() {
        let ch = chars[pos];
        if ch == '\\' {
            match chars.get(pos + 1) {
                Some(&escaped) => {
                    literal.push(escaped);
                    pos += 2;
                }
                None => return Err(GlError::expression(source, "dangling escape")),
            }
        } else if ch == quote {
            return Ok((literal, pos + 1));
        } else {
            literal.push(ch);
            pos += 1;
        }
    }
    Err(GlError::expression(source, "unterminated string literal"))
}

fn scan_number(chars: &[char], start: usize, source: &str) -> Result<(f64, usize)> {
    let mut pos = start;
    let mut text = String::new();
    while pos < chars.len() && chars[pos].is_ascii_digit() {
        text.push(chars[pos]);
        pos += 1;
    }
    // Fractional part only when the dot is followed by a digit, so that
    // a dotted field path starting right after a number still errors
    // loudly instead of mis-lexing.
    if pos + 1 < chars.len() && chars[pos] == '.' && chars[pos + 1].is_ascii_digit() {
        text.push('.');
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            text.push(chars[pos]);
            pos += 1;
        }
    }
    let number = text
        .parse::<f64>()
        .map_err(|err| GlError::expression(source, format!("bad number '{text}': {err}")))?;
    Ok((number, pos))
}

fn scan_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut pos = start;
    let mut word = String::new();
    while pos < chars.len() && is_ident_part(chars[pos]) {
        word.push(chars[pos]);
        pos += 1;
    }
    // Dotted continuation: `a.b.c` is one identifier as long as every
    // dot is immediately followed by another identifier segment.
    while pos + 1 < chars.len() && chars[pos] == '.' && is_ident_start(chars[pos + 1]) {
        word.push('.');
        pos += 1;
        while pos < chars.len() && is_ident_part(chars[pos]) {
            word.push(chars[pos]);
            pos += 1;
        }
    }
    (word, pos)
}

fn keyword_or_ident(
    word: String,
    chars: &[char],
    pos: &mut usize,
    source: &str,
) -> Result<GlToken> {
    match word.to_ascii_uppercase().as_str() {
        "AND" => Ok(GlToken::And),
        "OR" => Ok(GlToken::Or),
        "NOT" => Ok(GlToken::Not),
        "CONTAINS" => Ok(GlToken::Contains),
        "STARTS" => expect_with(chars, pos, source).map(|_| GlToken::StartsWith),
        "ENDS" => expect_with(chars, pos, source).map(|_| GlToken::EndsWith),
        "TRUE" => Ok(GlToken::True),
        "FALSE" => Ok(GlToken::False),
        "NULL" | "UNDEFINED" => Ok(GlToken::Null),
        "NAN" => Ok(GlToken::Number(f64::NAN)),
        "INFINITY" => Ok(GlToken::Number(f64::INFINITY)),
        _ => Ok(GlToken::Ident(word)),
    }
}

/// Consumes the `WITH` that must follow `STARTS`/`ENDS`.
fn expect_with(chars: &[char], pos: &mut usize, source: &str) -> Result<()> {
    let mut cursor = *pos;
    while cursor < chars.len() && chars[cursor].is_whitespace() {
        cursor += 1;
    }
    if cursor < chars.len() && is_ident_start(chars[cursor]) {
        let (word, next) = scan_ident(chars, cursor);
        if word.eq_ignore_ascii_case("with") {
            *pos = next;
            return Ok(());
        }
    }
    Err(GlError::expression(
        source,
        "expected WITH after STARTS/ENDS",
    ))
}
