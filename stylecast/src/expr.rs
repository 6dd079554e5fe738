// Copyright 2025 the Stylecast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Expression evaluation over per-document custom data.
//!
//! Expressions are a small, side-effect-free language: literals, bare
//! identifiers resolved in the [`CustomData`] map, unary `!` and `-`,
//! arithmetic, comparisons, `&&`/`||`, and the `?:` conditional. Each
//! evaluation reads the data afresh; nothing persists between
//! evaluations.
//!
//! The semantics lean on the conventions of the attribute surface this
//! serves: empty strings, zero, NaN, and null are falsy; `+` concatenates
//! when either side is a string; other arithmetic and mixed comparisons
//! coerce operands to numbers (non-numeric strings become NaN, and NaN
//! comparisons are false). Equality never coerces. `&&` and `||` return
//! the deciding operand, not a boolean. An identifier missing from the
//! data map is an evaluation error, not a silent null.
//!
//! String literals use single or double quotes and have no escape
//! sequences.
//!
//! # Example
//!
//! ```
//! use stylecast::{evaluate, CustomData, Value};
//!
//! let mut data = CustomData::new();
//! data.insert("count".into(), Value::Number(3.0));
//!
//! let value = evaluate("count > 2 ? 'red' : 'blue'", &data).unwrap();
//! assert_eq!(value, Value::Str("red".into()));
//! ```

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::cmp::Ordering;
use core::fmt;

use hashbrown::HashMap;

/// A runtime value: an expression result or a [`CustomData`] entry.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The absent value. Falsy.
    Null,
    /// A boolean.
    Bool(bool),
    /// A double-precision number. Zero and NaN are falsy.
    Number(f64),
    /// A string. The empty string is falsy.
    Str(String),
}

impl Value {
    /// Returns `true` if the value counts as true in a condition.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric coercion used by arithmetic and mixed comparisons.
    fn as_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Number(n) => *n,
            Self::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// The per-document data map expressions read their identifiers from.
pub type CustomData = HashMap<String, Value>;

/// Error from parsing or evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprError {
    /// The source text is not a well-formed expression.
    Parse {
        /// Byte offset where parsing stopped.
        offset: usize,
        /// What was rejected or expected.
        message: &'static str,
    },
    /// An identifier is not a key in the custom data.
    UnknownIdentifier(String),
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { offset, message } => {
                write!(f, "expression parse error at byte {offset}: {message}")
            }
            Self::UnknownIdentifier(name) => write!(f, "unknown identifier `{name}`"),
        }
    }
}

impl core::error::Error for ExprError {}

/// A parsed expression, evaluatable any number of times.
#[derive(Clone, Debug)]
pub struct Expression {
    root: Expr,
}

impl Expression {
    /// Parses expression source text.
    pub fn parse(source: &str) -> Result<Self, ExprError> {
        let mut parser = Parser::new(source);
        parser.skip_whitespace();
        let root = parse_conditional(&mut parser)?;
        parser.skip_whitespace();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(Self { root })
    }

    /// Evaluates the expression against `data`.
    pub fn evaluate(&self, data: &CustomData) -> Result<Value, ExprError> {
        eval(&self.root, data)
    }
}

/// Parses and evaluates `source` in one step.
pub fn evaluate(source: &str, data: &CustomData) -> Result<Value, ExprError> {
    Expression::parse(source)?.evaluate(data)
}

// ----- syntax tree -----

#[derive(Clone, Debug)]
enum Expr {
    Literal(Value),
    Ident(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Copy, Clone, Debug)]
enum UnaryOp {
    Not,
    Negate,
}

#[derive(Copy, Clone, Debug)]
enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

// ----- evaluation -----

fn eval(expr: &Expr, data: &CustomData) -> Result<Value, ExprError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Ident(name) => data
            .get(name)
            .cloned()
            .ok_or_else(|| ExprError::UnknownIdentifier(name.clone())),
        Expr::Unary(op, operand) => {
            let value = eval(operand, data)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!value.truthy()),
                UnaryOp::Negate => Value::Number(-value.as_number()),
            })
        }
        Expr::Binary(op, lhs, rhs) => eval_binary(*op, lhs, rhs, data),
        Expr::Conditional {
            condition,
            then,
            otherwise,
        } => {
            if eval(condition, data)?.truthy() {
                eval(then, data)
            } else {
                eval(otherwise, data)
            }
        }
    }
}

fn eval_binary(
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
    data: &CustomData,
) -> Result<Value, ExprError> {
    // Short-circuit forms return the deciding operand.
    match op {
        BinaryOp::Or => {
            let left = eval(lhs, data)?;
            return if left.truthy() { Ok(left) } else { eval(rhs, data) };
        }
        BinaryOp::And => {
            let left = eval(lhs, data)?;
            return if left.truthy() { eval(rhs, data) } else { Ok(left) };
        }
        _ => {}
    }

    let left = eval(lhs, data)?;
    let right = eval(rhs, data)?;
    Ok(match op {
        BinaryOp::Or | BinaryOp::And => unreachable!("handled above"),
        BinaryOp::Eq => Value::Bool(left == right),
        BinaryOp::Ne => Value::Bool(left != right),
        BinaryOp::Lt => Value::Bool(matches!(order(&left, &right), Some(Ordering::Less))),
        BinaryOp::Le => Value::Bool(matches!(
            order(&left, &right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(matches!(order(&left, &right), Some(Ordering::Greater))),
        BinaryOp::Ge => Value::Bool(matches!(
            order(&left, &right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Add => {
            if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
                Value::Str(alloc::format!("{left}{right}"))
            } else {
                Value::Number(left.as_number() + right.as_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.as_number() - right.as_number()),
        BinaryOp::Mul => Value::Number(left.as_number() * right.as_number()),
        BinaryOp::Div => Value::Number(left.as_number() / right.as_number()),
        BinaryOp::Rem => Value::Number(left.as_number() % right.as_number()),
    })
}

/// Relational ordering: lexicographic when both sides are strings,
/// numeric otherwise. `None` when a numeric side is NaN.
fn order(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Value::Str(a), Value::Str(b)) = (left, right) {
        return Some(a.cmp(b));
    }
    left.as_number().partial_cmp(&right.as_number())
}

// ----- parser -----

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_token(&mut self, token: &str) -> bool {
        if self.src[self.pos..].starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'$' {
                self.pos += 1;
            } else {
                break;
            }
        }
        (self.pos != start).then(|| &self.src[start..self.pos])
    }

    fn quoted(&mut self, quote: u8) -> Result<&'a str, ExprError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b == quote {
                let value = &self.src[start..self.pos];
                self.pos += 1;
                return Ok(value);
            }
            self.pos += 1;
        }
        Err(self.error("unterminated string"))
    }

    fn number(&mut self) -> Result<f64, ExprError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.eat(b'.') {
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.peek().is_some_and(|b| b.is_ascii_digit()) {
                while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.pos = mark;
            }
        }
        self.src[start..self.pos].parse().map_err(|_| ExprError::Parse {
            offset: start,
            message: "invalid number",
        })
    }

    fn error(&self, message: &'static str) -> ExprError {
        ExprError::Parse {
            offset: self.pos,
            message,
        }
    }
}

fn parse_conditional(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let condition = parse_or(parser)?;
    parser.skip_whitespace();
    if !parser.eat(b'?') {
        return Ok(condition);
    }
    parser.skip_whitespace();
    let then = parse_conditional(parser)?;
    parser.skip_whitespace();
    if !parser.eat(b':') {
        return Err(parser.error("expected ':' in conditional"));
    }
    parser.skip_whitespace();
    let otherwise = parse_conditional(parser)?;
    Ok(Expr::Conditional {
        condition: Box::new(condition),
        then: Box::new(then),
        otherwise: Box::new(otherwise),
    })
}

fn parse_or(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_and(parser)?;
    loop {
        parser.skip_whitespace();
        if !parser.eat_token("||") {
            return Ok(lhs);
        }
        parser.skip_whitespace();
        let rhs = parse_and(parser)?;
        lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_and(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_equality(parser)?;
    loop {
        parser.skip_whitespace();
        if !parser.eat_token("&&") {
            return Ok(lhs);
        }
        parser.skip_whitespace();
        let rhs = parse_equality(parser)?;
        lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_equality(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_comparison(parser)?;
    loop {
        parser.skip_whitespace();
        let op = if parser.eat_token("==") {
            BinaryOp::Eq
        } else if parser.eat_token("!=") {
            BinaryOp::Ne
        } else {
            return Ok(lhs);
        };
        parser.skip_whitespace();
        let rhs = parse_comparison(parser)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_comparison(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_additive(parser)?;
    loop {
        parser.skip_whitespace();
        let op = if parser.eat_token("<=") {
            BinaryOp::Le
        } else if parser.eat_token(">=") {
            BinaryOp::Ge
        } else if parser.eat(b'<') {
            BinaryOp::Lt
        } else if parser.eat(b'>') {
            BinaryOp::Gt
        } else {
            return Ok(lhs);
        };
        parser.skip_whitespace();
        let rhs = parse_additive(parser)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_additive(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_multiplicative(parser)?;
    loop {
        parser.skip_whitespace();
        let op = if parser.eat(b'+') {
            BinaryOp::Add
        } else if parser.eat(b'-') {
            BinaryOp::Sub
        } else {
            return Ok(lhs);
        };
        parser.skip_whitespace();
        let rhs = parse_multiplicative(parser)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_multiplicative(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    let mut lhs = parse_unary(parser)?;
    loop {
        parser.skip_whitespace();
        let op = if parser.eat(b'*') {
            BinaryOp::Mul
        } else if parser.eat(b'/') {
            BinaryOp::Div
        } else if parser.eat(b'%') {
            BinaryOp::Rem
        } else {
            return Ok(lhs);
        };
        parser.skip_whitespace();
        let rhs = parse_unary(parser)?;
        lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
    }
}

fn parse_unary(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    parser.skip_whitespace();
    if parser.eat(b'!') {
        return Ok(Expr::Unary(UnaryOp::Not, Box::new(parse_unary(parser)?)));
    }
    if parser.eat(b'-') {
        return Ok(Expr::Unary(UnaryOp::Negate, Box::new(parse_unary(parser)?)));
    }
    parse_primary(parser)
}

fn parse_primary(parser: &mut Parser<'_>) -> Result<Expr, ExprError> {
    parser.skip_whitespace();
    match parser.peek() {
        Some(b'(') => {
            parser.pos += 1;
            let inner = parse_conditional(parser)?;
            parser.skip_whitespace();
            if !parser.eat(b')') {
                return Err(parser.error("expected ')'"));
            }
            Ok(inner)
        }
        Some(quote @ (b'"' | b'\'')) => {
            parser.pos += 1;
            let text = parser.quoted(quote)?;
            Ok(Expr::Literal(Value::Str(text.to_string())))
        }
        Some(b) if b.is_ascii_digit() || b == b'.' => {
            Ok(Expr::Literal(Value::Number(parser.number()?)))
        }
        Some(b) if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => {
            let Some(name) = parser.ident() else {
                return Err(parser.error("expected expression"));
            };
            Ok(match name {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                _ => Expr::Ident(name.to_string()),
            })
        }
        _ => Err(parser.error("expected expression")),
    }
}
