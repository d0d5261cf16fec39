//! Arithmetic tools: `code_executor` and `financial_calculator`
//!
//! Both evaluate a short arithmetic expression with Python-style numeric
//! semantics (`/` is true division, `//` floors, `%` takes the divisor's
//! sign, `**` binds tighter than unary minus). Nothing else is evaluated.

use async_trait::async_trait;
use crewline_core::tool::{string_input, SchemaBuilder};
use crewline_core::{Result, Tool, ToolResult};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Expressions must be shorter than this many characters
pub const MAX_EXPRESSION_CHARS: usize = 100;

const FORBIDDEN: &[&str] = &["import", "exec", "__"];

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("expression is empty")]
    Empty,

    #[error("expression is too long")]
    TooLong,

    #[error("forbidden term `{0}`")]
    Forbidden(&'static str),

    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 => {
                write!(f, "{:.1}", x)
            }
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Num(Number),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Num(n) => return write!(f, "number {}", n),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::DoubleSlash => "//",
            Token::Percent => "%",
            Token::Power => "**",
            Token::LParen => "(",
            Token::RParen => ")",
        };
        write!(f, "`{}`", text)
    }
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' => {
                chars.next();
            }
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' || d == '_' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Num(parse_number(&literal)?));
            }
            '+' | '-' | '%' | '(' | ')' => {
                chars.next();
                tokens.push(match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    _ => Token::RParen,
                });
            }
            '*' => {
                chars.next();
                if chars.next_if_eq(&'*').is_some() {
                    tokens.push(Token::Power);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                if chars.next_if_eq(&'/').is_some() {
                    tokens.push(Token::DoubleSlash);
                } else {
                    tokens.push(Token::Slash);
                }
            }
            other => return Err(CalcError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str) -> std::result::Result<Number, CalcError> {
    let invalid = || CalcError::InvalidNumber(literal.to_string());
    if literal.starts_with('_') || literal.ends_with('_') || literal.contains("__") {
        return Err(invalid());
    }
    let cleaned = literal.replace('_', "");

    if cleaned.contains('.') {
        cleaned.parse::<f64>().map(Number::Float).map_err(|_| invalid())
    } else {
        cleaned.parse::<i64>().map(Number::Int).map_err(|_| invalid())
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expr(&mut self) -> std::result::Result<Number, CalcError> {
        let mut value = self.term()?;
        while let Some(op @ (Token::Plus | Token::Minus)) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            value = binary(op, value, rhs)?;
        }
        Ok(value)
    }

    fn term(&mut self) -> std::result::Result<Number, CalcError> {
        let mut value = self.unary()?;
        while let Some(op @ (Token::Star | Token::Slash | Token::DoubleSlash | Token::Percent)) =
            self.peek()
        {
            self.pos += 1;
            let rhs = self.unary()?;
            value = binary(op, value, rhs)?;
        }
        Ok(value)
    }

    fn unary(&mut self) -> std::result::Result<Number, CalcError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                match self.unary()? {
                    Number::Int(i) => i.checked_neg().map(Number::Int).ok_or(CalcError::Overflow),
                    Number::Float(f) => Ok(Number::Float(-f)),
                }
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> std::result::Result<Number, CalcError> {
        let base = self.atom()?;
        if self.peek() == Some(Token::Power) {
            self.pos += 1;
            let exponent = self.unary()?;
            return binary(Token::Power, base, exponent);
        }
        Ok(base)
    }

    fn atom(&mut self) -> std::result::Result<Number, CalcError> {
        match self.next() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.next() {
                    Some(Token::RParen) => Ok(value),
                    Some(other) => Err(CalcError::UnexpectedToken(other.to_string())),
                    None => Err(CalcError::UnexpectedEnd),
                }
            }
            Some(other) => Err(CalcError::UnexpectedToken(other.to_string())),
            None => Err(CalcError::UnexpectedEnd),
        }
    }
}

fn binary(op: Token, lhs: Number, rhs: Number) -> std::result::Result<Number, CalcError> {
    use Number::{Float, Int};

    let ints = match (lhs, rhs) {
        (Int(a), Int(b)) => Some((a, b)),
        _ => None,
    };
    let (x, y) = (lhs.as_f64(), rhs.as_f64());

    match op {
        Token::Plus => Ok(match ints {
            Some((a, b)) => Int(a.checked_add(b).ok_or(CalcError::Overflow)?),
            None => Float(x + y),
        }),
        Token::Minus => Ok(match ints {
            Some((a, b)) => Int(a.checked_sub(b).ok_or(CalcError::Overflow)?),
            None => Float(x - y),
        }),
        Token::Star => Ok(match ints {
            Some((a, b)) => Int(a.checked_mul(b).ok_or(CalcError::Overflow)?),
            None => Float(x * y),
        }),
        Token::Slash => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            Ok(Float(x / y))
        }
        Token::DoubleSlash => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            Ok(match ints {
                Some((a, b)) => {
                    let q = a.checked_div(b).ok_or(CalcError::Overflow)?;
                    Int(if a % b != 0 && ((a < 0) != (b < 0)) { q - 1 } else { q })
                }
                None => Float((x / y).floor()),
            })
        }
        Token::Percent => {
            if rhs.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            Ok(match ints {
                Some((a, b)) => {
                    let r = a.checked_rem(b).ok_or(CalcError::Overflow)?;
                    Int(if r != 0 && ((r < 0) != (b < 0)) { r + b } else { r })
                }
                None => Float(x - y * (x / y).floor()),
            })
        }
        Token::Power => match ints {
            Some((a, b)) if b >= 0 => {
                let exp = u32::try_from(b).map_err(|_| CalcError::Overflow)?;
                a.checked_pow(exp).map(Int).ok_or(CalcError::Overflow)
            }
            _ => {
                if lhs.is_zero() && y < 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(Float(x.powf(y)))
            }
        },
        other => Err(CalcError::UnexpectedToken(other.to_string())),
    }
}

/// Evaluate `expression` after the length and forbidden-term checks
pub fn evaluate(expression: &str) -> std::result::Result<Number, CalcError> {
    if expression.chars().count() >= MAX_EXPRESSION_CHARS {
        return Err(CalcError::TooLong);
    }
    if let Some(term) = FORBIDDEN.iter().find(|t| expression.contains(*t)) {
        return Err(CalcError::Forbidden(*term));
    }

    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Empty);
    }

    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    match parser.peek() {
        None => Ok(value),
        Some(token) => Err(CalcError::UnexpectedToken(token.to_string())),
    }
}

/// Arithmetic for the general roster
pub struct CodeExecutorTool;

#[async_trait]
impl Tool for CodeExecutorTool {
    fn name(&self) -> &str {
        "code_executor"
    }

    fn description(&self) -> &str {
        "Evaluate arithmetic expressions for calculations and data processing."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::single_string("code", "Arithmetic expression to evaluate")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let Some(code) = string_input(&input, "code") else {
            return Ok(ToolResult::error("Code error: no expression given"));
        };

        Ok(match evaluate(code) {
            Ok(value) => ToolResult::success(format!("Code result: {}", value)),
            Err(CalcError::TooLong | CalcError::Forbidden(_)) => {
                ToolResult::error("Code execution disabled for safety")
            }
            Err(e) => ToolResult::error(format!("Code error: {}", e)),
        })
    }
}

/// Projections for the wealth advisory roster.
///
/// Anything that is not plain arithmetic gets the standard Monte Carlo
/// projection report.
pub struct FinancialCalculatorTool;

fn monte_carlo_projection(calculation: &str) -> String {
    format!(
        r#"Financial Projection for: {}

Monte Carlo Simulation (1000 iterations):
- Expected Return (median): 7.2% annually
- 25th Percentile: 4.1%
- 75th Percentile: 10.8%
- Probability of Meeting Goal: 78%

Projected Portfolio Value (10 years):
- Conservative: $1,480,000
- Expected: $1,970,000
- Optimistic: $2,590,000"#,
        calculation
    )
}

#[async_trait]
impl Tool for FinancialCalculatorTool {
    fn name(&self) -> &str {
        "financial_calculator"
    }

    fn description(&self) -> &str {
        "Execute financial projections, Monte Carlo simulations, and scenario analysis."
    }

    fn input_schema(&self) -> Value {
        SchemaBuilder::single_string("calculation", "Calculation or projection to run")
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let Some(calculation) = string_input(&input, "calculation") else {
            return Ok(ToolResult::error("No calculation given"));
        };

        Ok(match evaluate(calculation) {
            Ok(value) => ToolResult::success(format!("Financial calculation result: {}", value)),
            Err(CalcError::TooLong | CalcError::Forbidden(_)) => {
                ToolResult::error("Calculation disabled for safety")
            }
            Err(e) => {
                tracing::debug!(error = %e, "not arithmetic, returning projection");
                ToolResult::success(monte_carlo_projection(calculation))
            }
        })
    }
}
