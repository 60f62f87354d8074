//! Free-text arithmetic expression evaluation
//!
//! The second-variable phase of the equalization exercise accepts an
//! arithmetic expression (e.g. `"11-6"`) instead of a bare number. The
//! evaluator supports integers, `+ - * /`, parentheses, and unary minus,
//! and computes exact rational values so `"7/2"` compares precisely.
//!
//! Syntax problems and wrong values are deliberately different outcomes:
//! the UI shows a validation message for the former and an
//! incorrect-answer message for the latter.

use crate::math::Fraction;
use serde::Serialize;
use thiserror::Error;

/// Why an expression could not be evaluated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedChar { ch: char, position: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unexpected token at position {position}")]
    UnexpectedToken { position: usize },

    #[error("number is too large")]
    NumberTooLarge,

    #[error("division by zero")]
    DivisionByZero,

    #[error("expression is empty")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Number(i64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, ExpressionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_ascii_whitespace() => {
                chars.next();
            }
            '+' => {
                chars.next();
                tokens.push((Token::Plus, pos));
            }
            '-' => {
                chars.next();
                tokens.push((Token::Minus, pos));
            }
            '*' => {
                chars.next();
                tokens.push((Token::Star, pos));
            }
            '/' => {
                chars.next();
                tokens.push((Token::Slash, pos));
            }
            '(' => {
                chars.next();
                tokens.push((Token::LParen, pos));
            }
            ')' => {
                chars.next();
                tokens.push((Token::RParen, pos));
            }
            c if c.is_ascii_digit() => {
                let mut value: i64 = 0;
                while let Some(&(_, d)) = chars.peek() {
                    if let Some(digit) = d.to_digit(10) {
                        value = value
                            .checked_mul(10)
                            .and_then(|v| v.checked_add(digit as i64))
                            .ok_or(ExpressionError::NumberTooLarge)?;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((Token::Number(value), pos));
            }
            other => {
                return Err(ExpressionError::UnexpectedChar {
                    ch: other,
                    position: pos,
                })
            }
        }
    }

    if tokens.is_empty() {
        return Err(ExpressionError::Empty);
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(_, p)| *p)
            .unwrap_or(usize::MAX)
    }

    // expr := term (('+'|'-') term)*
    fn expr(&mut self) -> Result<Fraction, ExpressionError> {
        let mut value = self.term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.bump();
                    value = value + self.term()?;
                }
                Token::Minus => {
                    self.bump();
                    value = value - self.term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // term := factor (('*'|'/') factor)*
    fn term(&mut self) -> Result<Fraction, ExpressionError> {
        let mut value = self.factor()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.bump();
                    value = value * self.factor()?;
                }
                Token::Slash => {
                    self.bump();
                    let rhs = self.factor()?;
                    value = value
                        .checked_div(rhs)
                        .ok_or(ExpressionError::DivisionByZero)?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    // factor := NUMBER | '(' expr ')' | '-' factor
    fn factor(&mut self) -> Result<Fraction, ExpressionError> {
        match self.bump() {
            Some(Token::Number(n)) => Ok(Fraction::from_integer(n)),
            Some(Token::Minus) => Ok(-self.factor()?),
            Some(Token::LParen) => {
                let value = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(value),
                    Some(_) => Err(ExpressionError::UnexpectedToken {
                        position: self.position(),
                    }),
                    None => Err(ExpressionError::UnexpectedEnd),
                }
            }
            Some(_) => Err(ExpressionError::UnexpectedToken {
                position: self.tokens[self.pos - 1].1,
            }),
            None => Err(ExpressionError::UnexpectedEnd),
        }
    }
}

/// Evaluate an arithmetic expression to an exact rational value
pub fn evaluate(input: &str) -> Result<Fraction, ExpressionError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExpressionError::UnexpectedToken {
            position: parser.position(),
        });
    }
    Ok(value)
}

/// Outcome of checking a free-text answer against the expected weight
///
/// `Invalid` reports a syntax problem (shown as a validation message);
/// `Incorrect` means the expression parsed but its value is wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InputCheck {
    Correct,
    Incorrect { value: Fraction },
    Invalid { message: String },
}

/// Check a free-text expression against an expected integer weight
pub fn check_against(input: &str, expected: i64) -> InputCheck {
    match evaluate(input) {
        Ok(value) if value == Fraction::from_integer(expected) => InputCheck::Correct,
        Ok(value) => InputCheck::Incorrect { value },
        Err(e) => InputCheck::Invalid {
            message: e.to_string(),
        },
    }
}
