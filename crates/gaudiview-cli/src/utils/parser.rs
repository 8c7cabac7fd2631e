//! Parser for textual filter expressions.
//!
//! Conditions are joined with `and`/`&&` into groups, and groups with `or`/`||`:
//!
//! ```text
//! Score > -6 and Energy < 11 or Score <= -7
//! ```
//!
//! Objective names containing spaces or operator characters can be double-quoted.

use gaudiview::engine::filter::{Condition, FilterSpec, Operator};
use std::iter::Peekable;
use std::str::CharIndices;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Filter expression is empty.")]
    Empty,

    #[error("Unterminated quoted name starting at position {0}.")]
    UnterminatedQuote(usize),

    #[error("Unknown comparison operator '{0}'.")]
    InvalidOperator(String),

    #[error("Expected {expected} but found '{found}'.")]
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },

    #[error("Expected {0} but the expression ended.")]
    UnexpectedEnd(&'static str),

    #[error("Threshold '{0}' is not a number.")]
    InvalidNumber(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Op(String),
    And,
    Or,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Quoted(q) => format!("\"{}\"", q),
            Token::Op(op) => op.clone(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
        }
    }
}

const OPERATOR_CHARS: [char; 7] = ['>', '<', '=', '!', '≥', '≤', '≠'];

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || OPERATOR_CHARS.contains(&c) || c == '"' || c == '&' || c == '|'
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<CharIndices> = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some((_, '"')) => break,
                    Some((_, ch)) => name.push(ch),
                    None => return Err(ParseError::UnterminatedQuote(start)),
                }
            }
            tokens.push(Token::Quoted(name));
            continue;
        }

        if c == '&' || c == '|' {
            chars.next();
            match chars.next() {
                Some((_, next)) if next == c => {
                    tokens.push(if c == '&' { Token::And } else { Token::Or });
                }
                _ => return Err(ParseError::InvalidOperator(c.to_string())),
            }
            continue;
        }

        if OPERATOR_CHARS.contains(&c) {
            chars.next();
            let mut op = c.to_string();
            if matches!(c, '>' | '<' | '=' | '!') {
                if let Some(&(_, '=')) = chars.peek() {
                    chars.next();
                    op.push('=');
                }
            }
            tokens.push(Token::Op(op));
            continue;
        }

        let mut word = String::new();
        while let Some(&(_, ch)) = chars.peek() {
            if is_word_boundary(ch) {
                break;
            }
            word.push(ch);
            chars.next();
        }
        tokens.push(match word.to_ascii_lowercase().as_str() {
            "and" => Token::And,
            "or" => Token::Or,
            _ => Token::Word(word),
        });
    }

    Ok(tokens)
}

/// Parses a filter expression into a [`FilterSpec`].
///
/// Objective names are not checked here; the filter engine rejects unknown ones.
pub fn parse_filter(expression: &str) -> Result<FilterSpec, ParseError> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut spec = FilterSpec::new();
    let mut group = Vec::new();
    let mut iter = tokens.into_iter();

    loop {
        group.push(parse_condition(&mut iter)?);
        match iter.next() {
            None => break,
            Some(Token::And) => {}
            Some(Token::Or) => spec.push_group(std::mem::take(&mut group)),
            Some(other) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "'and' or 'or'",
                    found: other.describe(),
                });
            }
        }
    }
    spec.push_group(group);

    Ok(spec)
}

fn parse_condition(iter: &mut impl Iterator<Item = Token>) -> Result<Condition, ParseError> {
    let objective = match iter.next() {
        Some(Token::Word(w)) | Some(Token::Quoted(w)) => w,
        Some(other) => {
            return Err(ParseError::UnexpectedToken {
                expected: "an objective name",
                found: other.describe(),
            });
        }
        None => return Err(ParseError::UnexpectedEnd("an objective name")),
    };

    let operator = match iter.next() {
        Some(Token::Op(op)) => op
            .parse::<Operator>()
            .map_err(|_| ParseError::InvalidOperator(op))?,
        Some(other) => {
            return Err(ParseError::UnexpectedToken {
                expected: "a comparison operator",
                found: other.describe(),
            });
        }
        None => return Err(ParseError::UnexpectedEnd("a comparison operator")),
    };

    let threshold = match iter.next() {
        Some(Token::Word(w)) => w.parse::<f64>().map_err(|_| ParseError::InvalidNumber(w))?,
        Some(other) => {
            return Err(ParseError::UnexpectedToken {
                expected: "a numeric threshold",
                found: other.describe(),
            });
        }
        None => return Err(ParseError::UnexpectedEnd("a numeric threshold")),
    };

    Ok(Condition::new(objective, operator, threshold))
}
