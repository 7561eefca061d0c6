//! Formula tokenization and reference substitution.
//!
//! A formula body (the text after `=`) is split into references, numbers,
//! operators and parentheses. Each reference is replaced by the current value
//! of the referenced cell, rendered as formula text, and the resulting
//! arithmetic expression is handed to [`eval_expression`].
//!
//! Error values substitute as their code (`#ERROR!`, `#CIRC!`) and text values
//! as their raw text, so a broken or non-numeric input upstream fails to
//! evaluate here and the error cascades.

use thiserror::Error;

use super::cell::{CellError, CellValue};
use super::cell_ref::CellId;
use super::eval::{EvalError, eval_expression};

/// Errors from resolving a formula.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("'{0}' is not a cell reference")]
    BareWord(String),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// A lexical token of a formula body.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Ref(CellId),
    Number(&'a str),
    Op(char),
    LeftParen,
    RightParen,
}

/// Split a formula body into tokens. Whitespace separates tokens and is dropped.
pub fn tokenize(body: &str) -> Result<Vec<Token<'_>>, FormulaError> {
    let bytes = body.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            b'+' | b'-' | b'*' | b'/' => {
                tokens.push(Token::Op(b as char));
                pos += 1;
            }
            b'(' => {
                tokens.push(Token::LeftParen);
                pos += 1;
            }
            b')' => {
                tokens.push(Token::RightParen);
                pos += 1;
            }
            b'0'..=b'9' | b'.' => {
                let start = pos;
                while pos < bytes.len() && (bytes[pos].is_ascii_digit() || bytes[pos] == b'.') {
                    pos += 1;
                }
                tokens.push(Token::Number(&body[start..pos]));
            }
            b if b.is_ascii_alphabetic() => {
                let start = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
                    pos += 1;
                }
                let letters_end = pos;
                while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                    pos += 1;
                }
                if pos == letters_end {
                    return Err(FormulaError::BareWord(body[start..pos].to_string()));
                }
                match CellId::parse(&body[start..pos]) {
                    Some(id) => tokens.push(Token::Ref(id)),
                    None => return Err(FormulaError::BareWord(body[start..pos].to_string())),
                }
            }
            _ => {
                let ch = body[pos..].chars().next().unwrap_or('\u{FFFD}');
                return Err(FormulaError::UnexpectedChar { ch, offset: pos });
            }
        }
    }

    Ok(tokens)
}

/// Substitute references and evaluate a formula body.
///
/// `lookup` returns the current value of a referenced cell (empty text for
/// cells that were never set).
pub fn substitute_and_eval<F>(body: &str, lookup: F) -> Result<f64, FormulaError>
where
    F: Fn(&CellId) -> CellValue,
{
    let tokens = tokenize(body)?;
    let mut expression = String::with_capacity(body.len());
    for token in &tokens {
        if !expression.is_empty() {
            expression.push(' ');
        }
        match token {
            Token::Ref(id) => expression.push_str(&lookup(id).to_formula_text()),
            Token::Number(n) => expression.push_str(n),
            Token::Op(op) => expression.push(*op),
            Token::LeftParen => expression.push('('),
            Token::RightParen => expression.push(')'),
        }
    }
    Ok(eval_expression(&expression)?)
}

/// Resolve the formula owned by `owner` into a cell value.
///
/// Never fails: every error becomes a `#ERROR!` value.
pub fn resolve_formula<F>(body: &str, owner: &CellId, lookup: F) -> CellValue
where
    F: Fn(&CellId) -> CellValue,
{
    match substitute_and_eval(body, lookup) {
        Ok(n) => CellValue::Number(n),
        Err(e) => {
            log::trace!("{owner}: formula '={body}' failed: {e}");
            CellValue::Error(CellError::parse(e.to_string()))
        }
    }
}
