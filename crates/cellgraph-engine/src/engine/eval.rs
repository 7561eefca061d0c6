//! Arithmetic expression evaluation.
//!
//! A recursive-descent evaluator for the restricted grammar formulas reduce to
//! once references are substituted:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('+' | '-') unary | primary
//! primary := number | '(' expr ')'
//! number  := digits ['.' digits] | '.' digits
//! ```
//!
//! Nothing outside this grammar is accepted.

use thiserror::Error;

/// Maximum nesting of parentheses and unary signs.
const MAX_DEPTH: usize = 256;

/// Errors from evaluating an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("expected operand at offset {0}")]
    MissingOperand(usize),

    #[error("unbalanced parentheses")]
    Unbalanced,

    #[error("trailing input at offset {0}")]
    Trailing(usize),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("result is not a finite number")]
    NotFinite,

    #[error("expression nested too deeply")]
    TooDeep,
}

/// Evaluate an arithmetic expression.
///
/// # Example
/// ```
/// use cellgraph_engine::engine::eval_expression;
///
/// assert_eq!(eval_expression("(10 + 20) * 5"), Ok(150.0));
/// assert!(eval_expression("10 +").is_err());
/// ```
pub fn eval_expression(expression: &str) -> Result<f64, EvalError> {
    let mut parser = ExprParser::new(expression);
    parser.skip_whitespace();
    if parser.is_at_end() {
        return Err(EvalError::Empty);
    }

    let value = parser.parse_expr()?;

    parser.skip_whitespace();
    if let Some(c) = parser.peek_char() {
        return Err(if c == ')' {
            EvalError::Unbalanced
        } else {
            EvalError::Trailing(parser.pos)
        });
    }

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::NotFinite)
    }
}

struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    // === Scanning ===

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consume `c` if it is the next non-whitespace character.
    fn eat(&mut self, c: char) -> bool {
        self.skip_whitespace();
        if self.peek_char() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // === Grammar ===

    fn parse_expr(&mut self) -> Result<f64, EvalError> {
        let mut left = self.parse_term()?;
        loop {
            if self.eat('+') {
                left += self.parse_term()?;
            } else if self.eat('-') {
                left -= self.parse_term()?;
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_term(&mut self) -> Result<f64, EvalError> {
        let mut left = self.parse_unary()?;
        loop {
            if self.eat('*') {
                left *= self.parse_unary()?;
            } else if self.eat('/') {
                let right = self.parse_unary()?;
                if right == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                left /= right;
            } else {
                return Ok(left);
            }
        }
    }

    fn parse_unary(&mut self) -> Result<f64, EvalError> {
        if self.eat('-') {
            self.enter()?;
            let value = self.parse_unary();
            self.leave();
            return value.map(|v| -v);
        }
        if self.eat('+') {
            self.enter()?;
            let value = self.parse_unary();
            self.leave();
            return value;
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<f64, EvalError> {
        self.skip_whitespace();
        let start = self.pos;
        match self.peek_char() {
            None => Err(EvalError::MissingOperand(start)),
            Some('(') => {
                self.advance();
                self.enter()?;
                let value = self.parse_expr();
                self.leave();
                let value = value?;
                if self.eat(')') {
                    Ok(value)
                } else {
                    Err(EvalError::Unbalanced)
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(')') => Err(EvalError::MissingOperand(start)),
            Some(c) => Err(EvalError::UnexpectedChar { ch: c, offset: start }),
        }
    }

    fn parse_number(&mut self) -> Result<f64, EvalError> {
        let start = self.pos;
        let mut seen_dot = false;
        let mut digits = 0usize;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                digits += 1;
            } else if c == '.' && !seen_dot {
                seen_dot = true;
            } else {
                break;
            }
            self.advance();
        }

        let text = &self.input[start..self.pos];
        // A lone '.' or a dangling '1.' is not a number.
        if digits == 0 || text.ends_with('.') {
            return Err(EvalError::InvalidNumber(text.to_string()));
        }
        text.parse::<f64>()
            .map_err(|_| EvalError::InvalidNumber(text.to_string()))
    }
}
