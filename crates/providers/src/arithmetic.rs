//! Safe arithmetic for offline replies.
//!
//! Supports `+`, `-`, `*`, `/`, parentheses, decimals and unary negation
//! through a recursive-descent parser. Nothing outside that grammar is ever
//! evaluated.

use thiserror::Error;

/// Deepest parenthesis/negation nesting accepted.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArithmeticError {
    #[error("Empty expression")]
    Empty,

    #[error("Unexpected character: '{0}'")]
    UnexpectedChar(char),

    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of expression")]
    UnexpectedEnd,

    #[error("Expected closing parenthesis")]
    UnclosedParen,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Expression nested too deeply")]
    TooDeep,

    #[error("Result is not a finite number")]
    NonFinite,
}

/// Pull a calculation out of free text: "What is 6 * 7?" gives `6 * 7`.
///
/// Returns `None` unless the text holds at least two numbers joined by an
/// operator.
pub fn extract_expression(input: &str) -> Option<String> {
    let kept: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || "+-*/(). ".contains(*c))
        .collect();
    let expr = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    let expr = expr.trim_end_matches('.').trim().to_string();

    let tokens = tokenize(&expr).ok()?;
    let numbers = tokens.iter().filter(|t| matches!(t, Token::Number(_))).count();
    let operators = tokens
        .iter()
        .filter(|t| matches!(t, Token::Plus | Token::Minus | Token::Star | Token::Slash))
        .count();
    (numbers >= 2 && operators >= 1).then_some(expr)
}

/// Render a result the way people write it: `42`, not `42.0`.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ── Recursive-descent expression evaluator ────────────────────────────────

/// Evaluate a mathematical expression string.
pub fn evaluate(expr: &str) -> Result<f64, ArithmeticError> {
    let tokens = tokenize(expr)?;
    if tokens.is_empty() {
        return Err(ArithmeticError::Empty);
    }
    let mut parser = Parser::new(&tokens);
    let result = parser.parse_expr()?;
    if let Some(tok) = parser.peek() {
        return Err(ArithmeticError::UnexpectedToken(format!("{tok:?}")));
    }
    if !result.is_finite() {
        return Err(ArithmeticError::NonFinite);
    }
    Ok(result)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ArithmeticError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let token = match chars[i] {
            c if c.is_whitespace() => {
                i += 1;
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let num_str: String = chars[start..i].iter().collect();
                let num: f64 = num_str
                    .parse()
                    .map_err(|_| ArithmeticError::InvalidNumber(num_str))?;
                if !num.is_finite() {
                    return Err(ArithmeticError::NonFinite);
                }
                tokens.push(Token::Number(num));
                continue;
            }
            c => return Err(ArithmeticError::UnexpectedChar(c)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn descend(&mut self) -> Result<(), ArithmeticError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ArithmeticError::TooDeep);
        }
        Ok(())
    }

    // expr = term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<f64, ArithmeticError> {
        let mut left = self.parse_term()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Plus => {
                    self.consume();
                    left += self.parse_term()?;
                }
                Token::Minus => {
                    self.consume();
                    left -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // term = unary (('*' | '/') unary)*
    fn parse_term(&mut self) -> Result<f64, ArithmeticError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek() {
            match op {
                Token::Star => {
                    self.consume();
                    left *= self.parse_unary()?;
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_unary()?;
                    if right == 0.0 {
                        return Err(ArithmeticError::DivisionByZero);
                    }
                    left /= right;
                }
                _ => break,
            }
        }
        Ok(left)
    }

    // unary = '-' unary | primary
    fn parse_unary(&mut self) -> Result<f64, ArithmeticError> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            self.descend()?;
            let val = self.parse_unary()?;
            self.depth -= 1;
            return Ok(-val);
        }
        self.parse_primary()
    }

    // primary = NUMBER | '(' expr ')'
    fn parse_primary(&mut self) -> Result<f64, ArithmeticError> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(*n),
            Some(Token::LParen) => {
                self.descend()?;
                let val = self.parse_expr()?;
                self.depth -= 1;
                match self.consume() {
                    Some(Token::RParen) => Ok(val),
                    _ => Err(ArithmeticError::UnclosedParen),
                }
            }
            Some(tok) => Err(ArithmeticError::UnexpectedToken(format!("{tok:?}"))),
            None => Err(ArithmeticError::UnexpectedEnd),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
