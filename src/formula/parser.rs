//! Recursive-descent parser producing an [`Expr`] tree.
//!
//! Precedence, loosest first:
//!
//! 1. `+`, `-`
//! 2. `*`, `/`, implicit multiplication (`a b`, `(a)(b)`)
//! 3. unary `-`, `+`
//! 4. `^` (right-associative, so `-a^2` is `-(a^2)` and `a^-1` is allowed)
//! 5. numeric coefficients (`6a`, `2(a + b)`), calls, variables, parentheses
//!
//! A coefficient binds tighter than `/`: `1/2a` is `1 / (2 * a)`.

use std::fmt;

use super::compile::Function;
use super::lexer::{tokenize, Token, TokenKind};
use crate::error::FormulaError;

/// Parsed expression tree. Variables are still referenced by name.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Variable(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(v) => write!(f, "{v}"),
            Expr::Variable(name) => f.write_str(name),
            Expr::Neg(inner) => write!(f, "-{inner}"),
            Expr::Add(l, r) => write!(f, "({l} + {r})"),
            Expr::Sub(l, r) => write!(f, "({l} - {r})"),
            Expr::Mul(l, r) => write!(f, "({l} * {r})"),
            Expr::Div(l, r) => write!(f, "({l} / {r})"),
            Expr::Pow(l, r) => write!(f, "({l} ^ {r})"),
            Expr::Call(func, args) => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Parses one side of an equation. `base` is the byte offset of `src`
/// within the full equation, used for error positions.
pub fn parse_expression(src: &str, base: usize) -> Result<Expr, FormulaError> {
    let tokens = tokenize(src, base)?;
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.additive()?;
    match parser.peek() {
        None => Ok(expr),
        Some(tok) => Err(unexpected(tok)),
    }
}

/// Deepest expression tree the parser builds. Compilation, evaluation and
/// drop all recurse over the tree.
pub const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Ancestors of the node being parsed.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn next(&mut self) -> Result<Token, FormulaError> {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(FormulaError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<(), FormulaError> {
        let tok = self.next()?;
        if &tok.kind == kind {
            Ok(())
        } else {
            Err(unexpected(&tok))
        }
    }

    /// Counts one more tree level, failing past [`MAX_DEPTH`].
    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            let offset = self
                .peek()
                .or_else(|| self.tokens.last())
                .map_or(0, |t| t.offset);
            return Err(FormulaError::TooDeep {
                offset,
                max: MAX_DEPTH,
            });
        }
        Ok(())
    }

    fn additive(&mut self) -> Result<Expr, FormulaError> {
        let entry = self.depth;
        let mut lhs = self.multiplicative()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Plus) => {
                    self.pos += 1;
                    self.descend()?;
                    let rhs = self.multiplicative()?;
                    lhs = Expr::Add(Box::new(lhs), Box::new(rhs));
                }
                Some(TokenKind::Minus) => {
                    self.pos += 1;
                    self.descend()?;
                    let rhs = self.multiplicative()?;
                    lhs = Expr::Sub(Box::new(lhs), Box::new(rhs));
                }
                _ => {
                    self.depth = entry;
                    return Ok(lhs);
                }
            }
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, FormulaError> {
        let entry = self.depth;
        let mut lhs = self.unary()?;
        loop {
            if matches!(
                self.peek_kind(),
                Some(
                    TokenKind::Star
                        | TokenKind::Slash
                        | TokenKind::Number(_)
                        | TokenKind::Ident(_)
                        | TokenKind::LParen
                )
            ) {
                self.descend()?;
            }
            match self.peek_kind() {
                Some(TokenKind::Star) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                Some(TokenKind::Slash) => {
                    self.pos += 1;
                    let rhs = self.unary()?;
                    lhs = Expr::Div(Box::new(lhs), Box::new(rhs));
                }
                // implicit multiplication
                Some(TokenKind::Number(_) | TokenKind::Ident(_) | TokenKind::LParen) => {
                    let rhs = self.power()?;
                    lhs = Expr::Mul(Box::new(lhs), Box::new(rhs));
                }
                _ => {
                    self.depth = entry;
                    return Ok(lhs);
                }
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, FormulaError> {
        self.descend()?;
        let expr = self.signed()?;
        self.depth -= 1;
        Ok(expr)
    }

    fn signed(&mut self) -> Result<Expr, FormulaError> {
        match self.peek_kind() {
            Some(TokenKind::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, FormulaError> {
        let base = self.primary()?;
        if let Some(TokenKind::Caret) = self.peek_kind() {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, FormulaError> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Number(value) => {
                // coefficient: `6a`, `2(a + b)`
                if let Some(TokenKind::Ident(_) | TokenKind::LParen) = self.peek_kind() {
                    let factor = self.power()?;
                    return Ok(Expr::Mul(Box::new(Expr::Number(value)), Box::new(factor)));
                }
                Ok(Expr::Number(value))
            }
            TokenKind::Ident(name) => {
                if let Some(TokenKind::LParen) = self.peek_kind() {
                    self.pos += 1;
                    return self.call(name);
                }
                Ok(Expr::Variable(name))
            }
            TokenKind::LParen => {
                let inner = self.additive()?;
                self.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(unexpected(&tok)),
        }
    }

    /// Parses the argument list after `name(`.
    fn call(&mut self, name: String) -> Result<Expr, FormulaError> {
        let func = Function::from_name(&name).ok_or(FormulaError::UnknownFunction(name))?;

        let mut args = Vec::new();
        if let Some(TokenKind::RParen) = self.peek_kind() {
            self.pos += 1;
        } else {
            loop {
                args.push(self.additive()?);
                let tok = self.next()?;
                match tok.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    _ => return Err(unexpected(&tok)),
                }
            }
        }

        func.check_arity(args.len())?;
        Ok(Expr::Call(func, args))
    }
}

fn unexpected(tok: &Token) -> FormulaError {
    FormulaError::UnexpectedToken {
        found: tok.kind.describe(),
        offset: tok.offset,
    }
}
