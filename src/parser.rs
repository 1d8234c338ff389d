//! Parser for codelet schedules
//!
//! Parses lines like:
//! - `(:= T1 (+ ri[0] ri[1]))`
//! - `(:= T5 (* KP866025403 (- ri[2] ri[1])))`
//! - `(:= ro[1] (+ T7 (- T6)))`
//!
//! Each parenthesised operation is parsed by one recursive call which reports
//! how many tokens it consumed, so the caller can continue after it.

use crate::ast::{Expr, Leaf, Operator, Statement};
use crate::constants::is_declaration;
use crate::error::{CompileError, CompileResult};
use crate::lexer::{tokenize, Token};

/// Parser for a whole schedule text
pub struct Parser<'source> {
    source: &'source str,
}

impl<'source> Parser<'source> {
    pub fn new(source: &'source str) -> Self {
        Self { source }
    }

    /// Parse every statement line, in order.
    ///
    /// Blank lines and constant declarations are skipped so a schedule with
    /// its constant table inlined is accepted as well.
    pub fn parse_program(&mut self) -> CompileResult<Vec<Statement>> {
        let mut statements = Vec::new();

        for (idx, line) in self.source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_declaration(trimmed) {
                continue;
            }
            statements.push(parse_statement(idx + 1, trimmed)?);
        }

        Ok(statements)
    }
}

/// Parse a single schedule line into a statement.
pub fn parse_statement(line_no: usize, line: &str) -> CompileResult<Statement> {
    let fail = |msg: String| CompileError::grammar(line_no, line, msg);

    let tokens = tokenize(line).map_err(|err| match err {
        CompileError::LexerError { column, fragment } => {
            fail(format!("unexpected `{}` at column {}", fragment, column))
        }
        other => other,
    })?;

    if tokens.first() != Some(&Token::LParen) {
        return Err(fail("statement must start with `(`".to_string()));
    }

    let (root, consumed) = LineParser { line_no, line }.parse_operation(&tokens)?;

    if let Some(extra) = tokens[consumed..].iter().find(|tok| **tok != Token::EndOfLine) {
        return Err(fail(format!("unexpected `{}` after the statement", extra)));
    }

    match root {
        Expr::Operation { op: Operator::Assign, mut operands } => {
            // Shape was checked by parse_operation
            let value = operands.pop();
            let target = operands.pop();
            match (target, value) {
                (Some(Expr::Leaf(target)), Some(value)) => {
                    Ok(Statement::new(target, value).at_line(line_no))
                }
                _ => Err(fail("malformed assignment".to_string())),
            }
        }
        Expr::Operation { op, .. } => Err(fail(format!(
            "statement root must be `:=`, found `{}`",
            op
        ))),
        Expr::Leaf(_) => Err(fail("statement must be an assignment".to_string())),
    }
}

/// Per-line recursive descent state; holds only what error messages need.
struct LineParser<'a> {
    line_no: usize,
    line: &'a str,
}

impl<'a> LineParser<'a> {
    fn error(&self, msg: impl Into<String>) -> CompileError {
        CompileError::grammar(self.line_no, self.line, msg)
    }

    /// Parse `( op operand+ )` starting at `tokens[0]`.
    ///
    /// Returns the node and the number of tokens consumed, closing paren included.
    fn parse_operation(&self, tokens: &[Token]) -> CompileResult<(Expr, usize)> {
        let op = match tokens.get(1) {
            Some(Token::Op(op)) => *op,
            Some(other) => {
                return Err(self.error(format!("expected an operator after `(`, found `{}`", other)))
            }
            None => return Err(self.error("unbalanced parentheses")),
        };

        let mut operands = Vec::new();
        let mut idx = 2;

        loop {
            match tokens.get(idx) {
                Some(Token::LParen) => {
                    let (operand, consumed) = self.parse_operation(&tokens[idx..])?;
                    operands.push(operand);
                    idx += consumed;
                }
                Some(Token::Ident(literal)) => {
                    operands.push(Expr::Leaf(self.parse_leaf(literal)?));
                    idx += 1;
                }
                Some(Token::RParen) => {
                    idx += 1;
                    break;
                }
                Some(Token::Op(extra)) => {
                    return Err(self.error(format!("unexpected operator `{}` in operand position", extra)))
                }
                Some(Token::EndOfLine) | None => return Err(self.error("unbalanced parentheses")),
            }
        }

        self.check_arity(op, &operands)?;
        Ok((Expr::Operation { op, operands }, idx))
    }

    fn check_arity(&self, op: Operator, operands: &[Expr]) -> CompileResult<()> {
        match op {
            _ if operands.is_empty() => Err(self.error(format!("`{}` has no operands", op))),
            Operator::Assign => {
                if operands.len() != 2 {
                    return Err(self.error(format!(
                        "`:=` takes a target and one value, found {} operands",
                        operands.len()
                    )));
                }
                if !matches!(operands[0], Expr::Leaf(_)) {
                    return Err(self.error("assignment target must be a name or array element"));
                }
                if operands[1].contains_assignment() {
                    return Err(self.error("`:=` cannot appear inside an expression"));
                }
                Ok(())
            }
            Operator::Mul if operands.len() != 2 => Err(self.error(format!(
                "`*` takes exactly two operands, found {}",
                operands.len()
            ))),
            Operator::Add if operands.len() == 1 => {
                Err(self.error("unary `+` is not supported"))
            }
            _ if operands.iter().any(Expr::contains_assignment) => {
                Err(self.error("`:=` cannot appear inside an expression"))
            }
            _ => Ok(()),
        }
    }

    /// Split `name[digits]` into name and index.
    fn parse_leaf(&self, literal: &str) -> CompileResult<Leaf> {
        let Some(open) = literal.find('[') else {
            return Ok(Leaf::scalar(literal));
        };

        let name = &literal[..open];
        let digits = literal[open + 1..]
            .strip_suffix(']')
            .ok_or_else(|| self.error(format!("malformed index in `{}`", literal)))?;

        if name.is_empty() {
            return Err(self.error(format!("missing array name in `{}`", literal)));
        }
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.error(format!(
                "index of `{}` is not an unsigned integer",
                literal
            )));
        }

        let index = digits
            .parse::<usize>()
            .map_err(|e| self.error(format!("index of `{}` is out of range: {}", literal, e)))?;

        Ok(Leaf::element(name, index))
    }
}

impl Expr {
    /// True if an assignment occurs anywhere in this subtree
    fn contains_assignment(&self) -> bool {
        match self {
            Expr::Leaf(_) => false,
            Expr::Operation { op, operands } => {
                *op == Operator::Assign || operands.iter().any(Expr::contains_assignment)
            }
        }
    }
}
