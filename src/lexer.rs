//! Lexer for schedule lines using logos
//!
//! Supports tokens like:
//! - Parentheses: `(`, `)`
//! - Operators: `:=`, `=`, `+`, `-`, `*`
//! - Identifiers: `T1`, `KP500000000`, `ri[3]` (the index stays in the literal)

use logos::Logos;

use crate::ast::Operator;
use crate::error::{CompileError, CompileResult};

/// Token types for the schedule language
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")]
pub enum Token {
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    // Identifiers, optionally followed by a bracketed index. The bracket body
    // is validated by the parser so a bad index reports the whole literal.
    #[regex(r"[A-Za-z0-9_.]+(\[[^\] \t\r\n()]*\])?", |lex| lex.slice().to_string())]
    Ident(String),

    #[token(":=", |_| Operator::Assign)]
    #[token("=", |_| Operator::Assign)]
    #[token("+", |_| Operator::Add)]
    #[token("-", |_| Operator::Sub)]
    #[token("*", |_| Operator::Mul)]
    Op(Operator),

    #[regex(r"\r?\n")]
    EndOfLine,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Ident(s) => write!(f, "{}", s),
            Token::Op(op) => write!(f, "{}", op),
            Token::EndOfLine => write!(f, "end of line"),
        }
    }
}

/// Split one schedule line into tokens.
pub fn tokenize(line: &str) -> CompileResult<Vec<Token>> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(CompileError::LexerError {
                    column: lexer.span().start + 1,
                    fragment: lexer.slice().to_string(),
                });
            }
        }
    }

    Ok(tokens)
}
