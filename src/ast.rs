//! Syntax tree definitions for codelet schedules

use serde::{Deserialize, Serialize};

/// A complete schedule plus its constant table
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub constants: Vec<Constant>,
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new(constants: Vec<Constant>, statements: Vec<Statement>) -> Self {
        Self { constants, statements }
    }

    /// Every leaf of every statement, targets included, in source order
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.statements.iter().flat_map(|stmt| {
            std::iter::once(&stmt.target).chain(stmt.value.leaves())
        })
    }
}

/// Schedule operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Assign,
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Assign => ":=",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A temporary, a named constant, or an array element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Leaf {
    pub name: String,
    pub index: Option<usize>,
}

impl Leaf {
    pub fn scalar(name: impl Into<String>) -> Self {
        Self { name: name.into(), index: None }
    }

    pub fn element(name: impl Into<String>, index: usize) -> Self {
        Self { name: name.into(), index: Some(index) }
    }

    /// Temporaries are `T` followed by letters or digits, never indexed.
    pub fn is_temporary(&self) -> bool {
        self.index.is_none()
            && self.name.len() > 1
            && self.name.starts_with('T')
            && self.name[1..].chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{}]", self.name, index),
            None => f.write_str(&self.name),
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Leaf(Leaf),

    /// Operator applied to its operands in source order
    Operation { op: Operator, operands: Vec<Expr> },
}

impl Expr {
    pub fn leaf(name: impl Into<String>) -> Self {
        Expr::Leaf(Leaf::scalar(name))
    }

    pub fn element(name: impl Into<String>, index: usize) -> Self {
        Expr::Leaf(Leaf::element(name, index))
    }

    pub fn operation(op: Operator, operands: Vec<Expr>) -> Self {
        Expr::Operation { op, operands }
    }

    pub fn is_unary(&self) -> bool {
        matches!(self, Expr::Operation { operands, .. } if operands.len() == 1)
    }

    /// True for operations with more than one operand (sums, differences, products)
    pub fn is_nary(&self) -> bool {
        matches!(self, Expr::Operation { operands, .. } if operands.len() > 1)
    }

    pub fn leaves(&self) -> Box<dyn Iterator<Item = &Leaf> + '_> {
        match self {
            Expr::Leaf(leaf) => Box::new(std::iter::once(leaf)),
            Expr::Operation { operands, .. } => {
                Box::new(operands.iter().flat_map(|operand| operand.leaves()))
            }
        }
    }
}

/// One schedule line: `(:= target value)`
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub target: Leaf,
    pub value: Expr,
    /// Source line, 0 when built by hand
    pub line: usize,
}

impl Statement {
    pub fn new(target: Leaf, value: Expr) -> Self {
        Self { target, value, line: 0 }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// A named numeric constant from the companion constant table
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub name: String,
    pub value: ConstValue,
}

impl Constant {
    pub fn literal(name: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ConstValue::Literal(literal.into()),
        }
    }

    pub fn imaginary_unit() -> Self {
        Self {
            name: "I".to_string(),
            value: ConstValue::ImaginaryUnit,
        }
    }
}

/// Constant payload; literals are kept exactly as written
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Literal(String),
    ImaginaryUnit,
}

/// Parameter layout of a generated kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signature {
    /// `(xi, xo)` over `Complex64`
    Complex,
    /// `(ri, ii, ro, io)` over `f64`
    Split,
}

impl Signature {
    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            Signature::Complex => &["xi"],
            Signature::Split => &["ri", "ii"],
        }
    }

    pub fn outputs(self) -> &'static [&'static str] {
        match self {
            Signature::Complex => &["xo"],
            Signature::Split => &["ro", "io"],
        }
    }

    pub fn element_type(self) -> &'static str {
        match self {
            Signature::Complex => "Complex64",
            Signature::Split => "f64",
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signature::Complex => write!(f, "complex (xi, xo)"),
            Signature::Split => write!(f, "split (ri, ii, ro, io)"),
        }
    }
}

/// Program with inferred kernel metadata
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedProgram {
    pub program: Program,
    pub size: usize,
    pub signature: Signature,
}
