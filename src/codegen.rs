//! Rust code generator for analyzed schedules
//!
//! Renders one kernel function per program. Grouping follows the schedule's
//! nesting: the statement root sits at depth 0 and its value at depth 1, and
//! every n-ary operation at depth 2 or deeper is parenthesised. Unary minus is
//! never wrapped, and `a + (-b)` is written `a - b`. Operand order is kept
//! exactly, since floating-point sums are order sensitive.

use crate::ast::{AnalyzedProgram, ConstValue, Constant, Expr, Operator, Signature, Statement};
use crate::error::{CompileError, CompileResult};
use crate::kernel::Kernel;

const INDENT: &str = "    ";

/// Code generator for one kernel function
pub struct CodeGenerator {
    name: String,
}

impl CodeGenerator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Render the whole kernel source file and check that it parses as Rust.
    pub fn generate(&self, analyzed: &AnalyzedProgram) -> CompileResult<Kernel> {
        for stmt in &analyzed.program.statements {
            if let Some(op) = empty_operation(&stmt.value) {
                return Err(CompileError::format(format!(
                    "kernel `{}`: `{}` with no operands in the value of `{}`",
                    self.name, op, stmt.target
                )));
            }
        }

        let source = self.render_file(analyzed);

        syn::parse_file(&source)
            .map_err(|e| CompileError::format(format!("kernel `{}`: {}", self.name, e)))?;

        Ok(Kernel {
            name: self.name.clone(),
            size: analyzed.size,
            signature: analyzed.signature,
            constants: analyzed.program.constants.len(),
            statements: analyzed.program.statements.len(),
            source,
        })
    }

    fn render_file(&self, analyzed: &AnalyzedProgram) -> String {
        let signature = analyzed.signature;
        let mut lines = vec![
            "// Generated by sched2kernel. Do not edit.".to_string(),
            String::new(),
        ];

        if signature == Signature::Complex {
            lines.push("use num_complex::Complex64;".to_string());
            lines.push(String::new());
        }

        lines.push(format!("pub const N: usize = {};", analyzed.size));
        lines.push(String::new());
        lines.push("#[allow(non_snake_case, dead_code, clippy::excessive_precision)]".to_string());
        lines.push(format!("pub fn {}({}) {{", self.name, render_params(signature)));

        let constants = &analyzed.program.constants;
        if !constants.is_empty() {
            for constant in constants {
                lines.push(format!("{}{}", INDENT, render_constant(constant)));
            }
            lines.push(String::new());
        }

        for stmt in &analyzed.program.statements {
            lines.push(format!("{}{}", INDENT, render_statement(stmt)));
        }

        lines.push("}".to_string());

        let mut source = lines.join("\n");
        source.push('\n');
        source
    }
}

/// First operator in `expr` that has nothing to apply to
fn empty_operation(expr: &Expr) -> Option<Operator> {
    match expr {
        Expr::Leaf(_) => None,
        Expr::Operation { op, operands } if operands.is_empty() => Some(*op),
        Expr::Operation { operands, .. } => operands.iter().find_map(empty_operation),
    }
}

/// `xi: &[Complex64], xo: &mut [Complex64]` or the four split arrays
fn render_params(signature: Signature) -> String {
    let ty = signature.element_type();
    let inputs = signature.inputs().iter().map(|name| format!("{}: &[{}]", name, ty));
    let outputs = signature.outputs().iter().map(|name| format!("{}: &mut [{}]", name, ty));
    inputs.chain(outputs).collect::<Vec<_>>().join(", ")
}

/// One `const` item. Rust has no unary plus, so a leading `+` is dropped, and
/// an integral literal gets a `.0` to stay an `f64`.
pub fn render_constant(constant: &Constant) -> String {
    match &constant.value {
        ConstValue::ImaginaryUnit => {
            format!("const {}: Complex64 = Complex64::new(0.0, 1.0);", constant.name)
        }
        ConstValue::Literal(literal) => {
            format!("const {}: f64 = {};", constant.name, float_literal(literal))
        }
    }
}

/// Spell a signed decimal as a Rust `f64` literal without changing its value.
///
/// `+.25` becomes `0.25`, `1.` and `1.e5` gain a zero fraction, and `+1`
/// becomes `1.0`.
fn float_literal(literal: &str) -> String {
    let unsigned = literal.strip_prefix('+').unwrap_or(literal);
    let (sign, unsigned) = match unsigned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", unsigned),
    };
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => unsigned.split_at(at),
        None => (unsigned, ""),
    };

    let mantissa = match mantissa.split_once('.') {
        Some((whole, fraction)) => {
            let whole = if whole.is_empty() { "0" } else { whole };
            let fraction = if fraction.is_empty() { "0" } else { fraction };
            format!("{}.{}", whole, fraction)
        }
        None if exponent.is_empty() => format!("{}.0", mantissa),
        None => mantissa.to_string(),
    };

    format!("{}{}{}", sign, mantissa, exponent)
}

/// Temporaries become fresh `let` bindings; array elements are plain assignments.
pub fn render_statement(stmt: &Statement) -> String {
    let value = render_expr(&stmt.value, 1);
    if stmt.target.is_temporary() {
        format!("let {} = {};", stmt.target, value)
    } else {
        format!("{} = {};", stmt.target, value)
    }
}

/// Render an expression found at `depth` below the statement root.
pub fn render_expr(expr: &Expr, depth: usize) -> String {
    if depth >= 2 && expr.is_nary() {
        format!("({})", render_body(expr, depth))
    } else {
        render_body(expr, depth)
    }
}

/// Render without the node's own grouping parentheses.
fn render_body(expr: &Expr, depth: usize) -> String {
    let (op, operands) = match expr {
        Expr::Leaf(leaf) => return leaf.to_string(),
        Expr::Operation { op, operands } => (*op, operands),
    };

    // `generate` rejects empty operations before rendering
    let Some((first, rest)) = operands.split_first() else {
        return String::new();
    };

    if rest.is_empty() {
        return format!("{}{}", op, render_expr(first, depth + 1));
    }

    let mut out = render_expr(first, depth + 1);
    for operand in rest {
        match (op, operand) {
            // a + (-b)  =>  a - b
            (Operator::Add, Expr::Operation { op: Operator::Sub, operands: negated })
                if negated.len() == 1 =>
            {
                out.push_str(" - ");
                out.push_str(&render_expr(&negated[0], depth + 1));
            }
            // `*` binds tighter than `+`/`-`
            (Operator::Mul, operand) if operand.is_nary() => {
                out.push_str(" * (");
                out.push_str(&render_body(operand, depth + 1));
                out.push(')');
            }
            (op, operand) => {
                out.push_str(&format!(" {} ", op));
                out.push_str(&render_expr(operand, depth + 1));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;
    use crate::ast::Program;
    use crate::parser::{parse_statement, Parser};
    use pretty_assertions::assert_eq;

    fn render(line: &str) -> String {
        render_statement(&parse_statement(1, line).unwrap())
    }

    fn analyze(schedule: &str, constants: Vec<Constant>) -> AnalyzedProgram {
        let statements = Parser::new(schedule).parse_program().unwrap();
        Analyzer::new().analyze(Program::new(constants, statements)).unwrap()
    }

    #[test]
    fn test_sum_under_product_is_grouped() {
        assert_eq!(render("(:= T1 (* xi[0] (+ xi[1] xi[2])))"), "let T1 = xi[0] * (xi[1] + xi[2]);");
    }

    #[test]
    fn test_sum_left_of_product_is_grouped() {
        assert_eq!(render("(:= T1 (* (- xi[1] xi[2]) xi[0]))"), "let T1 = (xi[1] - xi[2]) * xi[0];");
    }

    #[test]
    fn test_negated_operand_folds_into_subtraction() {
        assert_eq!(render("(:= T2 (+ xi[0] (- xi[1])))"), "let T2 = xi[0] - xi[1];");
        assert!(!render("(:= T2 (+ xi[0] (- xi[1])))").contains("+ -"));
    }

    #[test]
    fn test_folded_operation_keeps_its_group() {
        assert_eq!(
            render("(:= T7 (+ T1 (- (* KP500000000 T3))))"),
            "let T7 = T1 - (KP500000000 * T3);"
        );
    }

    #[test]
    fn test_leading_negation_is_not_folded() {
        assert_eq!(render("(:= T3 (+ (- T1) T2))"), "let T3 = -T1 + T2;");
    }

    #[test]
    fn test_unary_minus_is_not_wrapped() {
        assert_eq!(render("(:= T4 (- T1))"), "let T4 = -T1;");
        assert_eq!(render("(:= T4 (* KP5 (- T1)))"), "let T4 = KP5 * -T1;");
        assert_eq!(render("(:= T4 (- (+ T1 T2)))"), "let T4 = -(T1 + T2);");
        assert_eq!(render("(:= T4 (- T5 (- T1)))"), "let T4 = T5 - -T1;");
    }

    #[test]
    fn test_nested_groups() {
        assert_eq!(
            render("(:= T9 (- (+ T1 (* KP5 (- T2 T3))) T4))"),
            "let T9 = (T1 + (KP5 * (T2 - T3))) - T4;"
        );
    }

    #[test]
    fn test_operand_order_is_preserved() {
        assert_eq!(render("(:= T5 (+ Td Ta Tc Tb))"), "let T5 = Td + Ta + Tc + Tb;");
        assert_eq!(render("(:= T5 (- Td Ta Tc Tb))"), "let T5 = Td - Ta - Tc - Tb;");
        assert_eq!(render("(:= T5 (+ Tb (- Ta) Tc))"), "let T5 = Tb - Ta + Tc;");
    }

    #[test]
    fn test_declaration_vs_assignment() {
        assert_eq!(render("(:= T3 (+ ri[0] ri[1]))"), "let T3 = ri[0] + ri[1];");
        assert_eq!(render("(:= ro[2] (+ T1 T2))"), "ro[2] = T1 + T2;");
    }

    #[test]
    fn test_constants() {
        assert_eq!(render_constant(&Constant::literal("KP5", "+0.5")), "const KP5: f64 = 0.5;");
        assert_eq!(render_constant(&Constant::literal("KN5", "-0.5")), "const KN5: f64 = -0.5;");
        assert_eq!(
            render_constant(&Constant::imaginary_unit()),
            "const I: Complex64 = Complex64::new(0.0, 1.0);"
        );
    }

    #[test]
    fn test_integral_constant_stays_float() {
        assert_eq!(render_constant(&Constant::literal("KP1", "+1")), "const KP1: f64 = 1.0;");
        assert_eq!(render_constant(&Constant::literal("KN0", "-0")), "const KN0: f64 = -0.0;");
        assert_eq!(render_constant(&Constant::literal("KE", "1e-3")), "const KE: f64 = 1e-3;");
    }

    #[test]
    fn test_bare_decimal_points_are_completed() {
        assert_eq!(render_constant(&Constant::literal("KP25", "+.25")), "const KP25: f64 = 0.25;");
        assert_eq!(render_constant(&Constant::literal("KN5", "-.5")), "const KN5: f64 = -0.5;");
        assert_eq!(render_constant(&Constant::literal("KE5", "1.e5")), "const KE5: f64 = 1.0e5;");
        assert_eq!(render_constant(&Constant::literal("KP1", "1.")), "const KP1: f64 = 1.0;");
        assert_eq!(render_constant(&Constant::literal("KE", "+2.5E-3")), "const KE: f64 = 2.5E-3;");
    }

    #[test]
    fn test_bare_decimal_constants_compile_into_kernels() {
        for (literal, rendered) in [("+.25", "0.25"), ("+1.e5", "1.0e5")] {
            let analyzed = analyze(
                "(:= ro[0] (* KP25 ri[0]))\n(:= io[0] ii[0])",
                vec![Constant::literal("KP25", literal)],
            );
            let kernel = CodeGenerator::new("k").generate(&analyzed).unwrap();
            assert!(kernel.source.contains(&format!("const KP25: f64 = {};", rendered)));
        }
    }

    #[test]
    fn test_operation_without_operands_is_a_format_error() {
        let program = Program::new(
            Vec::new(),
            vec![Statement::new(
                crate::ast::Leaf::element("xo", 0),
                Expr::operation(Operator::Add, vec![
                    Expr::element("xi", 0),
                    Expr::operation(Operator::Sub, Vec::new()),
                ]),
            )],
        );
        let analyzed = AnalyzedProgram { program, size: 1, signature: Signature::Complex };
        let err = CodeGenerator::new("k").generate(&analyzed).unwrap_err();
        match err {
            CompileError::FormatError { message } => assert!(message.contains("`-` with no operands")),
            other => panic!("Expected FormatError, got {:?}", other),
        }
    }

    #[test]
    fn test_split_kernel_file() {
        let analyzed = analyze(
            "(:= T1 (+ ri[0] ri[1]))\n(:= ro[0] (* KP500000000 T1))\n(:= io[0] ii[1])",
            vec![Constant::literal("KP500000000", "+0.5")],
        );
        let kernel = CodeGenerator::new("half_sum").generate(&analyzed).unwrap();
        assert_eq!(kernel.source, "\
// Generated by sched2kernel. Do not edit.

pub const N: usize = 2;

#[allow(non_snake_case, dead_code, clippy::excessive_precision)]
pub fn half_sum(ri: &[f64], ii: &[f64], ro: &mut [f64], io: &mut [f64]) {
    const KP500000000: f64 = 0.5;

    let T1 = ri[0] + ri[1];
    ro[0] = KP500000000 * T1;
    io[0] = ii[1];
}
");
        assert_eq!(kernel.size, 2);
        assert_eq!(kernel.statements, 3);
    }

    #[test]
    fn test_complex_kernel_file() {
        let analyzed = analyze("(:= T1 (* I xi[1]))\n(:= xo[1] (+ xi[0] T1))", Vec::new());
        let kernel = CodeGenerator::new("rotate").generate(&analyzed).unwrap();
        assert_eq!(kernel.source, "\
// Generated by sched2kernel. Do not edit.

use num_complex::Complex64;

pub const N: usize = 2;

#[allow(non_snake_case, dead_code, clippy::excessive_precision)]
pub fn rotate(xi: &[Complex64], xo: &mut [Complex64]) {
    const I: Complex64 = Complex64::new(0.0, 1.0);

    let T1 = I * xi[1];
    xo[1] = xi[0] + T1;
}
");
        assert_eq!(kernel.constants, 1);
    }

    #[test]
    fn test_invalid_function_name_is_a_format_error() {
        let analyzed = analyze("(:= xo[0] xi[0])", Vec::new());
        let err = CodeGenerator::new("not a name").generate(&analyzed).unwrap_err();
        assert!(matches!(err, CompileError::FormatError { .. }));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let schedule = "(:= T1 (+ xi[0] xi[1]))\n(:= xo[0] T1)\n(:= xo[1] (- xi[0] xi[1]))";
        let first = CodeGenerator::new("dft2").generate(&analyze(schedule, Vec::new())).unwrap();
        let second = CodeGenerator::new("dft2").generate(&analyze(schedule, Vec::new())).unwrap();
        assert_eq!(first.source, second.source);
    }
}
