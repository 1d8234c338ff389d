// Shared helpers for the integration tests: direct-DFT schedule synthesis and
// an interpreter for rendered kernel statements.

#![allow(dead_code)]

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Write;

use num_complex::Complex64;
use syn::{BinOp, Expr, Lit, UnOp};

use schedule_to_kernel::codegen::render_statement;
use schedule_to_kernel::{AnalyzedProgram, ConstValue, Signature};

pub fn twiddle(n: usize, k: usize, w: usize) -> Complex64 {
    let phi = -2.0 * PI / n as f64;
    Complex64::from_polar(1.0, phi * k as f64 * w as f64)
}

/// `DK` lines for the cosine and sine of every (input, output) pair
pub fn constant_table(n: usize, tag: &str) -> String {
    let mut table = format!("/* direct dft of size {} */\n", n);
    for k in 0..n {
        for w in 0..n {
            let tw = twiddle(n, k, w);
            writeln!(table, "     {}(KC{}x{}, {:+});", tag, k, w, tw.re).unwrap();
            writeln!(table, "     {}(KS{}x{}, {:+});", tag, k, w, tw.im).unwrap();
        }
    }
    table
}

pub fn complex_schedule(n: usize) -> String {
    let mut schedule = String::new();
    for k in 0..n {
        for w in 0..n {
            writeln!(schedule, "(:= TW{k}x{w} (+ KC{k}x{w} (* I KS{k}x{w})))").unwrap();
        }
    }
    for w in 0..n {
        let terms: Vec<String> = (0..n).map(|k| format!("(* xi[{k}] TW{k}x{w})")).collect();
        writeln!(schedule, "(:= xo[{}] (+ {}))", w, terms.join(" ")).unwrap();
    }
    schedule
}

pub fn split_schedule(n: usize) -> String {
    let mut schedule = String::new();
    for w in 0..n {
        let re: Vec<String> = (0..n)
            .map(|k| format!("(- (* ri[{k}] KC{k}x{w}) (* ii[{k}] KS{k}x{w}))"))
            .collect();
        let im: Vec<String> = (0..n)
            .map(|k| format!("(+ (* ri[{k}] KS{k}x{w}) (* ii[{k}] KC{k}x{w}))"))
            .collect();
        writeln!(schedule, "(:= ro[{}] (+ {}))", w, re.join(" ")).unwrap();
        writeln!(schedule, "(:= io[{}] (+ {}))", w, im.join(" ")).unwrap();
    }
    schedule
}

/// Run the rendered statements of `analyzed` on `input`.
///
/// Each right-hand side goes through `render_statement`, is parsed back with
/// `syn` and evaluated with Rust's precedence, never with the schedule tree.
pub fn run_rendered(analyzed: &AnalyzedProgram, input: &[Complex64]) -> Vec<Complex64> {
    Machine::new(analyzed, input).run(analyzed)
}

/// Interpreter for rendered kernel bodies
struct Machine {
    scalars: HashMap<String, Complex64>,
    arrays: HashMap<String, Vec<Complex64>>,
}

impl Machine {
    fn new(analyzed: &AnalyzedProgram, input: &[Complex64]) -> Self {
        let mut scalars = HashMap::new();
        for constant in &analyzed.program.constants {
            let value = match &constant.value {
                ConstValue::ImaginaryUnit => Complex64::i(),
                ConstValue::Literal(literal) => Complex64::new(literal.parse().unwrap(), 0.0),
            };
            scalars.insert(constant.name.clone(), value);
        }

        let zeros = vec![Complex64::new(0.0, 0.0); input.len()];
        let mut arrays = HashMap::new();
        match analyzed.signature {
            Signature::Complex => {
                arrays.insert("xi".to_string(), input.to_vec());
                arrays.insert("xo".to_string(), zeros);
            }
            Signature::Split => {
                arrays.insert("ri".to_string(), input.iter().map(|x| Complex64::new(x.re, 0.0)).collect());
                arrays.insert("ii".to_string(), input.iter().map(|x| Complex64::new(x.im, 0.0)).collect());
                arrays.insert("ro".to_string(), zeros.clone());
                arrays.insert("io".to_string(), zeros);
            }
        }

        Self { scalars, arrays }
    }

    fn eval(&self, expr: &Expr) -> Complex64 {
        match expr {
            Expr::Paren(paren) => self.eval(&paren.expr),
            Expr::Unary(unary) => match unary.op {
                UnOp::Neg(_) => -self.eval(&unary.expr),
                _ => panic!("unexpected unary operator"),
            },
            Expr::Binary(binary) => {
                let lhs = self.eval(&binary.left);
                let rhs = self.eval(&binary.right);
                match binary.op {
                    BinOp::Add(_) => lhs + rhs,
                    BinOp::Sub(_) => lhs - rhs,
                    BinOp::Mul(_) => lhs * rhs,
                    _ => panic!("unexpected binary operator"),
                }
            }
            Expr::Path(path) => self.scalars[&ident(path)],
            Expr::Index(index) => {
                let Expr::Path(array) = &*index.expr else {
                    panic!("indexed expression is not an array name");
                };
                let Expr::Lit(syn::ExprLit { lit: Lit::Int(slot), .. }) = &*index.index else {
                    panic!("index is not an integer literal");
                };
                self.arrays[&ident(array)][slot.base10_parse::<usize>().unwrap()]
            }
            _ => panic!("unexpected expression"),
        }
    }

    fn run(mut self, analyzed: &AnalyzedProgram) -> Vec<Complex64> {
        for stmt in &analyzed.program.statements {
            let line = render_statement(stmt);
            let line = line.strip_prefix("let ").unwrap_or(&line);
            let (target, rhs) = line.split_once(" = ").unwrap();
            assert_eq!(target, stmt.target.to_string());

            let rhs: Expr = syn::parse_str(rhs.strip_suffix(';').unwrap()).unwrap();
            let value = self.eval(&rhs);

            match stmt.target.index {
                Some(slot) => self.arrays.get_mut(&stmt.target.name).unwrap()[slot] = value,
                None => {
                    self.scalars.insert(stmt.target.name.clone(), value);
                }
            }
        }

        match analyzed.signature {
            Signature::Complex => self.arrays.remove("xo").unwrap(),
            Signature::Split => {
                let io = self.arrays.remove("io").unwrap();
                let ro = self.arrays.remove("ro").unwrap();
                ro.iter().zip(&io).map(|(re, im)| Complex64::new(re.re, im.re)).collect()
            }
        }
    }
}

fn ident(path: &syn::ExprPath) -> String {
    path.path.get_ident().unwrap().to_string()
}
