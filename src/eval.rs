//! Schedule evaluation and the direct DFT reference
//!
//! The evaluator runs an analyzed program over complex input with the same
//! operation order the generated kernel uses. Split kernels are evaluated on
//! values with a zero imaginary part, which reproduces their `f64` results
//! exactly.

use std::collections::HashMap;
use std::f64::consts::PI;

use num_complex::Complex64;

use crate::ast::{AnalyzedProgram, ConstValue, Expr, Operator, Signature};
use crate::error::{CompileError, CompileResult};

/// Largest acceptable mean error for a step input
pub const STEP_TOLERANCE: f64 = 2.5e-15;

/// Interpreter for one analyzed program
pub struct Evaluator<'a> {
    analyzed: &'a AnalyzedProgram,
    constants: HashMap<&'a str, Complex64>,
}

/// Array state of one run
struct Frame<'a> {
    arrays: HashMap<&'a str, Vec<Complex64>>,
    temporaries: HashMap<&'a str, Complex64>,
}

impl<'a> Evaluator<'a> {
    pub fn new(analyzed: &'a AnalyzedProgram) -> CompileResult<Self> {
        let mut constants = HashMap::new();

        for constant in &analyzed.program.constants {
            let value = match &constant.value {
                ConstValue::ImaginaryUnit => Complex64::i(),
                ConstValue::Literal(literal) => {
                    let re = literal.parse::<f64>().map_err(|e| {
                        CompileError::eval(format!("constant {} = {}: {}", constant.name, literal, e))
                    })?;
                    Complex64::new(re, 0.0)
                }
            };
            constants.insert(constant.name.as_str(), value);
        }

        Ok(Self { analyzed, constants })
    }

    /// Run the kernel on `input` (length N) and return its N outputs.
    pub fn run(&self, input: &[Complex64]) -> CompileResult<Vec<Complex64>> {
        let analyzed = self.analyzed;
        let size = analyzed.size;
        if input.len() != size {
            return Err(CompileError::eval(format!(
                "kernel expects {} inputs, got {}",
                size,
                input.len()
            )));
        }

        let mut arrays: HashMap<&'a str, Vec<Complex64>> = HashMap::new();
        match analyzed.signature {
            Signature::Complex => {
                arrays.insert("xi", input.to_vec());
            }
            Signature::Split => {
                arrays.insert("ri", input.iter().map(|x| Complex64::new(x.re, 0.0)).collect());
                arrays.insert("ii", input.iter().map(|x| Complex64::new(x.im, 0.0)).collect());
            }
        }
        for name in analyzed.signature.outputs() {
            arrays.insert(*name, vec![Complex64::new(0.0, 0.0); size]);
        }

        let mut frame = Frame {
            arrays,
            temporaries: HashMap::new(),
        };

        for stmt in &analyzed.program.statements {
            let value = self.eval(&frame, &stmt.value)?;
            match stmt.target.index {
                Some(index) => {
                    let slot = frame
                        .arrays
                        .get_mut(stmt.target.name.as_str())
                        .and_then(|array| array.get_mut(index))
                        .ok_or_else(|| CompileError::eval(format!("no array slot {}", stmt.target)))?;
                    *slot = value;
                }
                None => {
                    frame.temporaries.insert(stmt.target.name.as_str(), value);
                }
            }
        }

        let output = match analyzed.signature {
            Signature::Complex => frame.arrays.remove("xo").unwrap_or_default(),
            Signature::Split => {
                let ro = frame.arrays.remove("ro").unwrap_or_default();
                let io = frame.arrays.remove("io").unwrap_or_default();
                ro.iter()
                    .zip(&io)
                    .map(|(re, im)| Complex64::new(re.re, im.re))
                    .collect()
            }
        };

        Ok(output)
    }

    fn eval(&self, frame: &Frame<'a>, expr: &Expr) -> CompileResult<Complex64> {
        match expr {
            Expr::Leaf(leaf) => {
                let value = match leaf.index {
                    Some(index) => frame
                        .arrays
                        .get(leaf.name.as_str())
                        .and_then(|array| array.get(index))
                        .copied(),
                    None => frame
                        .temporaries
                        .get(leaf.name.as_str())
                        .or_else(|| self.constants.get(leaf.name.as_str()))
                        .copied(),
                };
                value.ok_or_else(|| CompileError::eval(format!("`{}` is used before it is defined", leaf)))
            }
            Expr::Operation { op, operands } => {
                let mut values = operands.iter().map(|operand| self.eval(frame, operand));
                let first = values
                    .next()
                    .ok_or_else(|| CompileError::eval(format!("`{}` has no operands", op)))??;

                if operands.len() == 1 {
                    return match op {
                        Operator::Sub => Ok(-first),
                        other => Err(CompileError::eval(format!("unary `{}`", other))),
                    };
                }

                values.try_fold(first, |acc, value| {
                    let value = value?;
                    match op {
                        Operator::Add => Ok(acc + value),
                        Operator::Sub => Ok(acc - value),
                        Operator::Mul => Ok(acc * value),
                        Operator::Assign => Err(CompileError::eval("nested assignment")),
                    }
                })
            }
        }
    }
}

/// Input whose first `n / 2` samples are one and the rest zero
pub fn step_input(n: usize) -> Vec<Complex64> {
    (0..n)
        .map(|idx| if idx < n / 2 { Complex64::new(1.0, 0.0) } else { Complex64::new(0.0, 0.0) })
        .collect()
}

/// All-pairs DFT; `sign` is -1 for the forward transform.
pub fn direct_dft(input: &[Complex64], sign: f64) -> Vec<Complex64> {
    let n = input.len();
    let phi = sign * 2.0 * PI / n as f64;

    (0..n)
        .map(|w| {
            input.iter().enumerate().fold(Complex64::new(0.0, 0.0), |acc, (k, x)| {
                acc + x * Complex64::from_polar(1.0, phi * k as f64 * w as f64)
            })
        })
        .collect()
}

/// Mean absolute complex difference
pub fn mean_abs_error(lhs: &[Complex64], rhs: &[Complex64]) -> f64 {
    let total: f64 = lhs.iter().zip(rhs).map(|(a, b)| (a - b).norm()).sum();
    total / lhs.len().max(1) as f64
}

/// Mean error of the kernel on a step input against the forward direct DFT.
pub fn verify_step(analyzed: &AnalyzedProgram) -> CompileResult<f64> {
    let input = step_input(analyzed.size);
    let output = Evaluator::new(analyzed)?.run(&input)?;
    Ok(mean_abs_error(&output, &direct_dft(&input, -1.0)))
}
