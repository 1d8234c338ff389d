//! Codelet Schedule to Rust Kernel Generator
//!
//! This library turns the straight-line schedules written by an FFT codelet
//! generator into fixed-size Rust DFT kernels. A schedule is one assignment
//! per line, e.g. `(:= T1 (+ ri[0] ri[1]))`; the numeric constants it uses are
//! declared in a companion file as `DK(KP500000000, +0.5000...);`.
//!
//! # Example
//!
//! ```rust
//! use schedule_to_kernel::{compile, Signature};
//!
//! let schedule = "(:= T1 xi[0])\n(:= T2 xi[1])\n(:= xo[0] (+ T1 T2))\n(:= xo[1] (- T1 T2))";
//! let kernel = compile(schedule, "", "dft_cmplx2").unwrap();
//! assert_eq!(kernel.size, 2);
//! assert_eq!(kernel.signature, Signature::Complex);
//! assert!(kernel.source.contains("xo[1] = T1 - T2;"));
//! ```

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod constants;
pub mod analyzer;
pub mod codegen;
pub mod kernel;
pub mod eval;
pub mod driver;
pub mod error;

pub use ast::*;
pub use parser::Parser;
pub use analyzer::Analyzer;
pub use codegen::CodeGenerator;
pub use constants::extract_constants;
pub use kernel::{Kernel, KernelJob};
pub use driver::{BatchReport, Driver};
pub use eval::Evaluator;
pub use error::{CompileError, CompileResult};

/// Parse a schedule and its companion constant table and infer kernel metadata
pub fn analyze_sources(schedule: &str, companion: &str) -> CompileResult<AnalyzedProgram> {
    // Parse the schedule
    let mut parser = Parser::new(schedule);
    let statements = parser.parse_program()?;

    // Merge the constant table
    let constants = extract_constants(companion)?;

    // Infer size and signature
    Analyzer::new().analyze(Program::new(constants, statements))
}

/// Main generation function: schedule and constant table in, kernel source out
pub fn compile(schedule: &str, companion: &str, name: &str) -> CompileResult<Kernel> {
    let analyzed = analyze_sources(schedule, companion)?;
    CodeGenerator::new(name).generate(&analyzed)
}
