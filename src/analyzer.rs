//! Kernel metadata inference
//!
//! Infers the kernel size and parameter layout from the array references of a
//! parsed program, and checks that every array reference fits that layout.

use std::collections::BTreeSet;

use crate::ast::*;
use crate::error::{CompileError, CompileResult};

/// Analyzer for signature and size inference
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze a program and attach its kernel metadata.
    ///
    /// Complex kernels get the imaginary unit `I` prepended to their constants.
    pub fn analyze(&self, mut program: Program) -> CompileResult<AnalyzedProgram> {
        let signature = infer_signature(&program);
        self.check_arrays(&program, signature)?;

        let size = kernel_size(&program)
            .ok_or_else(|| CompileError::program("schedule references no array elements"))?;

        if signature == Signature::Complex {
            program.constants.insert(0, Constant::imaginary_unit());
        }

        Ok(AnalyzedProgram {
            program,
            size,
            signature,
        })
    }

    /// Inputs are only read, outputs are only written, and nothing else is indexed.
    fn check_arrays(&self, program: &Program, signature: Signature) -> CompileResult<()> {
        for stmt in &program.statements {
            let fail = |msg: String| CompileError::grammar(stmt.line, stmt.target.to_string(), msg);

            if stmt.target.index.is_none() && !stmt.target.is_temporary() {
                return Err(fail(format!(
                    "`{}` is neither a temporary nor an array element",
                    stmt.target.name
                )));
            }

            if stmt.target.index.is_some() && !signature.outputs().contains(&stmt.target.name.as_str()) {
                return Err(fail(format!(
                    "`{}` is not an output array of a {} kernel",
                    stmt.target.name, signature
                )));
            }

            for leaf in stmt.value.leaves().filter(|leaf| leaf.index.is_some()) {
                if !signature.inputs().contains(&leaf.name.as_str()) {
                    return Err(fail(format!(
                        "`{}` is not an input array of a {} kernel",
                        leaf.name, signature
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Base names of every indexed leaf in the program
pub fn array_names(program: &Program) -> BTreeSet<&str> {
    program
        .leaves()
        .filter(|leaf| leaf.index.is_some())
        .map(|leaf| leaf.name.as_str())
        .collect()
}

/// Split layout if any array is the real or imaginary input part, complex otherwise.
pub fn infer_signature(program: &Program) -> Signature {
    let arrays = array_names(program);
    if Signature::Split.inputs().iter().any(|name| arrays.contains(name)) {
        Signature::Split
    } else {
        Signature::Complex
    }
}

/// One plus the largest array index anywhere in the program
pub fn kernel_size(program: &Program) -> Option<usize> {
    program
        .leaves()
        .filter_map(|leaf| leaf.index)
        .max()
        .map(|max| max + 1)
}
