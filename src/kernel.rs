//! Kernel jobs and generated kernels
//!
//! A job names the artifact prefix written by the codelet generator and the
//! function to emit. For prefix `dft/dft_float3` the inputs are
//! `dft/dft_float3.alst` (schedule) and `dft/dft_float3.cout` (C output with
//! the constant table), and the kernel is written to `dft/dft_float3.rs`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ast::Signature;
use crate::error::{CompileError, CompileResult};

/// One entry of the batch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelJob {
    /// Artifact path without extension
    pub prefix: String,
    /// Name of the generated function
    pub func: String,
}

impl KernelJob {
    pub fn new(prefix: impl Into<String>, func: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            func: func.into(),
        }
    }

    pub fn schedule_path(&self, base: &Path) -> PathBuf {
        self.with_extension(base, "alst")
    }

    pub fn constants_path(&self, base: &Path) -> PathBuf {
        self.with_extension(base, "cout")
    }

    pub fn output_path(&self, base: &Path) -> PathBuf {
        self.with_extension(base, "rs")
    }

    // Appended rather than `Path::with_extension`, which would eat a dotted prefix.
    fn with_extension(&self, base: &Path, ext: &str) -> PathBuf {
        base.join(format!("{}.{}", self.prefix, ext))
    }
}

/// Read a JSON array of jobs.
pub fn load_jobs(path: &Path) -> CompileResult<Vec<KernelJob>> {
    let text = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
    serde_json::from_str(&text).map_err(|source| CompileError::ConfigError {
        path: path.to_path_buf(),
        source,
    })
}

/// A generated kernel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kernel {
    /// Function name
    pub name: String,
    /// Transform size N
    pub size: usize,
    pub signature: Signature,
    /// Number of constants, the implicit `I` included
    pub constants: usize,
    pub statements: usize,
    /// Complete Rust source file
    pub source: String,
}

impl Kernel {
    /// Export as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One-line description for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "{}: N = {}, {} signature, {} constants, {} statements",
            self.name, self.size, self.signature, self.constants, self.statements
        )
    }
}
