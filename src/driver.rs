//! Batch generation over many kernel jobs
//!
//! Jobs are independent: a failure is logged and recorded, and the batch moves
//! on. Output files are replaced atomically, so a failed job never leaves a
//! partial kernel behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, error, info};

use crate::codegen::CodeGenerator;
use crate::error::{CompileError, CompileResult};
use crate::kernel::{Kernel, KernelJob};

/// A job that could not be generated
#[derive(Debug)]
pub struct JobFailure {
    pub job: KernelJob,
    pub error: CompileError,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failures: Vec<JobFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Runs kernel jobs with paths resolved against `base`
pub struct Driver {
    base: PathBuf,
}

impl Driver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Read both inputs of a job and generate its kernel without writing it.
    pub fn generate(&self, job: &KernelJob) -> CompileResult<Kernel> {
        let schedule_path = job.schedule_path(&self.base);
        let constants_path = job.constants_path(&self.base);

        let schedule = read_input(&schedule_path)?;
        let companion = read_input(&constants_path)?;

        let analyzed = crate::analyze_sources(&schedule, &companion).map_err(|e| match e {
            CompileError::ConstantFormatError { .. } => e.in_file(&constants_path),
            other => other.in_file(&schedule_path),
        })?;

        CodeGenerator::new(&job.func)
            .generate(&analyzed)
            .map_err(|e| e.in_file(&schedule_path))
    }

    /// Generate one job and write `<prefix>.rs`.
    pub fn run_job(&self, job: &KernelJob) -> CompileResult<PathBuf> {
        info!(prefix = %job.prefix, func = %job.func, "generating kernel");

        let kernel = self.generate(job)?;
        let output = job.output_path(&self.base);
        write_atomically(&output, kernel.source.as_bytes())?;

        info!(
            output = %output.display(),
            size = kernel.size,
            signature = ?kernel.signature,
            statements = kernel.statements,
            "wrote kernel"
        );
        Ok(output)
    }

    /// Run every job, continuing past failures.
    pub fn run_batch(&self, jobs: &[KernelJob]) -> BatchReport {
        let mut report = BatchReport::default();

        for job in jobs {
            match self.run_job(job) {
                Ok(path) => report.written.push(path),
                Err(err) => {
                    error!(prefix = %job.prefix, error = %err, "kernel generation failed");
                    report.failures.push(JobFailure {
                        job: job.clone(),
                        error: err,
                    });
                }
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failures.len(),
            "batch finished"
        );
        report
    }
}

fn read_input(path: &Path) -> CompileResult<String> {
    fs::read_to_string(path).map_err(|e| CompileError::io(path, e))
}

/// Replace `path` with `contents` through a temporary file in the same directory.
///
/// An existing file with identical contents is left untouched.
pub fn write_atomically(path: &Path, contents: &[u8]) -> CompileResult<()> {
    if fs::read(path).map(|existing| existing == contents).unwrap_or(false) {
        debug!(path = %path.display(), "output unchanged");
        return Ok(());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| CompileError::io(dir, e))?;
    file.write_all(contents).map_err(|e| CompileError::io(file.path(), e))?;
    file.persist(path).map_err(|e| CompileError::io(path, e.error))?;
    Ok(())
}
