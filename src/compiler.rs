//! Compilation matrix
//!
//! Sprint 1: one compile per optimization level
//!
//! A candidate source tree is compiled once per optimization level, in a
//! fixed order, producing one binary per level. The matrix short-circuits on
//! the first failing level: compilation is deterministic across levels for a
//! fixed source, so one failure means the source itself is unsound and the
//! remaining levels are wasted work.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::exec::run_tool;

/// The fixed optimization level set, in matrix order
pub const OPT_FLAGS: [&str; 6] = ["-O0", "-O1", "-O2", "-O3", "-Os", "-Ofast"];

/// Reference level for the size comparison
pub const SIZE_OPT_FLAG: &str = "-Os";

/// Name of the binary produced for `case_name` at `flag`
pub fn binary_name(case_name: &str, flag: &str) -> String {
    format!("{case_name}{flag}.out")
}

/// Outcome of one pass over the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOutcome {
    /// Every level produced a binary
    Success,
    /// The named level failed or timed out; later levels were not attempted
    Failed { flag: &'static str },
}

/// One external compiler invocation.
///
/// The trait seam keeps the matrix logic testable without spawning a real
/// toolchain.
pub trait CompilerInvoker {
    /// Compile `c_files` at `flag` into `out_path`; `Ok(true)` on exit code 0.
    ///
    /// `Err` means the compiler could not be run at all, which is fatal.
    fn compile_once(
        &self,
        flag: &str,
        c_files: &[PathBuf],
        include_dir: &Path,
        out_path: &Path,
    ) -> Result<bool>;
}

/// Invokes the system C compiler (`gcc-11` by default)
pub struct GccInvoker {
    program: String,
    timeout: Option<Duration>,
}

impl GccInvoker {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CompilerInvoker for GccInvoker {
    fn compile_once(
        &self,
        flag: &str,
        c_files: &[PathBuf],
        include_dir: &Path,
        out_path: &Path,
    ) -> Result<bool> {
        let mut command = Command::new(&self.program);
        command
            .arg(flag)
            .args(c_files)
            .arg(format!("-I{}", include_dir.display()))
            .arg("-o")
            .arg(out_path);

        let output = run_tool(&mut command, self.timeout)
            .with_context(|| format!("failed to run compiler {}", self.program))?;

        if output.timed_out {
            warn!(flag, "compiler invocation timed out");
            return Ok(false);
        }
        if !output.success() {
            debug!(flag, stderr = %output.stderr_text().trim(), "compiler exited with failure");
        }
        Ok(output.success())
    }
}

/// Runs a source tree through every optimization level
pub struct CompilationMatrix<I: CompilerInvoker> {
    invoker: I,
}

impl<I: CompilerInvoker> CompilationMatrix<I> {
    pub fn new(invoker: I) -> Self {
        Self { invoker }
    }

    /// Compile every `.c` file in `source_dir` once per level, writing
    /// `<out_name><flag>.out` binaries into `out_dir`.
    pub fn compile(
        &self,
        source_dir: &Path,
        out_dir: &Path,
        out_name: &str,
    ) -> Result<CompileOutcome> {
        let c_files = collect_c_files(source_dir)?;
        if c_files.is_empty() {
            warn!(dir = %source_dir.display(), "no .c files to compile");
            return Ok(CompileOutcome::Failed { flag: OPT_FLAGS[0] });
        }

        info!(case = out_name, files = c_files.len(), "compiling the program");
        for flag in OPT_FLAGS {
            let out_path = out_dir.join(binary_name(out_name, flag));
            if !self
                .invoker
                .compile_once(flag, &c_files, source_dir, &out_path)?
            {
                warn!(flag, "compilation failed");
                return Ok(CompileOutcome::Failed { flag });
            }
        }
        Ok(CompileOutcome::Success)
    }
}

/// All `.c` files directly under `source_dir`, sorted for deterministic
/// command lines
fn collect_c_files(source_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("failed to read source directory {}", source_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", source_dir.display()))?
            .path();
        if path.extension().is_some_and(|ext| ext == "c") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
