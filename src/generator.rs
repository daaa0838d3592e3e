//! Candidate program generation
//!
//! Sprint 1: YARPGen and Csmith drivers
//!
//! Two interchangeable external generators materialize the C source for a
//! trial: YARPGen writes files into the workspace through its own
//! `--out-dir` flag, Csmith streams a single translation unit to stdout.
//! The generator is picked once at run start; a broken generator would
//! invalidate every subsequent trial, so a non-zero exit aborts the run.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::exec::{run_tool, ToolOutput};
use crate::workspace::Workspace;

/// Trial-level outcome of one generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Source files are in place in the workspace
    Generated,
    /// The generator exceeded its time budget; the trial is discarded
    TimedOut,
}

/// Produces C source into a workspace
pub trait CaseGenerator {
    /// Short label used for the output directory and the summary record
    fn label(&self) -> &'static str;

    /// Fill `workspace` with one candidate source tree.
    ///
    /// `Err` is fatal for the whole run; a timeout is a trial-local result.
    fn generate(&self, workspace: &Workspace) -> Result<GenerateOutcome>;
}

fn check_generator_exit(tool: &str, output: &ToolOutput) -> Result<GenerateOutcome> {
    if output.timed_out {
        warn!(tool, "generator timed out; discarding trial");
        return Ok(GenerateOutcome::TimedOut);
    }
    if !output.success() {
        bail!(
            "{} failed with status {:?}: {}",
            tool,
            output.status,
            output.stderr_text().trim()
        );
    }
    Ok(GenerateOutcome::Generated)
}

/// Grammar-based generator: YARPGen writes sources itself
pub struct YarpgenGenerator {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl YarpgenGenerator {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CaseGenerator for YarpgenGenerator {
    fn label(&self) -> &'static str {
        "yarpgen"
    }

    fn generate(&self, workspace: &Workspace) -> Result<GenerateOutcome> {
        info!(case = %workspace.name, "generating program with YARPGen");
        let output = run_tool(
            Command::new(&self.program)
                .arg("--std=c")
                .arg(format!("--out-dir={}", workspace.path.display())),
            self.timeout,
        )?;
        let outcome = check_generator_exit("YARPGen", &output)?;
        if outcome == GenerateOutcome::Generated {
            info!("YARPGen program generated successfully");
        }
        Ok(outcome)
    }
}

/// Randomized stress-test generator: Csmith's stdout becomes `<name>.c`
pub struct CsmithGenerator {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl CsmithGenerator {
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl CaseGenerator for CsmithGenerator {
    fn label(&self) -> &'static str {
        "csmith"
    }

    fn generate(&self, workspace: &Workspace) -> Result<GenerateOutcome> {
        info!(case = %workspace.name, "generating program with Csmith");
        let output = run_tool(&mut Command::new(&self.program), self.timeout)?;
        let outcome = check_generator_exit("Csmith", &output)?;
        if outcome == GenerateOutcome::TimedOut {
            return Ok(outcome);
        }

        let source_path = workspace.path.join(format!("{}.c", workspace.name));
        fs::write(&source_path, &output.stdout)
            .with_context(|| format!("failed to write {}", source_path.display()))?;
        info!("Csmith program generated successfully");
        Ok(GenerateOutcome::Generated)
    }
}
