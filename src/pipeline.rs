//! Generation pipeline controller
//!
//! Sprint 1-2: the generate→compile→verify loop
//!
//! The controller drives trials sequentially under a wall-clock budget. Each
//! trial allocates a fresh workspace, asks the generator to fill it, runs
//! the compilation matrix, and judges the binaries with the regression
//! verifier. Clean and failed workspaces are deleted to bound disk use;
//! flagged workspaces stay on disk for human inspection. The budget gates
//! starting a trial, never preempts one, so a run may modestly overrun it by
//! one in-flight trial.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::info;

use crate::compiler::{CompilationMatrix, CompileOutcome, CompilerInvoker};
use crate::generator::{CaseGenerator, GenerateOutcome};
use crate::stats::{PipelineStats, SummaryRecord};
use crate::verifier::{RegressionVerifier, SizeReader};
use crate::workspace;

/// Ephemeral record of one trial, consumed immediately by the controller
#[derive(Debug)]
pub struct TrialResult {
    pub workspace: PathBuf,
    pub case_name: String,
    pub compiled: bool,
    pub regression: bool,
    pub elapsed: Duration,
}

/// Drives generate→compile→verify trials and owns the run statistics
pub struct GenerationPipeline<I: CompilerInvoker, R: SizeReader> {
    output_dir: PathBuf,
    generator: Box<dyn CaseGenerator>,
    matrix: CompilationMatrix<I>,
    verifier: RegressionVerifier<R>,
    stats: PipelineStats,
}

impl<I: CompilerInvoker, R: SizeReader> GenerationPipeline<I, R> {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        generator: Box<dyn CaseGenerator>,
        matrix: CompilationMatrix<I>,
        verifier: RegressionVerifier<R>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            generator,
            matrix,
            verifier,
            stats: PipelineStats::new(),
        }
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Run one full trial against a fresh workspace.
    ///
    /// Fatal conditions (generator non-zero exit, unusable toolchain, size
    /// tool errors, workspace allocation failures) propagate as `Err` and
    /// abort the run; everything else is counted and the loop continues.
    pub fn run_trial(&mut self) -> Result<TrialResult> {
        let start = Instant::now();
        self.stats.record_try();

        let ws = workspace::allocate(&self.output_dir)?;
        let mut compiled = false;
        let mut regression = false;

        match self.generator.generate(&ws)? {
            GenerateOutcome::TimedOut => {
                // Discarded like a failed compile; the run goes on
                self.stats.record_failure();
                ws.remove()?;
            }
            GenerateOutcome::Generated => {
                match self.matrix.compile(&ws.path, &ws.path, &ws.name)? {
                    CompileOutcome::Failed { .. } => {
                        self.stats.record_failure();
                        ws.remove()?;
                    }
                    CompileOutcome::Success => {
                        compiled = true;
                        self.stats.record_success();
                        regression = self.verifier.verify(&ws.path, &ws.name)?;
                        if regression {
                            let at = self.stats.total_time + start.elapsed();
                            self.stats.record_regression(at);
                            info!(workspace = %ws.path.display(), "regression detected");
                            println!("[!] Regression detected in {}", ws.path.display());
                        } else {
                            ws.remove()?;
                        }
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        self.stats.add_elapsed(elapsed);
        Ok(TrialResult {
            workspace: ws.path,
            case_name: ws.name,
            compiled,
            regression,
            elapsed,
        })
    }

    /// Run trials until the accumulated wall-clock time reaches `timeout`.
    ///
    /// The check happens before each trial, so the budget can be exceeded by
    /// at most the final trial's duration.
    pub fn run(&mut self, timeout: Duration) -> Result<()> {
        while self.stats.total_time < timeout {
            self.run_trial()?;
        }
        Ok(())
    }

    /// Final seven-field summary handed to the reporting sink
    pub fn summary(&self) -> SummaryRecord {
        self.stats.summary(self.generator.label())
    }
}
