//! Binary-size regression verification
//!
//! Sprint 2: size measurement and the regression heuristic
//!
//! A size-optimized (`-Os`) build is expected to be the smallest, or very
//! nearly the smallest, of the matrix. Any other level undercutting it by
//! more than a fixed byte threshold is anomalous and flags the trial. This
//! is a heuristic over relative code size, never a semantic oracle.
//!
//! Measurement and decision are separate layers: measurement shells out to
//! the size tool per binary, the decision is a pure function over the
//! collected sizes.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::compiler::{binary_name, OPT_FLAGS, SIZE_OPT_FLAG};
use crate::exec::run_tool;

/// Size delta in bytes beyond which a smaller non-reference binary flags a
/// regression. Fixed configuration value of the heuristic, compared with
/// strict greater-than.
pub const SIZE_DELTA_THRESHOLD: u64 = 32;

/// Per-level measured sizes, aligned with `OPT_FLAGS` order.
///
/// `None` marks a binary that was not on disk at measurement time; such
/// levels are skipped by the decision rule rather than read as size zero,
/// so a missing binary can never spuriously flag a trial.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSizes {
    sizes: [Option<u64>; OPT_FLAGS.len()],
}

impl LevelSizes {
    pub fn set(&mut self, flag: &str, size: Option<u64>) {
        if let Some(idx) = OPT_FLAGS.iter().position(|f| *f == flag) {
            self.sizes[idx] = size;
        } else {
            debug_assert!(false, "unknown optimization flag {flag}");
        }
    }

    pub fn get(&self, flag: &str) -> Option<u64> {
        OPT_FLAGS
            .iter()
            .position(|f| *f == flag)
            .and_then(|idx| self.sizes[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<u64>)> + '_ {
        OPT_FLAGS.iter().copied().zip(self.sizes.iter().copied())
    }
}

/// Apply the regression heuristic to one trial's measured sizes.
///
/// Regression ⇔ some level other than `-Os` with a measured size undercuts
/// the `-Os` size by more than [`SIZE_DELTA_THRESHOLD`] bytes. Without a
/// measured `-Os` reference nothing can flag.
pub fn regression_in(sizes: &LevelSizes) -> bool {
    let Some(reference) = sizes.get(SIZE_OPT_FLAG) else {
        return false;
    };
    sizes.iter().any(|(flag, size)| {
        flag != SIZE_OPT_FLAG
            && size.is_some_and(|s| reference.saturating_sub(s) > SIZE_DELTA_THRESHOLD)
    })
}

/// Reads the size of one on-disk binary.
///
/// `Ok(None)` means the file does not exist; a failing or unparseable tool
/// invocation is fatal for the run.
pub trait SizeReader {
    fn binary_size(&self, path: &Path) -> Result<Option<u64>>;
}

/// Shells out to binutils `size` and reads the second stdout line's first
/// whitespace-delimited field
pub struct SizeTool {
    program: String,
    timeout: Option<Duration>,
}

impl SizeTool {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

impl SizeReader for SizeTool {
    fn binary_size(&self, path: &Path) -> Result<Option<u64>> {
        if !path.exists() {
            return Ok(None);
        }

        let output = run_tool(Command::new(&self.program).arg(path), self.timeout)
            .with_context(|| format!("failed to run {}", self.program))?;
        if !output.success() {
            bail!(
                "{} {} failed with status {:?}: {}",
                self.program,
                path.display(),
                output.status,
                output.stderr_text().trim()
            );
        }

        let size = parse_size_output(&output.stdout_text()).with_context(|| {
            format!(
                "unparseable {} output for {}",
                self.program,
                path.display()
            )
        })?;
        Ok(Some(size))
    }
}

/// Parse size-tool output: second line, first field. Output with fewer than
/// two lines reads as zero.
fn parse_size_output(stdout: &str) -> Result<u64> {
    let Some(line) = stdout.lines().nth(1) else {
        return Ok(0);
    };
    let field = line
        .split_whitespace()
        .next()
        .context("empty size report line")?;
    field
        .parse::<u64>()
        .with_context(|| format!("bad size field {field:?}"))
}

/// Judges one trial's binary directory against the regression heuristic
pub struct RegressionVerifier<R: SizeReader> {
    reader: R,
}

impl<R: SizeReader> RegressionVerifier<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Measure every level's binary for `out_name` under `binary_dir`
    pub fn measure(&self, binary_dir: &Path, out_name: &str) -> Result<LevelSizes> {
        let mut sizes = LevelSizes::default();
        for flag in OPT_FLAGS {
            let path = binary_dir.join(binary_name(out_name, flag));
            let size = self.reader.binary_size(&path)?;
            match size {
                Some(bytes) => info!(flag, bytes, "binary size"),
                None => warn!(flag, path = %path.display(), "binary missing; level skipped"),
            }
            sizes.set(flag, size);
        }
        Ok(sizes)
    }

    /// Decide whether `binary_dir` holds an anomalous trial.
    ///
    /// A missing directory is "no regression", not an error. Idempotent for
    /// unchanged on-disk state.
    pub fn verify(&self, binary_dir: &Path, out_name: &str) -> Result<bool> {
        if !binary_dir.exists() {
            warn!(dir = %binary_dir.display(), "binary directory does not exist");
            return Ok(false);
        }
        let sizes = self.measure(binary_dir, out_name)?;
        Ok(regression_in(&sizes))
    }
}
