//! Workspace allocation
//!
//! Each trial runs inside its own uniquely named scratch directory under the
//! run's output root. Names are short random uppercase strings; the alphabet
//! keeps the collision probability near zero for any realistic trial count,
//! and `create_dir` doubles as the atomic uniqueness check.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;

/// Length of generated workspace names
pub const NAME_LEN: usize = 4;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A uniquely named scratch directory holding one trial's sources and binaries
#[derive(Debug)]
pub struct Workspace {
    pub path: PathBuf,
    pub name: String,
}

impl Workspace {
    /// Delete the workspace tree. Clean and failed trials are discarded to
    /// bound disk use; only flagged trials stay on disk.
    pub fn remove(&self) -> Result<()> {
        fs::remove_dir_all(&self.path)
            .with_context(|| format!("failed to remove workspace {}", self.path.display()))
    }
}

fn random_name(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Allocate a fresh workspace under `base_dir`.
///
/// A generated name that already exists on disk is regenerated and retried;
/// any other filesystem error (permissions, missing base) is fatal for the
/// run and propagates.
pub fn allocate(base_dir: &Path) -> Result<Workspace> {
    loop {
        let name = random_name(NAME_LEN);
        let path = base_dir.join(&name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(Workspace { path, name }),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to create workspace {}", path.display()))
            }
        }
    }
}
