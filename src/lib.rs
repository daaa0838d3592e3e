//! Menguar - compiler binary-size regression discovery harness
//!
//! Repeatedly generates random C programs with an external fuzzer, compiles
//! each at six optimization levels, and flags trials where the
//! size-optimized build is unexpectedly larger than less-optimized builds.
//! Flagged workspaces are kept on disk as evidence; root-causing the
//! compiler anomaly is left to a human.

pub mod cli;
pub mod compiler;
pub mod csv_output;
pub mod exec;
pub mod generator;
pub mod json_output;
pub mod pipeline;
pub mod stats;
pub mod verifier;
pub mod workspace;
