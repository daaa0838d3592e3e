//! CLI argument parsing for Menguar

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Which external program generator drives the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Fuzzer {
    /// Grammar-based YARPGen generator
    Yarpgen,
    /// Randomized Csmith stress-test generator
    Csmith,
}

impl Fuzzer {
    /// Label used for the per-run output subdirectory and the summary record
    pub fn label(&self) -> &'static str {
        match self {
            Fuzzer::Yarpgen => "yarpgen",
            Fuzzer::Csmith => "csmith",
        }
    }
}

/// Output format for the summary record
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// results.csv, one header row and one data row (default)
    Csv,
    /// results.json, pretty-printed
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "menguar")]
#[command(version)]
#[command(about = "Hunt compiler binary-size regressions with randomized C programs", long_about = None)]
pub struct Cli {
    /// Fuzzer that generates candidate programs
    #[arg(long = "fuzzer", value_enum)]
    pub fuzzer: Fuzzer,

    /// Total runtime budget in seconds
    #[arg(long = "timeout", value_name = "SECONDS", default_value = "10800.0")]
    pub timeout: f64,

    /// Base output directory; run artifacts land in <DIR>/<fuzzer>
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Path to the YARPGen binary
    #[arg(
        long = "yarpgen-path",
        value_name = "PATH",
        default_value = "./yarpgen.out"
    )]
    pub yarpgen_path: PathBuf,

    /// Csmith program (resolved on PATH by default)
    #[arg(long = "csmith-path", value_name = "PATH", default_value = "csmith")]
    pub csmith_path: PathBuf,

    /// C compiler used for the optimization matrix
    #[arg(long = "compiler", value_name = "PROGRAM", default_value = "gcc-11")]
    pub compiler: String,

    /// Size-reporting tool used for binary measurements
    #[arg(long = "size-tool", value_name = "PROGRAM", default_value = "size")]
    pub size_tool: String,

    /// Per-invocation timeout for external tools in seconds (0 disables)
    #[arg(long = "tool-timeout", value_name = "SECONDS", default_value = "300")]
    pub tool_timeout: u64,

    /// Summary record format
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormat,

    /// Emit verbose tracing diagnostics to stderr
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_fuzzer_selector() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "yarpgen"]);
        assert_eq!(cli.fuzzer, Fuzzer::Yarpgen);

        let cli = Cli::parse_from(["menguar", "--fuzzer", "csmith"]);
        assert_eq!(cli.fuzzer, Fuzzer::Csmith);
    }

    #[test]
    fn test_cli_requires_fuzzer() {
        assert!(Cli::try_parse_from(["menguar"]).is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_fuzzer() {
        assert!(Cli::try_parse_from(["menguar", "--fuzzer", "afl"]).is_err());
    }

    #[test]
    fn test_cli_timeout_default_three_hours() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "yarpgen"]);
        assert_eq!(cli.timeout, 10800.0);
    }

    #[test]
    fn test_cli_timeout_custom() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "yarpgen", "--timeout", "60.5"]);
        assert_eq!(cli.timeout, 60.5);
    }

    #[test]
    fn test_cli_tool_defaults() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "yarpgen"]);
        assert_eq!(cli.compiler, "gcc-11");
        assert_eq!(cli.size_tool, "size");
        assert_eq!(cli.yarpgen_path, PathBuf::from("./yarpgen.out"));
        assert_eq!(cli.csmith_path, PathBuf::from("csmith"));
        assert_eq!(cli.tool_timeout, 300);
    }

    #[test]
    fn test_cli_format_default_csv() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "csmith"]);
        assert_eq!(cli.format, OutputFormat::Csv);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "csmith", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_debug_default_false() {
        let cli = Cli::parse_from(["menguar", "--fuzzer", "yarpgen"]);
        assert!(!cli.debug);
    }

    #[test]
    fn test_fuzzer_labels() {
        assert_eq!(Fuzzer::Yarpgen.label(), "yarpgen");
        assert_eq!(Fuzzer::Csmith.label(), "csmith");
    }
}
