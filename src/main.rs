use std::fs;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use menguar::cli::{Cli, Fuzzer, OutputFormat};
use menguar::compiler::{CompilationMatrix, GccInvoker};
use menguar::generator::{CaseGenerator, CsmithGenerator, YarpgenGenerator};
use menguar::pipeline::GenerationPipeline;
use menguar::verifier::{RegressionVerifier, SizeTool};
use menguar::{csv_output, json_output};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; stage announcements at info, full
/// diagnostics behind --debug
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();

    if !args.timeout.is_finite() || args.timeout < 0.0 {
        anyhow::bail!(
            "Invalid value for --timeout: {} (must be a non-negative number of seconds)",
            args.timeout
        );
    }

    init_tracing(args.debug);

    let tool_timeout = (args.tool_timeout > 0).then(|| Duration::from_secs(args.tool_timeout));

    let output_dir = args.output_dir.join(args.fuzzer.label());
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let generator: Box<dyn CaseGenerator> = match args.fuzzer {
        Fuzzer::Yarpgen => Box::new(YarpgenGenerator::new(args.yarpgen_path, tool_timeout)),
        Fuzzer::Csmith => Box::new(CsmithGenerator::new(args.csmith_path, tool_timeout)),
    };
    let matrix = CompilationMatrix::new(GccInvoker::new(args.compiler, tool_timeout));
    let verifier = RegressionVerifier::new(SizeTool::new(args.size_tool, tool_timeout));

    let mut pipeline = GenerationPipeline::new(&output_dir, generator, matrix, verifier);
    pipeline.run(Duration::from_secs_f64(args.timeout))?;

    let summary = pipeline.summary();
    match args.format {
        OutputFormat::Csv => {
            let path = output_dir.join("results.csv");
            fs::write(&path, csv_output::to_csv(&summary))
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        OutputFormat::Json => {
            let path = output_dir.join("results.json");
            fs::write(&path, json_output::to_json(&summary)?)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
    }

    print!("{}", pipeline.stats().to_status_string());
    Ok(())
}
