//! tabpipe: Tabular Pipeline CLI Tool
//!
//! Runs a configuration-driven pipeline: load a dataset, apply its declared
//! operations, train a classifier and report cross-checked accuracy.

use anyhow::{Context, Result};
use clap::Parser;

use tabpipe::cli::Cli;
use tabpipe::config::load_config;
use tabpipe::pipeline::execute;
use tabpipe::report::{display_run_summary, export_run_result, RunExport};
use tabpipe::utils::{init_logging, print_banner, print_completion, print_config, print_success};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration: {}", cli.config.display()))?;

    if let Some(root) = &cli.checkpoint_path {
        config.set_checkpoint_root(Some(root.clone()));
        config.invalidate_checkpoint_dir();
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&cli.config, &config);

    let run = execute(&config, &cli.base_path()).context("Pipeline run failed")?;

    display_run_summary(&run);

    if let Some(path) = &cli.output_json {
        export_run_result(&RunExport::new(&config, &run), path)
            .with_context(|| format!("Failed to write run result: {}", path.display()))?;
        println!();
        print_success(&format!("Run result saved to {}", path.display()));
    }

    print_completion();

    Ok(())
}
