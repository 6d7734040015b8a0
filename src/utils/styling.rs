//! Terminal styling utilities for the command-line output

use console::{style, Emoji};
use std::path::Path;

use crate::config::PipelineConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static GEAR: Emoji<'_, '_> = Emoji("🔧 ", "");
pub static SPLIT: Emoji<'_, '_> = Emoji("✂️  ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("tabpipe").cyan().bold(),
        style(format!("v{}", version)).dim()
    );
    println!(
        "    {}",
        style("Declarative tabular pipelines with cross-checked accuracy").dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config_path: &Path, config: &PipelineConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("Configuration").cyan().bold(),
        " ".repeat(box_width - 16)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Config:     {:<35}│",
        FOLDER,
        truncate_path(config_path, 34)
    );
    println!(
        "    │  {} Dataset:    {:<35}│",
        FOLDER,
        truncate_string(&config.dataset_file, 34)
    );
    println!(
        "    │  {} Target:     {:<35}│",
        TARGET,
        truncate_string(&config.target, 34)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Operations: {:<35}│",
        GEAR,
        style(config.operations.len()).yellow()
    );
    println!(
        "    │  {} Train:      {:<35}│",
        SPLIT,
        style(format!("{:.0}%", config.splitting.train * 100.0)).yellow()
    );
    let checkpoints = config
        .checkpoint_path
        .as_deref()
        .map(|p| truncate_path(p, 34))
        .unwrap_or_else(|| "disabled".to_string());
    println!("    │  {} Checkpoint: {:<35}│", SAVE, checkpoints);
    println!("    └{}┘", line);
    println!();
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Pipeline run complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}
