//! Run summary report generation

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::PipelineRun;

/// Tolerance for reporting the two accuracy paths as agreeing
pub const ACCURACY_TOLERANCE: f64 = 1e-9;

/// Print per-step shapes and the dual accuracy of a finished run.
pub fn display_run_summary(run: &PipelineRun) {
    println!();
    println!(
        "    {} {}",
        style("📋").cyan(),
        style("PIPELINE STEPS").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut steps = Table::new();
    steps.load_preset(UTF8_FULL_CONDENSED);
    steps.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Operation").add_attribute(Attribute::Bold),
        Cell::new("Rows").add_attribute(Attribute::Bold),
        Cell::new("Columns").add_attribute(Attribute::Bold),
    ]);

    steps.add_row(vec![
        Cell::new("-"),
        Cell::new("Load").fg(Color::Cyan),
        Cell::new(run.loaded_shape.0),
        Cell::new(run.loaded_shape.1),
    ]);
    for (i, step) in run.steps.iter().enumerate() {
        steps.add_row(vec![
            Cell::new(i + 1),
            Cell::new(step.kind),
            Cell::new(step.rows),
            Cell::new(step.columns),
        ]);
    }
    print_indented(&steps);

    println!();
    println!(
        "    {} {}",
        style("📈").cyan(),
        style("EVALUATION").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    println!();

    let mut metrics = Table::new();
    metrics.load_preset(UTF8_FULL_CONDENSED);
    metrics.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    metrics.add_row(vec![Cell::new("Training rows"), Cell::new(run.train_rows)]);
    metrics.add_row(vec![
        Cell::new("Validation rows"),
        Cell::new(run.validation_rows),
    ]);
    metrics.add_row(vec![
        Cell::new("Library accuracy"),
        Cell::new(format!("{:.4}", run.result.library_accuracy)).add_attribute(Attribute::Bold),
    ]);
    metrics.add_row(vec![
        Cell::new("Manual accuracy"),
        Cell::new(format!("{:.4}", run.result.manual_accuracy)).add_attribute(Attribute::Bold),
    ]);

    let agrees = run.result.agrees(ACCURACY_TOLERANCE);
    metrics.add_row(vec![
        Cell::new("Cross-check"),
        if agrees {
            Cell::new("agree").fg(Color::Green)
        } else {
            Cell::new("MISMATCH").fg(Color::Red).add_attribute(Attribute::Bold)
        },
    ]);
    print_indented(&metrics);

    if let Some(dir) = &run.checkpoint_dir {
        println!();
        println!(
            "    {} {}",
            style("Checkpoints:").dim(),
            style(dir.display()).dim()
        );
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}
