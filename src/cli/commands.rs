// ABOUTME: Command implementations for the procflow CLI
// ABOUTME: Handles execution of the run and validate commands

use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

use super::app::App;
use crate::engine::{exit_code, Pipeline, FALLBACK_EXIT_CODE};
use crate::parser::{validate, NodeConfig};

/// Execute a pipeline and map its outcome to a process exit code
pub async fn run_pipeline(
    pipeline_path: PathBuf,
    app: &App,
    verbose: bool,
    no_color: bool,
) -> Result<i32> {
    let definition = NodeConfig::from_file(&pipeline_path)?;

    let span = app.init_logging(verbose, no_color, &definition.log)?;
    info!(
        "Starting procflow v{} with {}",
        env!("CARGO_PKG_VERSION"),
        pipeline_path.display()
    );

    let pipeline = Pipeline::new(definition, &span);
    let root = pipeline.root();
    info!(
        root = root.id(),
        kind = %root.kind(),
        policy = %root.policy(),
        children = root.children(),
        "Pipeline built"
    );

    let result = pipeline.run().await;
    let code = exit_code(&result);

    match &result {
        Ok(()) => info!("Pipeline completed"),
        Err(e) if code == FALLBACK_EXIT_CODE => {
            error!("{}", e);
            eprintln!("FATAL: {}", e);
        }
        Err(e) => error!(code, "{}", e),
    }

    Ok(code)
}

/// Parse a pipeline file and print its resolved tree with any diagnostics
pub async fn validate_pipeline(pipeline_path: PathBuf) -> Result<i32> {
    let definition = NodeConfig::from_file(&pipeline_path)?;
    let report = validate(&definition);

    println!("✓ Pipeline '{}' parsed", definition.id());
    print_tree(&definition, 1);

    if report.is_clean() {
        println!("  No warnings");
    } else {
        println!("  Warnings:");
        for diagnostic in &report.diagnostics {
            println!("    - {}", diagnostic);
        }
    }

    Ok(0)
}

fn print_tree(node: &NodeConfig, depth: usize) {
    println!("{}{}", "  ".repeat(depth), describe(node));
    for child in node.children() {
        print_tree(child, depth + 1);
    }
}

/// One-line summary such as `build (command, restart-if-error, timeout 2s)`.
pub fn describe(node: &NodeConfig) -> String {
    let policy = crate::engine::ExitPolicy::from_token(&node.on_exit);
    let mut summary = format!("{} ({}, {}", node.id(), node.kind(), policy);

    if let Some(timeout) = node.timeout.filter(|t| !t.is_zero()) {
        summary.push_str(&format!(", timeout {}", humantime::format_duration(timeout)));
    }

    summary.push(')');
    summary
}
