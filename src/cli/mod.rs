//! Command-line interface.

pub mod commands;
pub mod display;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, render::RenderArgs, run::RunArgs, verify::VerifyArgs};

/// Turn consultation transcripts into verified, revised reports.
#[derive(Parser, Debug)]
#[command(name = "reportloop", version, about, long_about = None)]
pub struct Cli {
    /// Emit machine-readable JSON instead of human output
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .reportloop/config.yaml plus overrides)
    #[arg(long, short = 'c', global = true, env = "REPORTLOOP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a report and iterate verification and revision until it converges
    Run(RunArgs),
    /// Run a single verification round against an existing report
    Verify(VerifyArgs),
    /// Render a report artifact or a stored job as a document or HTML
    Render(RenderArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Print an error the way the selected output mode expects and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "status": "failed",
            "error": format!("{err:#}"),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("Error:").red().bold());
    }
    std::process::exit(1);
}
