//! `videoclaw` - AI short video creation pipeline.
//!
//! Each pipeline step is its own subcommand operating on a project under
//! the projects root; `run` chains them all.

mod app;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use videoclaw_core::config::home_config_dir;
use videoclaw_core::logging::{init_tracing, init_tracing_with_file, LogLevel};

use app::App;
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise warnings only unless verbose.
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let _guard = match home_config_dir() {
        Some(dir) => init_tracing_with_file(level, &dir.join("logs")),
        None => {
            init_tracing(level);
            None
        }
    };

    tracing::debug!("videoclaw {}", videoclaw_core::version());

    let app = App::new(&cli);
    let result = commands::dispatch(&app, cli.command);
    app.flush_logs();
    result
}
