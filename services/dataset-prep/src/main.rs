//! Dataset preparation CLI.
//!
//! `window` stacks per-frame patches into temporal samples, `split` cuts the
//! windowed samples into train/val/test files by frame ranges.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use commands::{SplitArgs, WindowArgs};

#[derive(Parser, Debug)]
#[command(name = "dataset-prep")]
#[command(about = "Prepare windowed patch datasets for the heavy-rain classifier")]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build history-stacked samples from per-frame patches
    Window(WindowArgs),
    /// Split windowed samples into train/val/test by frame ranges
    Split(SplitArgs),
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .json()
        .init();

    match args.command {
        Command::Window(window) => commands::run_window(&window).map(|_| ()),
        Command::Split(split) => commands::run_split(&split).map(|_| ()),
    }
}
