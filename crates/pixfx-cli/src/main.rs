//! pixfx - image filter and pipeline CLI
//!
//! Runs XML filter pipelines, applies single filters to images and lists
//! the available filters.

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pixfx")]
#[command(author, version, about = "Image filter pipelines")]
#[command(long_about = "
Applies image filters and runs XML filter pipelines.

Examples:
  pixfx list                                  # Filters and their parameters
  pixfx list --json                           # Same, machine-readable
  pixfx apply Blur in.png -o out.png -p Radius=2.5
  pixfx apply Grayscale in.png -o out.png --clip 0,0,64,64
  pixfx apply ChannelJoin in.png -o out.png --image Red=mask.png
  pixfx run pipeline.xml -o result.png --snapshot screen.png
  RUST_LOG=pixfx_ops=trace pixfx run pipeline.xml
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (repeat for more: -v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an XML filter pipeline
    #[command(visible_alias = "r")]
    Run(RunArgs),

    /// Apply one filter to an image
    #[command(visible_alias = "a")]
    Apply(ApplyArgs),

    /// List filters and their parameters
    #[command(visible_alias = "l")]
    List(ListArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Pipeline document
    pipeline: PathBuf,

    /// Write the ReturnValue image here
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image used for <SNAPSHOT/> references
    #[arg(short, long)]
    snapshot: Option<PathBuf>,
}

#[derive(Args)]
struct ApplyArgs {
    /// Filter name (see `pixfx list`)
    filter: String,

    /// Input image
    input: PathBuf,

    /// Output image
    #[arg(short, long)]
    output: PathBuf,

    /// Parameter as Name=Value (repeatable)
    #[arg(short, long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Image-valued parameter as Name=path (repeatable)
    #[arg(short, long = "image", value_name = "NAME=PATH")]
    images: Vec<String>,

    /// Restrict the change to x,y,width,height (repeatable)
    #[arg(short, long = "clip", value_name = "X,Y,W,H")]
    clips: Vec<String>,
}

#[derive(Args)]
struct ListArgs {
    /// Machine-readable output (JSON)
    #[arg(long)]
    json: bool,

    /// Only this filter
    filter: Option<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Apply(args) => commands::apply::run(args, cli.verbose),
        Commands::List(args) => commands::list::run(args),
    }
}
