mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::output::OutputFormat;

/// npbuild - builds the Npackd distribution from source
#[derive(Parser)]
#[command(name = "npbuild")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Project root containing the sources
  #[arg(short, long, global = true, default_value = ".")]
  project: PathBuf,

  /// Config file (default: npbuild.json in the project root, if present)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Toolchain root, overriding the configured one
  #[arg(long, global = true, env = "NPBUILD_TOOLCHAIN")]
  toolchain: Option<PathBuf>,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t)]
  format: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Install the required packages and run every build step
  Build,

  /// Show the build steps and whether each would be skipped
  Plan,

  /// Check that the toolchain and the package tool are usable
  Check,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let project = dunce::canonicalize(&cli.project)
    .with_context(|| format!("Project directory not found: {}", cli.project.display()))?;
  let ctx = cmd::Context::load(project, cli.config.as_deref(), cli.toolchain, cli.format)?;

  let succeeded = match cli.command {
    Commands::Build => cmd::cmd_build(&ctx)?,
    Commands::Plan => cmd::cmd_plan(&ctx, cli.verbose)?,
    Commands::Check => cmd::cmd_check(&ctx)?,
  };

  if !succeeded {
    std::process::exit(1);
  }
  Ok(())
}
