mod cmd;
mod host;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use luashim_lib::{Shim, ShimConfig};
use tracing_subscriber::EnvFilter;

use cmd::{cmd_eval, cmd_repl, cmd_run, map_shim_err};
use output::OutputFormat;

/// luashim - run Lua snippets with redirected standard streams
#[derive(Parser)]
#[command(name = "luashim")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(long, global = true, value_enum, default_value_t)]
  format: OutputFormat,

  /// Interpreter memory limit in bytes (overrides LUASHIM_MEMORY_LIMIT)
  #[arg(long, global = true)]
  memory_limit: Option<usize>,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a Lua file as one snippet
  Run {
    /// Path to the Lua file
    file: PathBuf,
  },

  /// Run inline Lua source as one snippet
  Eval {
    /// Lua source text
    code: String,
  },

  /// Read snippets from stdin, one per line
  Repl,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  // Logs go to stderr so redirected output stays clean
  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::from_default_env()
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let mut config = ShimConfig::from_env();
  if cli.memory_limit.is_some() {
    config.memory_limit = cli.memory_limit;
  }
  let shim = map_shim_err(Shim::builder().config(config).build())?;

  let completed = match cli.command {
    Commands::Run { file } => cmd_run(&shim, &file, cli.format)?,
    Commands::Eval { code } => cmd_eval(&shim, &code, cli.format)?,
    Commands::Repl => {
      cmd_repl(&shim)?;
      true
    }
  };

  if !completed {
    std::process::exit(1);
  }
  Ok(())
}
