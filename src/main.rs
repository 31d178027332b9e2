mod commands;
mod core;
mod release;

use clap::{ArgAction, Parser, Subcommand};
use core::error::{FezaError, print_error};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Plan, package, publish, and tap binary releases
#[derive(Parser)]
#[command(name = "feza")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// More log output (-v debug, -vv trace); FEZA_LOG overrides
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Release pipeline
  // ============================================================================
  /// Create the manifest from a tag and targets
  Plan {
    /// Release tag (e.g. v1.2.3)
    tag: String,
    /// Tool name
    #[arg(long)]
    name: Option<String>,
    /// Comma-separated targets [default: macos-arm64,macos-amd64,linux-amd64]
    #[arg(long)]
    targets: Option<String>,
  },

  /// Package binaries and compute checksums
  Build(commands::BuildArgs),

  /// Create or update the GitHub release and upload archives
  Github(commands::GithubArgs),

  /// Render the Homebrew formula and push it to a tap
  Tap(commands::TapArgs),

  // ============================================================================
  // Standalone
  // ============================================================================
  /// Rewrite the project version (Cargo.toml or pyproject.toml)
  #[command(disable_version_flag = true)]
  Bump {
    /// New version X.Y.Z (prompted for when omitted)
    #[arg(long)]
    version: Option<String>,
    /// Commit the change
    #[arg(long)]
    commit: bool,
    /// Push the commit to origin (requires --commit)
    #[arg(long)]
    push: bool,
    /// Project file [default: ./Cargo.toml, then ./pyproject.toml]
    #[arg(long)]
    file: Option<PathBuf>,
  },

  /// Show the manifest and packaging progress
  Status {
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr; stdout is reserved for command output
fn init_tracing(verbose: u8) {
  let default_level = match verbose {
    0 => "warn",
    1 => "debug",
    _ => "trace",
  };
  let filter = EnvFilter::try_from_env("FEZA_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .without_time()
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Plan { tag, name, targets } => commands::run_plan(tag, name, targets),
    Commands::Build(args) => commands::run_build(args),
    Commands::Github(args) => commands::run_github(args),
    Commands::Tap(args) => commands::run_tap(args),
    Commands::Bump {
      version,
      commit,
      push,
      file,
    } => commands::run_bump(version, commit, push, file),
    Commands::Status { json } => commands::run_status(json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: FezaError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
