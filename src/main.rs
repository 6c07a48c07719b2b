mod commands;
mod core;
mod pipeline;
mod release;
mod telemetry;

use clap::{Parser, Subcommand};
use core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Plugin-driven release pipeline for git repositories
#[derive(Parser)]
#[command(name = "releasekit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Increase log verbosity (-v info, -vv debug)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
  /// Run the release pipeline on the current branch
  Run {
    /// Release this branch instead of the checked-out one
    #[arg(long)]
    branch: Option<String>,
    /// Stop after generating notes; nothing is written
    #[arg(long)]
    dry_run: bool,
    /// Output the outcome in JSON format
    #[arg(long)]
    json: bool,
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// Show the next release without changing anything
  Plan {
    /// Plan for this branch instead of the checked-out one
    #[arg(long)]
    branch: Option<String>,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// Validate the configuration and show the stage table
  Check {
    /// Output results in JSON format
    #[arg(long)]
    json: bool,
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
  },

  /// Write a starter release.toml
  Init {
    /// Overwrite an existing configuration
    #[arg(long)]
    force: bool,
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

fn main() {
  let cli = Cli::parse();
  telemetry::init_tracing(cli.verbose);

  let result = match cli.command {
    Commands::Run {
      branch,
      dry_run,
      json,
      config,
    } => commands::run_release(commands::RunOptions {
      branch,
      dry_run,
      json,
      config,
    }),
    Commands::Plan { branch, json, config } => commands::run_release(commands::RunOptions {
      branch,
      dry_run: true,
      json,
      config,
    }),
    Commands::Check { json, config } => commands::run_check(config, json),
    Commands::Init { force } => commands::run_init(force),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
