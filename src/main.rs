mod changelog;
mod commands;
mod core;
mod logger;
mod release;
mod watcher;

use crate::commands::Trigger;
use crate::core::config::Config;
use crate::core::error::BackstopError;
use clap::{Parser, Subcommand};

/// Automatic working-tree backups: watch, commit, push, tag, release
#[derive(Parser)]
#[command(name = "backstop")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct BackstopCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run one backup: stage, commit and push pending changes
  Backup {
    /// Trigger provenance recorded in the log (set by the hook and watcher)
    #[arg(long, hide = true, value_enum, default_value_t = Trigger::Manual)]
    trigger: Trigger,
  },

  /// Create a release: bump the manifest version, tag and publish
  Release {
    /// Exact version to release instead of the next computed one
    #[arg(long)]
    version: Option<String>,
    /// Skip the branch and clean-tree confirmation checks
    #[arg(long)]
    auto: bool,
  },

  /// Show the backup log
  Logs {
    /// Show only the most recent entries
    #[arg(long)]
    tail: bool,
    /// Number of entries shown in tail mode
    #[arg(long, default_value_t = 50)]
    lines: usize,
  },

  /// Watch the working tree and back up after a quiet period
  Watch,

  /// Check the environment and install the post-commit hook
  Setup,
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
  let cli = BackstopCli::parse();

  let project_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let config = Config::from_env(&project_root);

  let (label, result) = match cli.command {
    Commands::Backup { trigger } => ("Backup", commands::run_backup(&config, trigger)),
    Commands::Release { version, auto } => ("Release creation", commands::run_release(&config, version, auto)),
    Commands::Logs { tail, lines } => ("Log viewing", commands::run_logs(&config, tail, lines)),
    Commands::Watch => ("Watch mode", commands::run_watch(&config)),
    Commands::Setup => ("Setup", commands::run_setup(&config)),
  };

  if let Err(err) = result {
    handle_error(&config, label, err);
  }
}

/// Record the fatal error in the backup log, show help, exit non-zero
fn handle_error(config: &Config, label: &str, err: BackstopError) -> ! {
  let logger = logger::Logger::new(config);
  logger.error(&format!("{} failed", label), Some(&err.to_string()));

  if let Some(help) = err.help_message() {
    eprintln!("\n💡 Help: {}\n", help);
  }
  std::process::exit(err.exit_code().as_i32());
}
