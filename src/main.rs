mod commands;
mod config;
mod error;
mod files;
mod render;
mod shell;
#[cfg(test)]
mod test_support;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::net::api::{Backend, HttpBackend};
use client::state::session::Session;
use client::util::preferences::FilePreferences;
use client::util::theme::{ThemeStore, system_prefers_dark};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::CliError;
use crate::render::Palette;
use crate::shell::{Shell, ThemeAction};

#[derive(Parser, Debug)]
#[command(name = "docassist", about = "Summarize, question, and quiz yourself on a document")]
struct Cli {
    /// Overrides `DOCASSIST_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides `DOCASSIST_PREFS_PATH`.
    #[arg(long)]
    prefs_path: Option<PathBuf>,

    /// Disable ANSI colours.
    #[arg(long, env = "NO_COLOR", value_parser = clap::builder::FalseyValueParser::new())]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the backend is reachable.
    Ping,
    /// Upload a document and print its summary.
    Summarize { file: PathBuf },
    /// Upload a document and ask one or more questions in order.
    Ask {
        file: PathBuf,
        #[arg(required = true)]
        questions: Vec<String>,
    },
    /// Upload a document and answer generated questions from stdin.
    Challenge { file: PathBuf },
    /// Show or change the colour theme.
    Theme {
        #[arg(value_enum, default_value = "show")]
        action: ThemeAction,
    },
    /// Interactive shell (default).
    Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_theme(config: &AppConfig) -> ThemeStore {
    let prefs = FilePreferences::open(&config.prefs_path).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "ignoring unreadable preferences");
        FilePreferences::empty(&config.prefs_path)
    });
    let colorfgbg = std::env::var("COLORFGBG").ok();
    ThemeStore::load(Box::new(prefs), system_prefers_dark(colorfgbg.as_deref()))
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_owned();
    }
    if let Some(prefs_path) = cli.prefs_path {
        config.prefs_path = prefs_path;
    }

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config.backend_config())?);
    tracing::debug!(base_url = %config.base_url, "backend configured");
    let mut session = Session::new(backend);
    let mut theme = load_theme(&config);
    let colored = !cli.no_color && std::io::stdout().is_terminal();
    let palette = if colored { Palette::for_theme(theme.current()) } else { Palette::PLAIN };
    let mut stdout = tokio::io::stdout();

    match cli.command.unwrap_or(Command::Shell) {
        Command::Ping => commands::ping(&session, &mut stdout).await,
        Command::Summarize { file } => commands::summarize(&mut session, &file, &palette, &mut stdout).await,
        Command::Ask { file, questions } => {
            commands::ask(&mut session, &file, &questions, &palette, &mut stdout).await
        }
        Command::Challenge { file } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            commands::challenge(&mut session, &file, &palette, stdin, &mut stdout).await
        }
        Command::Theme { action } => commands::theme(&mut theme, action, &mut stdout).await,
        Command::Shell => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            Shell::new(session, theme, colored).run(stdin, stdout).await
        }
    }
}
