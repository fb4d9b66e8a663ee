//! `rsvp`: guest submission and the admin terminal UI.
//!
//! # Usage
//!
//! ```text
//! rsvp --url http://localhost:3000 submit --name "Alex Kim" --response yes --guests 2
//! rsvp --config ~/.config/rsvp/config.toml admin
//! ```

mod admin;
mod app;
mod client;
mod form;
mod guard;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use crossterm::{
  event::{self, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use form::{FormStatus, RsvpForm};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "rsvp", about = "Wedding RSVP client")]
struct Args {
  /// Path to a TOML config file (url, email).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the RSVP server (default: http://localhost:3000).
  #[arg(long, env = "RSVP_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Send a guest RSVP.
  Submit {
    #[arg(long)]
    name:     String,
    /// yes, no, or maybe.
    #[arg(long)]
    response: String,
    #[arg(long, allow_negative_numbers = true)]
    guests:   Option<i64>,
    #[arg(long)]
    message:  Option<String>,
  },
  /// Open the admin dashboard (default).
  Admin,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:   String,
  /// Pre-filled on the login screen.
  #[serde(default)]
  email: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:3000".to_string()),
  };
  let client = ApiClient::new(api_config)?;

  match args.command.unwrap_or(Command::Admin) {
    Command::Submit { name, response, guests, message } => {
      init_logging();
      let mut form = RsvpForm::new(name, response);
      form.guests = guests;
      form.message = message.unwrap_or_default();
      submit(&mut form, &client).await
    }
    Command::Admin => run_tui(App::new(client, file_cfg.email)).await,
  }
}

/// Logs go to stderr, filtered by `RSVP_LOG`. Not used under the TUI, where
/// stderr output would corrupt the screen.
fn init_logging() {
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .with_env_var("RSVP_LOG")
        .from_env_lossy(),
    )
    .init();
}

async fn submit(form: &mut RsvpForm, client: &ApiClient) -> Result<()> {
  match form.submit(client).await {
    FormStatus::Submitted(rsvp) => {
      println!("Thanks, {}! Your RSVP ({}) has been recorded.", rsvp.name, rsvp.response);
      Ok(())
    }
    FormStatus::Failed(message) => bail!("{message}"),
    FormStatus::Editing => bail!("RSVP was not sent"),
  }
}

// ─── TUI ──────────────────────────────────────────────────────────────────────

async fn run_tui(mut app: App) -> Result<()> {
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.drain_routes();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Network work runs after the frame that shows its loading state.
    if app.pending.is_some() {
      app.run_pending().await;
      continue;
    }

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && !app.handle_key(key)
    {
      break;
    }
  }

  Ok(())
}
