//! Terminal UI for strada that tells users when the street they parked on is cleaned next.

mod app;
mod config;
mod input;
mod ui;

use std::{
    fs::OpenOptions,
    io,
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context as _, Result};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use strada_core::{ExclusionList, service::StradaService};
use strada_provider_florence as florence;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::{LoggingConfig, load_config};
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_config().context("failed to load configuration")?;
    init_logging(&settings.logging)?;

    // HTTP + service setup
    let client = Client::builder().user_agent("strada/0.1").build()?;
    let port = florence::plugin(client, settings.dataset.source()?);
    let exclusions = ExclusionList::new(settings.exclusions.clone());
    let service = Arc::new(StradaService::new(port, exclusions));
    info!(
        source = %service.source().id,
        favorites = settings.favorites.len(),
        "starting strada"
    );

    // App state
    let app = App::new(service, settings);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logging.file)
        .with_context(|| format!("failed to open log file {}", logging.file.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    refresh(terminal, &mut app).await?;

    loop {
        // Draw current UI
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Refresh => refresh(terminal, &mut app).await?,
                Action::Locate => app.locate(),
                Action::Search => app.search(),
                Action::OpenDetail => app.open_detail(),
            }
        }
    }

    Ok(())
}

/// Reloads the dataset, keeping the previous data on failure.
async fn refresh(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    app.is_loading = true;
    app.error_message = None;
    terminal.draw(|frame| ui::draw(frame, app))?;

    let res = app.service.refresh(Local::now().naive_local()).await;

    app.is_loading = false;
    match res {
        Ok(_) => app.requery(),
        Err(err) => {
            error!(error = %err, "dataset refresh failed");
            app.error_message = Some(if app.service.catalog().is_empty() {
                format!("Could not load street cleaning data: {err}")
            } else {
                format!("Reload failed, showing previous data: {err}")
            });
        }
    }

    Ok(())
}
