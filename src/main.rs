//! Daily Poetry CLI - One classical Chinese poem a day
//!
//! Fetches a poem at most once per calendar day, caches it on disk and shows
//! it in a terminal UI, or prints it with `--print`.

mod app;
mod ui;

use std::io;
use std::panic;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use app::App;
use dailypoetry::cli::{Cli, OutputMode, StartupConfig};
use dailypoetry::logging::{init_logging_or_disable, LogSink};
use dailypoetry::{
    DailyCache, FileStore, JinrishiciClient, MemoryStore, PoetryService, PoetryState,
};

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

/// Renders the UI based on the current application state
fn render_ui(frame: &mut ratatui::Frame, app: &App, state: &PoetryState) {
    ui::render_poem_view(frame, state, app.scroll_offset);
    if app.show_help {
        ui::render_help_overlay(frame);
    }
}

/// Resolves the directory holding the cached poem
fn cache_dir(config: &StartupConfig) -> Option<PathBuf> {
    config
        .cache_dir
        .clone()
        .or_else(|| FileStore::new().map(|store| store.dir().to_path_buf()))
}

/// Builds the service for the given configuration
fn build_service(config: &StartupConfig, dir: Option<PathBuf>) -> PoetryService {
    let cache = match dir {
        Some(dir) => DailyCache::new(FileStore::with_dir(dir)),
        None => {
            warn!("no cache directory available, poem will not be kept between runs");
            DailyCache::new(MemoryStore::new())
        }
    };
    PoetryService::new(cache, JinrishiciClient::with_endpoint(&config.endpoint))
}

/// Runs one operation and prints the result
async fn run_print(service: &PoetryService, force_refresh: bool) -> Result<(), String> {
    if force_refresh {
        service.refresh().await;
    } else {
        service.load().await;
    }

    let state = service.state();
    match state.content {
        Some(poem) => {
            println!("{}", poem.to_plain_text());
            if let Some(message) = state.error_message {
                eprintln!("Warning: {}", message);
            }
            Ok(())
        }
        None => Err(state
            .error_message
            .unwrap_or_else(|| dailypoetry::service::FALLBACK_ERROR_MESSAGE.to_string())),
    }
}

/// Runs the interactive terminal UI
async fn run_tui(
    service: Arc<PoetryService>,
    force_refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(service);

    // Initial operation runs in the background while frames keep rendering
    let _ = if force_refresh {
        app.spawn_refresh()
    } else {
        app.spawn_load()
    };

    loop {
        let state = app.service.state();
        terminal.draw(|f| render_ui(f, &app, &state))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.refresh_requested {
            let _ = app.spawn_refresh();
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let dir = cache_dir(&config);
    let sink = match (config.mode, dir.as_deref()) {
        (OutputMode::Print, _) => LogSink::Stderr,
        (OutputMode::Tui, Some(dir)) => LogSink::File(dir),
        (OutputMode::Tui, None) => LogSink::Disabled,
    };
    init_logging_or_disable(config.verbosity, sink)?;
    info!(endpoint = %config.endpoint, "starting dailypoetry");

    let service = build_service(&config, dir);

    match config.mode {
        OutputMode::Print => {
            if let Err(message) = run_print(&service, config.force_refresh).await {
                eprintln!("Error: {}", message);
                process::exit(1);
            }
            Ok(())
        }
        OutputMode::Tui => run_tui(Arc::new(service), config.force_refresh).await,
    }
}
