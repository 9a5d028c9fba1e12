//! Application state for the Daily Poetry terminal UI
//!
//! Holds the shared poem service, handles keyboard input and starts load and
//! refresh operations in the background so the UI keeps rendering.

use crossterm::event::{KeyCode, KeyEvent};
use std::sync::Arc;
use tokio::task::JoinHandle;

use dailypoetry::PoetryService;

/// Main application struct managing view state
pub struct App {
    /// Shared poem service
    pub service: Arc<PoetryService>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag indicating a refresh has been requested
    pub refresh_requested: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Scroll offset for the poem view
    pub scroll_offset: u16,
}

impl App {
    pub fn new(service: Arc<PoetryService>) -> Self {
        Self {
            service,
            should_quit: false,
            refresh_requested: false,
            show_help: false,
            scroll_offset: 0,
        }
    }

    /// Starts a load in the background
    pub fn spawn_load(&self) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move { service.load().await })
    }

    /// Starts a refresh in the background
    pub fn spawn_refresh(&mut self) -> JoinHandle<()> {
        self.refresh_requested = false;
        self.scroll_offset = 0;
        let service = Arc::clone(&self.service);
        tokio::spawn(async move { service.refresh().await })
    }

    /// Handles a keyboard event
    ///
    /// - `q` or `Esc`: Quit the application
    /// - `r`: Fetch a new poem
    /// - `Up`/`k`, `Down`/`j`: Scroll the poem
    /// - `?`: Toggle the help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('r') => {
                // Ignored while an operation is in flight
                if !self.service.is_loading() {
                    self.refresh_requested = true;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }
}
