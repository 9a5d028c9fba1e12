//! UI rendering module for Daily Poetry CLI
//!
//! This module contains the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod poem_view;

pub use help_overlay::render as render_help_overlay;
pub use poem_view::render as render_poem_view;
