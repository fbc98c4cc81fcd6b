//! Archflash - architecture flashcards in the terminal
//!
//! This crate provides the core of the Archflash application: the image
//! dataset, shuffled study sessions, persisted favorites and the swipe
//! gesture model, plus the TUI built on top of them.

pub mod app;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod error;
pub mod file_opener;
pub mod gesture;
pub mod image_loader;
pub mod logging;
pub mod preview;
pub mod tui;

// Re-export primary types for convenience
pub use config::UserConfig;
pub use dataset::{fetch_dataset, CacheBuster, DatasetSource, ImageLocation, ImageResolver};
pub use domain::{
    build_session, CardRecord, CardView, Dataset, Favorites, ImageRef, Mode, Navigator, Step,
};
pub use error::{ArchflashError, Result};
pub use file_opener::open_image;
pub use gesture::{GestureInterpreter, Intent};
