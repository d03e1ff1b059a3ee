// src/models/mod.rs

//! Domain models for the harvester application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod photo;
mod terms;
mod window;

// Re-export all public types
pub use config::{Config, FlickrConfig, HarvestConfig, LoggingConfig, OutputConfig};
pub use photo::{PhotoRecord, SearchHit, SearchPage};
pub use terms::{Term, term_for_tag};
pub use window::{HarvestStats, SearchWindow, SessionStats};
