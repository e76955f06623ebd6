//! Pitwall - race weekend data for Formula 1 fans
//!
//! This library fetches driver standings and the race calendar, reduces
//! every fetch to an [`Outcome`], and drives the Home and Race Detail screen
//! state machines that a display layer renders.

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod outcome;
pub mod repository;
pub mod screens;
pub mod service;
pub mod timers;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{classify, FetchError, NetworkError, PitwallError, Result};
pub use outcome::Outcome;
pub use screens::{DetailScreen, DetailUiState, HomeContent, HomeScreen, HomeUiState};
pub use service::PitwallService;
pub use types::{Driver, Race, Session};
