//! Fetch client abstraction and implementations
//!
//! The repository talks to the remote service only through [`FetchClient`].
//! Implementations return raw [`FetchError`]s; classification happens one
//! layer up, in the repository.
//!
//! # Examples
//!
//! ```no_run
//! use libpitwall::client::{FetchClient, http::HttpFetchClient};
//! use libpitwall::Config;
//!
//! # async fn example() -> Result<(), libpitwall::error::FetchError> {
//! let config = Config::default_config();
//! let client = HttpFetchClient::new(&config.api);
//!
//! let payload = client.fetch_drivers().await?;
//! println!("{} drivers", payload.drivers.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{DriversPayload, SchedulePayload};

pub mod http;

// Mock client is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Read-only access to the two remote collections
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Fetch the full driver standings
    ///
    /// # Errors
    ///
    /// Returns the raw transport or decoding failure, unclassified.
    async fn fetch_drivers(&self) -> Result<DriversPayload, FetchError>;

    /// Fetch the season schedule
    ///
    /// # Errors
    ///
    /// Returns the raw transport or decoding failure, unclassified.
    async fn fetch_schedule(&self) -> Result<SchedulePayload, FetchError>;
}
