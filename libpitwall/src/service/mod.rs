//! Use-case layer for Pitwall
//!
//! Thin named operations over the [`Repository`], one per screen need. They
//! hold no state of their own; screens depend on them rather than on the
//! repository directly.
//!
//! # Architecture
//!
//! `PitwallService` is the facade. It owns the repository and hands out the
//! use cases, all sharing the same fetch client:
//!
//! - `DriversUseCase`: full standings and rank filtering
//! - `UpcomingRaceUseCase`: next race and its next session
//! - `RaceDetailsUseCase`: single race lookup
//!
//! # Example
//!
//! ```no_run
//! use libpitwall::service::PitwallService;
//! use libpitwall::Config;
//!
//! # async fn example() {
//! let service = PitwallService::from_config(&Config::default_config());
//!
//! let leaders = service.drivers().by_position(1).await;
//! println!("{:?}", leaders);
//! # }
//! ```

pub mod details;
pub mod drivers;
pub mod upcoming;

use std::sync::Arc;

use self::details::RaceDetailsUseCase;
use self::drivers::DriversUseCase;
use self::upcoming::UpcomingRaceUseCase;
use crate::client::http::HttpFetchClient;
use crate::client::FetchClient;
use crate::repository::Repository;
use crate::Config;

/// Main service facade that hands out the use cases
#[derive(Clone)]
pub struct PitwallService {
    repository: Repository,
    drivers: DriversUseCase,
    upcoming: UpcomingRaceUseCase,
    details: RaceDetailsUseCase,
}

impl PitwallService {
    /// Create a service over any fetch client
    pub fn new(client: Arc<dyn FetchClient>) -> Self {
        let repository = Repository::new(client);

        Self {
            drivers: DriversUseCase::new(repository.clone()),
            upcoming: UpcomingRaceUseCase::new(repository.clone()),
            details: RaceDetailsUseCase::new(repository.clone()),
            repository,
        }
    }

    /// Create a service talking HTTP to the endpoints in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(HttpFetchClient::new(&config.api)))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn drivers(&self) -> &DriversUseCase {
        &self.drivers
    }

    pub fn upcoming(&self) -> &UpcomingRaceUseCase {
        &self.upcoming
    }

    pub fn details(&self) -> &RaceDetailsUseCase {
        &self.details
    }
}
