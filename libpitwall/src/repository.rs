//! Repository over the fetch client
//!
//! Every operation answers with an [`Outcome`]; raw fetch failures are
//! classified here and never escape. Derived queries run on top of a
//! successful fetch and short-circuit on a failed one.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::client::FetchClient;
use crate::error::{classify, FetchError};
use crate::outcome::Outcome;
use crate::types::{Driver, Race, Session};

#[derive(Clone)]
pub struct Repository {
    client: Arc<dyn FetchClient>,
}

impl Repository {
    pub fn new(client: Arc<dyn FetchClient>) -> Self {
        Self { client }
    }

    pub async fn get_drivers(&self) -> Outcome<Vec<Driver>> {
        match self.client.fetch_drivers().await {
            Ok(payload) => {
                debug!(count = payload.drivers.len(), "Fetched drivers");
                Outcome::success(payload.drivers)
            }
            Err(e) => failed("drivers", e),
        }
    }

    pub async fn get_schedule(&self) -> Outcome<Vec<Race>> {
        match self.client.fetch_schedule().await {
            Ok(payload) => {
                debug!(count = payload.schedule.len(), "Fetched schedule");
                Outcome::success(payload.schedule)
            }
            Err(e) => failed("schedule", e),
        }
    }

    /// Upcoming race with the earliest start time; `None` when nothing is
    /// upcoming
    pub async fn get_upcoming_race(&self) -> Outcome<Option<Race>> {
        self.get_schedule()
            .await
            .map(|schedule| earliest_upcoming_race(&schedule).cloned())
    }

    /// Upcoming session of `race` with the earliest start time
    pub fn get_next_upcoming_session(&self, race: &Race) -> Outcome<Option<Session>> {
        Outcome::success(earliest_upcoming_session(&race.sessions).cloned())
    }

    pub async fn get_race_by_id(&self, race_id: &str) -> Outcome<Option<Race>> {
        self.get_schedule()
            .await
            .map(|schedule| schedule.into_iter().find(|race| race.race_id == race_id))
    }

    /// First driver holding championship position `rank`
    pub async fn get_driver_by_position(&self, rank: i32) -> Outcome<Option<Driver>> {
        self.get_drivers()
            .await
            .map(|drivers| drivers.into_iter().find(|driver| driver.position == rank))
    }
}

fn failed<T>(collection: &str, error: FetchError) -> Outcome<T> {
    let classified = classify(error);
    warn!(
        collection,
        kind = %classified.kind(),
        cause = classified.cause().unwrap_or(""),
        "Fetch failed"
    );
    Outcome::from_network_error(classified)
}

/// Earliest-starting upcoming race. Ties keep the first in input order.
pub fn earliest_upcoming_race(races: &[Race]) -> Option<&Race> {
    races
        .iter()
        .filter(|race| race.is_upcoming())
        .min_by_key(|race| race.race_start_time)
}

/// Earliest-starting upcoming session. Ties keep the first in input order.
pub fn earliest_upcoming_session(sessions: &[Session]) -> Option<&Session> {
    sessions
        .iter()
        .filter(|session| session.is_upcoming())
        .min_by_key(|session| session.start_time)
}
