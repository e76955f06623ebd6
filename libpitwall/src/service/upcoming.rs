//! Upcoming race use case

use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::types::{Race, Session};

#[derive(Clone)]
pub struct UpcomingRaceUseCase {
    repository: Repository,
}

impl UpcomingRaceUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn upcoming(&self) -> Outcome<Option<Race>> {
        self.repository.get_upcoming_race().await
    }

    pub fn next_session(&self, race: &Race) -> Outcome<Option<Session>> {
        self.repository.get_next_upcoming_session(race)
    }
}
