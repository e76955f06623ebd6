//! Race details use case

use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::types::Race;

#[derive(Clone)]
pub struct RaceDetailsUseCase {
    repository: Repository,
}

impl RaceDetailsUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get(&self, race_id: &str) -> Outcome<Option<Race>> {
        self.repository.get_race_by_id(race_id).await
    }
}
