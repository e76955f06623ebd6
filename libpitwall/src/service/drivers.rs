//! Driver standings use case

use crate::outcome::Outcome;
use crate::repository::Repository;
use crate::types::Driver;

#[derive(Clone)]
pub struct DriversUseCase {
    repository: Repository,
}

impl DriversUseCase {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Full driver list as served
    pub async fn all(&self) -> Outcome<Vec<Driver>> {
        self.repository.get_drivers().await
    }

    /// Drivers whose position equals `rank` exactly. An empty match is a
    /// success.
    pub async fn by_position(&self, rank: i32) -> Outcome<Vec<Driver>> {
        self.repository.get_drivers().await.map(|drivers| {
            drivers
                .into_iter()
                .filter(|driver| driver.position == rank)
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::fixtures::driver;
    use crate::client::mock::{MockFailure, MockFetchClient};
    use std::sync::Arc;

    fn use_case(mock: MockFetchClient) -> DriversUseCase {
        DriversUseCase::new(Repository::new(Arc::new(mock)))
    }

    #[tokio::test]
    async fn test_by_position_filters_exact_rank() {
        let drivers = use_case(MockFetchClient::new(
            vec![driver("VER", 1), driver("NOR", 2), driver("LEC", 3)],
            vec![],
        ));

        let leaders = drivers.by_position(2).await.map(|ds| {
            ds.into_iter().map(|d| d.driver_code).collect::<Vec<_>>()
        });
        assert_eq!(leaders, Outcome::Success(vec!["NOR".to_string()]));
    }

    #[tokio::test]
    async fn test_by_position_empty_match_is_success() {
        let drivers = use_case(MockFetchClient::new(vec![driver("VER", 3)], vec![]));
        assert_eq!(drivers.by_position(1).await, Outcome::Success(vec![]));
    }

    #[tokio::test]
    async fn test_by_position_propagates_error() {
        let drivers = use_case(
            MockFetchClient::new(vec![], vec![]).with_drivers_failure(MockFailure::unreachable()),
        );
        let outcome = drivers.by_position(1).await;
        assert_eq!(outcome.error_message().as_deref(), Some("No internet connection"));
    }
}
