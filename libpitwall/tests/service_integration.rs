//! Integration tests for PitwallService
//!
//! Exercises the use-case layer as a whole over the mock client.

use libpitwall::client::mock::fixtures::{driver, race, race_with_sessions, session};
use libpitwall::client::mock::{MockFailure, MockFetchClient};
use libpitwall::error::NetworkErrorKind;
use libpitwall::{Config, NetworkError, Outcome, PitwallService};
use std::sync::Arc;

fn setup_service(mock: &MockFetchClient) -> PitwallService {
    PitwallService::new(Arc::new(mock.clone()))
}

#[test]
fn test_service_from_default_config() {
    // Building the HTTP-backed service performs no I/O
    let service = PitwallService::from_config(&Config::default_config());
    let _drivers = service.drivers();
    let _upcoming = service.upcoming();
    let _details = service.details();
}

#[tokio::test]
async fn test_upcoming_race_to_next_session_workflow() {
    let mock = MockFetchClient::new(
        vec![],
        vec![
            race("r1", "upcoming", 10_000),
            race_with_sessions(
                "r2",
                "upcoming",
                5_000,
                vec![
                    session("race", "upcoming", 5_000),
                    session("quali", "upcoming", 4_000),
                    session("fp1", "completed", 1_000),
                ],
            ),
            race("r3", "completed", 100),
        ],
    );
    let service = setup_service(&mock);

    // Step 1: upcoming race is the earliest upcoming one
    let race = service
        .upcoming()
        .upcoming()
        .await
        .fold(|race| race.expect("an upcoming race"), |e, _| panic!("unexpected {e}"));
    assert_eq!(race.race_id, "r2");

    // Step 2: its next session is the earliest upcoming session
    let next = service.upcoming().next_session(&race);
    assert_eq!(next.map(|s| s.map(|s| s.session_id)), Outcome::Success(Some("quali".to_string())));

    // Step 3: the same race resolves by id
    let details = service.details().get("r2").await;
    assert_eq!(details.map(|r| r.map(|r| r.race_id)), Outcome::Success(Some("r2".to_string())));
}

#[tokio::test]
async fn test_failure_is_classified_once_and_shared() {
    let mock = MockFetchClient::new(vec![driver("VER", 1)], vec![])
        .with_schedule_failure(MockFailure::Io {
            kind: std::io::ErrorKind::TimedOut,
            message: "read timed out".to_string(),
        });
    let service = setup_service(&mock);

    let upcoming = service.upcoming().upcoming().await;
    let details = service.details().get("r1").await;

    for outcome in [upcoming.error_message(), details.error_message()] {
        assert_eq!(outcome.as_deref(), Some("Request timeout"));
    }

    // Drivers are unaffected by the schedule failure
    assert!(service.drivers().all().await.is_success());
}

#[tokio::test]
async fn test_classified_errors_pass_through_unchanged() {
    let original = NetworkError::server_error(Some(502));
    let mock = MockFetchClient::new(vec![], vec![])
        .with_drivers_failure(MockFailure::Classified(original.clone()));
    let service = setup_service(&mock);

    match service.drivers().by_position(1).await {
        Outcome::Error { cause, message } => {
            assert_eq!(cause, original);
            assert_eq!(cause.kind(), NetworkErrorKind::ServerError);
            assert_eq!(message.as_deref(), Some("Server error"));
        }
        other => panic!("Expected error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_driver_by_position_via_repository() {
    let mock = MockFetchClient::new(vec![driver("NOR", 2), driver("PIA", 2)], vec![]);
    let service = setup_service(&mock);

    let second = service.repository().get_driver_by_position(2).await;
    assert_eq!(second.map(|d| d.map(|d| d.driver_code)), Outcome::Success(Some("NOR".to_string())));
}
