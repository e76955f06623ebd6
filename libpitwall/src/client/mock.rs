//! Mock fetch client for testing
//!
//! Serves canned payloads or canned failures, optionally after a delay, and
//! counts calls. Responses can be swapped while a test runs, which is how
//! retry paths are exercised.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::client::FetchClient;
use crate::error::{FetchError, NetworkError};
use crate::types::{Driver, DriversPayload, Race, SchedulePayload};

/// Recipe for a raw failure; rebuilt on every call because [`FetchError`]
/// is not `Clone`
#[derive(Debug, Clone)]
pub enum MockFailure {
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
    Timeout(String),
    Classified(NetworkError),
    /// Payload that fails to decode
    Decode,
    Other(String),
}

impl MockFailure {
    /// I/O failure that classifies as `NoConnection`
    pub fn unreachable() -> Self {
        MockFailure::Io {
            kind: std::io::ErrorKind::Other,
            message: "Unable to resolve host \"mock.invalid\"".to_string(),
        }
    }

    fn to_fetch_error(&self) -> FetchError {
        match self {
            MockFailure::Io { kind, message } => {
                std::io::Error::new(*kind, message.clone()).into()
            }
            MockFailure::Timeout(message) => FetchError::Timeout(message.clone()),
            MockFailure::Classified(network) => FetchError::Classified(network.clone()),
            MockFailure::Decode => match serde_json::from_str::<DriversPayload>("{\"drivers\":") {
                Err(e) => FetchError::Decode(e),
                Ok(_) => FetchError::Other("mock decode failure".to_string()),
            },
            MockFailure::Other(message) => FetchError::Other(message.clone()),
        }
    }
}

type Canned<T> = std::result::Result<Vec<T>, MockFailure>;

/// Mock client; clones share responses and counters
#[derive(Clone)]
pub struct MockFetchClient {
    drivers: Arc<Mutex<Canned<Driver>>>,
    queued_drivers: Arc<Mutex<VecDeque<Canned<Driver>>>>,
    schedule: Arc<Mutex<Canned<Race>>>,
    drivers_delay: Duration,
    schedule_delay: Duration,
    drivers_calls: Arc<AtomicUsize>,
    schedule_calls: Arc<AtomicUsize>,
}

impl MockFetchClient {
    /// Create a mock that serves the given collections
    pub fn new(drivers: Vec<Driver>, schedule: Vec<Race>) -> Self {
        Self {
            drivers: Arc::new(Mutex::new(Ok(drivers))),
            queued_drivers: Arc::new(Mutex::new(VecDeque::new())),
            schedule: Arc::new(Mutex::new(Ok(schedule))),
            drivers_delay: Duration::ZERO,
            schedule_delay: Duration::ZERO,
            drivers_calls: Arc::new(AtomicUsize::new(0)),
            schedule_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_drivers_failure(self, failure: MockFailure) -> Self {
        self.set_drivers(Err(failure));
        self
    }

    pub fn with_schedule_failure(self, failure: MockFailure) -> Self {
        self.set_schedule(Err(failure));
        self
    }

    /// Delay before answering `fetch_drivers` (simulates latency)
    pub fn with_drivers_delay(mut self, delay: Duration) -> Self {
        self.drivers_delay = delay;
        self
    }

    /// Delay before answering `fetch_schedule` (simulates latency)
    pub fn with_schedule_delay(mut self, delay: Duration) -> Self {
        self.schedule_delay = delay;
        self
    }

    pub fn set_drivers(&self, response: Canned<Driver>) {
        *self.drivers.lock().unwrap() = response;
    }

    /// Serve `response` once, ahead of the standing drivers response.
    /// Queued responses are consumed in order.
    pub fn queue_drivers(&self, response: Canned<Driver>) {
        self.queued_drivers.lock().unwrap().push_back(response);
    }

    pub fn set_schedule(&self, response: Canned<Race>) {
        *self.schedule.lock().unwrap() = response;
    }

    pub fn drivers_call_count(&self) -> usize {
        self.drivers_calls.load(Ordering::SeqCst)
    }

    pub fn schedule_call_count(&self) -> usize {
        self.schedule_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FetchClient for MockFetchClient {
    async fn fetch_drivers(&self) -> Result<DriversPayload, FetchError> {
        self.drivers_calls.fetch_add(1, Ordering::SeqCst);

        if !self.drivers_delay.is_zero() {
            sleep(self.drivers_delay).await;
        }

        let queued = self.queued_drivers.lock().unwrap().pop_front();
        let response = queued.unwrap_or_else(|| self.drivers.lock().unwrap().clone());
        match response {
            Ok(drivers) => Ok(DriversPayload { drivers }),
            Err(failure) => Err(failure.to_fetch_error()),
        }
    }

    async fn fetch_schedule(&self) -> Result<SchedulePayload, FetchError> {
        self.schedule_calls.fetch_add(1, Ordering::SeqCst);

        if !self.schedule_delay.is_zero() {
            sleep(self.schedule_delay).await;
        }

        let response = self.schedule.lock().unwrap().clone();
        match response {
            Ok(schedule) => Ok(SchedulePayload { schedule }),
            Err(failure) => Err(failure.to_fetch_error()),
        }
    }
}

/// Builders for test data
pub mod fixtures {
    use crate::types::{Driver, Race, Session};

    pub fn driver(code: &str, position: i32) -> Driver {
        Driver {
            driver_id: code.to_lowercase(),
            driver_code: code.to_string(),
            team_id: "team".to_string(),
            team_name: "Team".to_string(),
            points: 100 - position,
            podiums: 0,
            poles: 0,
            wins: 0,
            position,
            first_name: code.to_string(),
            last_name: "Driver".to_string(),
            racing_number: position,
        }
    }

    pub fn session(id: &str, state: &str, start_time: i64) -> Session {
        Session {
            session_id: id.to_string(),
            session_type: "practice".to_string(),
            session_name: format!("Session {id}"),
            start_time,
            end_time: start_time + 3_600,
            session_state: state.to_string(),
            backend_id: None,
        }
    }

    pub fn race(id: &str, state: &str, start_time: i64) -> Race {
        Race {
            race_id: id.to_string(),
            circuit_id: "sakhir".to_string(),
            race_name: format!("Race {id}"),
            round: 1,
            is_sprint: false,
            race_start_time: start_time,
            race_end_time: start_time + 7_200,
            race_state: state.to_string(),
            sessions: Vec::new(),
            podium: None,
        }
    }

    pub fn race_with_sessions(id: &str, state: &str, start_time: i64, sessions: Vec<Session>) -> Race {
        Race {
            sessions,
            ..race(id, state, start_time)
        }
    }
}
