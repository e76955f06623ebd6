//! Home screen state machine
//!
//! Shows the championship leader (or the top three as a fallback), the next
//! race and that race's next session.
//!
//! A load runs two sub-loads concurrently:
//!
//! - drivers: mandatory; any failure turns the screen into `Error`
//! - upcoming race, then its next session: optional; a failure only
//!   surfaces if both sub-loads have finished and nothing succeeded
//!
//! Each sub-load merges only the fields it owns into the current state.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{failure_message, LoadGeneration};
use crate::config::DisplayConfig;
use crate::outcome::Outcome;
use crate::service::drivers::DriversUseCase;
use crate::service::upcoming::UpcomingRaceUseCase;
use crate::service::PitwallService;
use crate::timers::{next_index, supervise, Clock, ScopedTask, SystemClock, TimeRemaining, TimerPlan};
use crate::types::{Driver, Race, Session};

const LEADER_POSITION: i32 = 1;
const FALLBACK_DRIVER_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeUiState {
    Loading,
    Success(HomeContent),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HomeContent {
    pub drivers: Vec<Driver>,
    /// Carousel cursor into `drivers`; always in range, 0 when empty
    pub current_driver_index: usize,
    pub upcoming_race: Option<Race>,
    pub next_session: Option<Session>,
}

impl HomeContent {
    fn with_drivers(drivers: Vec<Driver>) -> Self {
        Self {
            drivers,
            ..Default::default()
        }
    }

    fn replace_drivers(&mut self, drivers: Vec<Driver>) {
        self.drivers = drivers;
        if self.current_driver_index >= self.drivers.len() {
            self.current_driver_index = 0;
        }
    }

    pub fn current_driver(&self) -> Option<&Driver> {
        self.drivers.get(self.current_driver_index)
    }

    /// Next session start if known, else the upcoming race start
    pub fn countdown_target(&self) -> Option<i64> {
        self.next_session
            .as_ref()
            .map(|session| session.start_time)
            .or_else(|| self.upcoming_race.as_ref().map(|race| race.race_start_time))
    }
}

impl HomeUiState {
    pub fn content(&self) -> Option<&HomeContent> {
        match self {
            HomeUiState::Success(content) => Some(content),
            _ => None,
        }
    }

    fn timer_plan(&self) -> TimerPlan {
        match self {
            HomeUiState::Success(content) => TimerPlan {
                carousel: content.drivers.len() > 1,
                countdown_target: content.countdown_target(),
            },
            _ => TimerPlan::default(),
        }
    }
}

/// Sort by championship position and keep the first three
fn top_drivers(mut drivers: Vec<Driver>) -> Vec<Driver> {
    drivers.sort_by_key(|driver| driver.position);
    drivers.truncate(FALLBACK_DRIVER_COUNT);
    drivers
}

/// Move the cursor to `index` if the state is `Success` and `index` is in
/// range
fn set_driver_index(state: &watch::Sender<HomeUiState>, index: usize) -> bool {
    state.send_if_modified(|state| match state {
        HomeUiState::Success(content) if index < content.drivers.len() => {
            let changed = content.current_driver_index != index;
            content.current_driver_index = index;
            changed
        }
        _ => false,
    })
}

fn advance_carousel(state: &watch::Sender<HomeUiState>) {
    let next = match state.borrow().content() {
        Some(content) if content.drivers.len() > 1 => {
            next_index(content.current_driver_index, content.drivers.len())
        }
        _ => return,
    };
    set_driver_index(state, next);
}

/// Everything a load task needs; cheap to clone into the task
#[derive(Clone)]
struct HomeLoader {
    drivers: DriversUseCase,
    upcoming: UpcomingRaceUseCase,
    state: Arc<watch::Sender<HomeUiState>>,
    generation: Arc<LoadGeneration>,
}

impl HomeLoader {
    async fn run(self, generation: u64) {
        debug!(generation, "Home load started");
        let ((), race_failure) =
            tokio::join!(self.load_drivers(generation), self.load_race(generation));

        // A race failure only becomes the screen error if the driver load
        // left nothing to show
        if let Some(message) = race_failure {
            let surfaced = self.merge(generation, |state| match state {
                HomeUiState::Loading => {
                    *state = HomeUiState::Error(message.clone());
                    true
                }
                HomeUiState::Success(_) | HomeUiState::Error(_) => false,
            });
            if !surfaced {
                warn!(error = %message, "Race load failed, continuing without race info");
            }
        }

        self.generation.finish(generation);
        debug!(generation, "Home load finished");
    }

    /// Apply `update` unless this load has been superseded
    fn merge(&self, generation: u64, update: impl FnOnce(&mut HomeUiState) -> bool) -> bool {
        self.state
            .send_if_modified(|state| self.generation.is_current(generation) && update(state))
    }

    async fn load_drivers(&self, generation: u64) {
        let outcome = match self.drivers.by_position(LEADER_POSITION).await {
            Outcome::Success(leaders) if leaders.is_empty() => {
                debug!("No championship leader, falling back to top drivers");
                self.drivers.all().await.map(top_drivers)
            }
            other => other,
        };

        outcome.fold_all(
            |drivers| {
                debug!(count = drivers.len(), "Drivers loaded");
                self.merge(generation, |state| {
                    match state {
                        HomeUiState::Success(content) => content.replace_drivers(drivers),
                        _ => *state = HomeUiState::Success(HomeContent::with_drivers(drivers)),
                    }
                    true
                });
            },
            |cause, message| {
                let message = failure_message(&cause, message, "Failed to load drivers");
                warn!(error = %message, "Driver load failed");
                self.merge(generation, |state| {
                    *state = HomeUiState::Error(message);
                    true
                });
            },
            || {},
        );
    }

    /// Load the upcoming race and its next session. A failure is handed
    /// back to `run` instead of being published.
    async fn load_race(&self, generation: u64) -> Option<String> {
        let race = match self.upcoming.upcoming().await {
            Outcome::Success(race) => race,
            Outcome::Error { cause, message } => {
                return Some(failure_message(&cause, message, "Failed to load race schedule"));
            }
            Outcome::Loading => return None,
        };

        let merged = self.merge(generation, |state| match state {
            HomeUiState::Success(content) => {
                content.upcoming_race = race.clone();
                true
            }
            HomeUiState::Loading => {
                *state = HomeUiState::Success(HomeContent {
                    upcoming_race: race.clone(),
                    ..Default::default()
                });
                true
            }
            HomeUiState::Error(_) => false,
        });

        if let (true, Some(race)) = (merged, race) {
            self.load_session(generation, &race);
        }
        None
    }

    fn load_session(&self, generation: u64, race: &Race) {
        match self.upcoming.next_session(race) {
            Outcome::Success(session) => {
                self.merge(generation, |state| match state {
                    HomeUiState::Success(content) => {
                        content.next_session = session;
                        true
                    }
                    _ => false,
                });
            }
            Outcome::Error { cause, .. } => {
                debug!(kind = %cause.kind(), "Next session unavailable");
            }
            Outcome::Loading => {}
        }
    }
}

/// Home screen; dropping it cancels its load and timers
pub struct HomeScreen {
    loader: HomeLoader,
    countdown: Arc<watch::Sender<Option<TimeRemaining>>>,
    load_task: Option<ScopedTask>,
    _timers: ScopedTask,
}

impl HomeScreen {
    /// Create the screen and start loading. Must be called inside a tokio
    /// runtime.
    pub fn new(service: &PitwallService, display: DisplayConfig) -> Self {
        Self::with_clock(service, display, Arc::new(SystemClock))
    }

    pub fn with_clock(service: &PitwallService, display: DisplayConfig, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(HomeUiState::Loading);
        let state = Arc::new(state);
        let (countdown, _) = watch::channel(None);
        let countdown = Arc::new(countdown);

        let carousel_state = Arc::clone(&state);
        let timers = ScopedTask::spawn(supervise(
            state.subscribe(),
            HomeUiState::timer_plan,
            move || advance_carousel(&carousel_state),
            display,
            clock,
            Arc::clone(&countdown),
        ));

        let mut screen = Self {
            loader: HomeLoader {
                drivers: service.drivers().clone(),
                upcoming: service.upcoming().clone(),
                state,
                generation: Arc::new(LoadGeneration::new()),
            },
            countdown,
            load_task: None,
            _timers: timers,
        };
        screen.start_load();
        screen
    }

    fn start_load(&mut self) {
        // Abort the previous load before anything else can observe Loading
        self.load_task = None;
        let generation = self.loader.generation.begin();
        self.loader.state.send_replace(HomeUiState::Loading);
        self.load_task = Some(ScopedTask::spawn(self.loader.clone().run(generation)));
    }

    /// Restart the whole load sequence from `Loading`
    pub fn retry(&mut self) {
        info!("Retrying home load");
        self.start_load();
    }

    /// Move the carousel cursor. Ignored unless the screen is in `Success`
    /// and `index` points at a shown driver.
    pub fn update_current_driver_index(&self, index: usize) -> bool {
        set_driver_index(&self.loader.state, index)
    }

    /// Whether a home load is still in flight
    pub fn is_loading(&self) -> bool {
        self.load_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeUiState> {
        self.loader.state.subscribe()
    }

    pub fn state(&self) -> HomeUiState {
        self.loader.state.borrow().clone()
    }

    pub fn countdown(&self) -> watch::Receiver<Option<TimeRemaining>> {
        self.countdown.subscribe()
    }

    pub fn current_driver(&self) -> Option<Driver> {
        self.loader
            .state
            .borrow()
            .content()
            .and_then(HomeContent::current_driver)
            .cloned()
    }

    /// Wait for the latest load sequence to finish and return the state
    pub async fn settled(&self) -> HomeUiState {
        self.loader.generation.wait_current().await;
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::fixtures::{driver, race, race_with_sessions, session};
    use crate::client::mock::{MockFailure, MockFetchClient};
    use crate::timers::MonotonicClock;
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000;

    fn service(mock: &MockFetchClient) -> PitwallService {
        PitwallService::new(Arc::new(mock.clone()))
    }

    fn screen(mock: &MockFetchClient) -> HomeScreen {
        HomeScreen::with_clock(
            &service(mock),
            DisplayConfig::default(),
            Arc::new(MonotonicClock::starting_at(NOW)),
        )
    }

    fn codes(content: &HomeContent) -> Vec<&str> {
        content.drivers.iter().map(|d| d.driver_code.as_str()).collect()
    }

    #[test]
    fn test_top_drivers_sorts_and_truncates() {
        let drivers = [3, 1, 2, 5, 4]
            .iter()
            .map(|p| driver(&format!("P{p}"), *p))
            .collect::<Vec<_>>();
        let top = top_drivers(drivers);
        assert_eq!(top.iter().map(|d| d.position).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_leader_and_upcoming_race_with_session() {
        let mock = MockFetchClient::new(
            vec![driver("NOR", 2), driver("VER", 1)],
            vec![
                race("done", "completed", NOW - 1_000),
                race_with_sessions(
                    "next",
                    "upcoming",
                    NOW + 9_000,
                    vec![session("quali", "upcoming", NOW + 5_000), session("fp3", "completed", NOW)],
                ),
            ],
        );
        let home = screen(&mock);

        let state = home.settled().await;
        let content = state.content().expect("success state");
        assert_eq!(codes(content), vec!["VER"]);
        assert_eq!(content.upcoming_race.as_ref().unwrap().race_id, "next");
        assert_eq!(content.next_session.as_ref().unwrap().session_id, "quali");
        assert_eq!(content.countdown_target(), Some(NOW + 5_000));
        assert_eq!(home.current_driver().unwrap().driver_code, "VER");
    }

    #[tokio::test]
    async fn test_falls_back_to_top_three_without_leader() {
        let mock = MockFetchClient::new(
            vec![driver("C", 3), driver("F", 6), driver("B", 2), driver("E", 5), driver("D", 4)],
            vec![],
        );
        let home = screen(&mock);

        let state = home.settled().await;
        assert_eq!(codes(state.content().unwrap()), vec!["B", "C", "D"]);
        assert_eq!(mock.drivers_call_count(), 2);
    }

    #[tokio::test]
    async fn test_fallback_when_leader_appears_only_in_full_list() {
        let mock = MockFetchClient::new(
            [3, 1, 2, 5, 4].iter().map(|p| driver(&format!("P{p}"), *p)).collect(),
            vec![],
        );
        // Standings change between the leader query and the full fetch
        mock.queue_drivers(Ok(vec![driver("P3", 3), driver("P2", 2)]));
        let home = screen(&mock);

        let state = home.settled().await;
        let positions: Vec<i32> = state.content().unwrap().drivers.iter().map(|d| d.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(mock.drivers_call_count(), 2);
    }

    #[tokio::test]
    async fn test_race_failure_is_swallowed_when_drivers_load() {
        let mock = MockFetchClient::new(vec![driver("VER", 1)], vec![])
            .with_schedule_failure(MockFailure::Timeout("slow".to_string()));
        let home = screen(&mock);

        match home.settled().await {
            HomeUiState::Success(content) => {
                assert_eq!(codes(&content), vec!["VER"]);
                assert!(content.upcoming_race.is_none());
                assert!(content.next_session.is_none());
            }
            other => panic!("Expected success, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_early_race_failure_never_publishes_error() {
        let mock = MockFetchClient::new(vec![driver("VER", 1)], vec![])
            .with_drivers_delay(Duration::from_millis(500))
            .with_schedule_failure(MockFailure::unreachable());
        let home = screen(&mock);

        let mut rx = home.subscribe();
        let recorder = tokio::spawn(async move {
            let mut seen = vec![rx.borrow_and_update().clone()];
            while rx.changed().await.is_ok() {
                let state = rx.borrow_and_update().clone();
                let done = matches!(state, HomeUiState::Success(_));
                seen.push(state);
                if done {
                    break;
                }
            }
            seen
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(home.state(), HomeUiState::Loading);

        assert!(matches!(home.settled().await, HomeUiState::Success(_)));
        let seen = recorder.await.unwrap();
        assert!(!seen.iter().any(|s| matches!(s, HomeUiState::Error(_))), "{:?}", seen);
        assert_eq!(seen.first(), Some(&HomeUiState::Loading));
    }

    #[tokio::test(start_paused = true)]
    async fn test_both_sub_loads_failing_reports_driver_error() {
        let mock = MockFetchClient::new(vec![], vec![])
            .with_drivers_delay(Duration::from_millis(500))
            .with_drivers_failure(MockFailure::Timeout("slow".to_string()))
            .with_schedule_failure(MockFailure::unreachable());
        let home = screen(&mock);

        assert_eq!(home.settled().await, HomeUiState::Error("Request timeout".to_string()));
    }

    #[tokio::test]
    async fn test_driver_failure_is_fatal_even_when_race_loads() {
        let mock = MockFetchClient::new(vec![], vec![race("r1", "upcoming", NOW + 100)])
            .with_drivers_failure(MockFailure::unreachable());
        let home = screen(&mock);

        assert_eq!(
            home.settled().await,
            HomeUiState::Error("No internet connection".to_string())
        );
        assert!(home.current_driver().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_failure_after_race_success_is_fatal() {
        let mock = MockFetchClient::new(vec![], vec![race("r1", "upcoming", NOW + 100)])
            .with_drivers_delay(Duration::from_millis(500))
            .with_drivers_failure(MockFailure::Timeout("slow".to_string()));
        let home = screen(&mock);

        assert_eq!(home.settled().await, HomeUiState::Error("Request timeout".to_string()));
    }

    #[tokio::test]
    async fn test_update_index_only_in_success_and_in_range() {
        let mock = MockFetchClient::new(
            vec![driver("A", 4), driver("B", 2), driver("C", 3)],
            vec![],
        )
        .with_drivers_delay(Duration::from_millis(50));
        let home = screen(&mock);

        assert!(!home.update_current_driver_index(1));
        assert_eq!(home.state(), HomeUiState::Loading);

        home.settled().await;
        assert!(home.update_current_driver_index(2));
        assert_eq!(home.current_driver().unwrap().driver_code, "A");
        assert!(!home.update_current_driver_index(3));
        assert_eq!(home.state().content().unwrap().current_driver_index, 2);
    }

    #[tokio::test]
    async fn test_retry_restarts_from_loading() {
        let mock = MockFetchClient::new(vec![], vec![])
            .with_drivers_failure(MockFailure::Other("boom".to_string()));
        let mut home = screen(&mock);
        assert_eq!(home.settled().await, HomeUiState::Error("boom".to_string()));

        mock.set_drivers(Ok(vec![driver("VER", 1)]));
        home.retry();
        assert_eq!(home.state(), HomeUiState::Loading);

        let state = home.settled().await;
        assert_eq!(codes(state.content().unwrap()), vec!["VER"]);
        assert_eq!(mock.schedule_call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_carousel_cycles_through_drivers() {
        let mock = MockFetchClient::new(
            vec![driver("A", 4), driver("B", 5), driver("C", 6)],
            vec![],
        );
        let home = screen(&mock);
        home.settled().await;

        let mut seen = vec![home.state().content().unwrap().current_driver_index];
        tokio::time::sleep(Duration::from_millis(3_100)).await;
        for _ in 0..4 {
            seen.push(home.state().content().unwrap().current_driver_index);
            tokio::time::sleep(Duration::from_secs(3)).await;
        }
        assert_eq!(seen, vec![0, 1, 2, 0, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_carousel_stays_put_with_single_driver() {
        let mock = MockFetchClient::new(vec![driver("VER", 1)], vec![]);
        let home = screen(&mock);
        home.settled().await;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(home.state().content().unwrap().current_driver_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_stop_when_state_leaves_success() {
        let mock = MockFetchClient::new(
            vec![driver("A", 4), driver("B", 5)],
            vec![race("r1", "upcoming", NOW + 90_000)],
        );
        let mut home = screen(&mock);
        home.settled().await;

        let countdown = home.countdown();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let remaining = countdown.borrow().expect("countdown running");
        assert_eq!((remaining.days, remaining.hours, remaining.minutes), (1, 1, 0));

        mock.set_drivers(Err(MockFailure::unreachable()));
        home.retry();
        assert!(matches!(home.settled().await, HomeUiState::Error(_)));

        let mut rx = home.subscribe();
        rx.borrow_and_update();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!rx.has_changed().unwrap());
        assert!(countdown.borrow().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timers() {
        let mock = MockFetchClient::new(vec![driver("A", 4), driver("B", 5)], vec![]);
        let home = screen(&mock);
        home.settled().await;

        let mut rx = home.subscribe();
        rx.borrow_and_update();
        drop(home);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.has_changed().is_err());
    }
}
