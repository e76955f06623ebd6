//! Race detail screen state machine

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{failure_message, LoadGeneration};
use crate::config::DisplayConfig;
use crate::format::countdown_target;
use crate::outcome::Outcome;
use crate::service::details::RaceDetailsUseCase;
use crate::service::PitwallService;
use crate::timers::{supervise, Clock, ScopedTask, SystemClock, TimeRemaining, TimerPlan};
use crate::types::Race;

pub const RACE_NOT_FOUND: &str = "Race not found";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailUiState {
    Loading,
    Success(Race),
    Error(String),
}

impl DetailUiState {
    pub fn race(&self) -> Option<&Race> {
        match self {
            DetailUiState::Success(race) => Some(race),
            _ => None,
        }
    }

    fn timer_plan(&self) -> TimerPlan {
        TimerPlan {
            carousel: false,
            countdown_target: self.race().map(countdown_target),
        }
    }
}

#[derive(Clone)]
struct DetailLoader {
    details: RaceDetailsUseCase,
    race_id: String,
    state: Arc<watch::Sender<DetailUiState>>,
    generation: Arc<LoadGeneration>,
}

impl DetailLoader {
    async fn run(self, generation: u64) {
        let next = match self.details.get(&self.race_id).await {
            Outcome::Success(Some(race)) => {
                debug!(race_id = %self.race_id, "Race details loaded");
                DetailUiState::Success(race)
            }
            Outcome::Success(None) => {
                warn!(race_id = %self.race_id, "Race not in schedule");
                DetailUiState::Error(RACE_NOT_FOUND.to_string())
            }
            Outcome::Error { cause, message } => {
                let message = failure_message(&cause, message, "Failed to load race details");
                warn!(race_id = %self.race_id, error = %message, "Race detail load failed");
                DetailUiState::Error(message)
            }
            Outcome::Loading => {
                self.generation.finish(generation);
                return;
            }
        };

        self.state.send_if_modified(|state| {
            if self.generation.is_current(generation) {
                *state = next;
                true
            } else {
                false
            }
        });
        self.generation.finish(generation);
    }
}

/// Detail screen for one race; dropping it cancels its load and countdown
pub struct DetailScreen {
    loader: DetailLoader,
    countdown: Arc<watch::Sender<Option<TimeRemaining>>>,
    load_task: Option<ScopedTask>,
    _timers: ScopedTask,
}

impl DetailScreen {
    /// Create the screen for `race_id` and start loading. Must be called
    /// inside a tokio runtime.
    pub fn new(service: &PitwallService, race_id: impl Into<String>, display: DisplayConfig) -> Self {
        Self::with_clock(service, race_id, display, Arc::new(SystemClock))
    }

    pub fn with_clock(
        service: &PitwallService,
        race_id: impl Into<String>,
        display: DisplayConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (state, _) = watch::channel(DetailUiState::Loading);
        let state = Arc::new(state);
        let (countdown, _) = watch::channel(None);
        let countdown = Arc::new(countdown);

        let timers = ScopedTask::spawn(supervise(
            state.subscribe(),
            DetailUiState::timer_plan,
            || {},
            display,
            clock,
            Arc::clone(&countdown),
        ));

        let mut screen = Self {
            loader: DetailLoader {
                details: service.details().clone(),
                race_id: race_id.into(),
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
        self.load_task = None;
        let generation = self.loader.generation.begin();
        self.loader.state.send_replace(DetailUiState::Loading);
        self.load_task = Some(ScopedTask::spawn(self.loader.clone().run(generation)));
    }

    pub fn retry(&mut self) {
        info!(race_id = %self.loader.race_id, "Retrying race detail load");
        self.start_load();
    }

    pub fn race_id(&self) -> &str {
        &self.loader.race_id
    }

    /// Whether a race detail load is still in flight
    pub fn is_loading(&self) -> bool {
        self.load_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailUiState> {
        self.loader.state.subscribe()
    }

    pub fn state(&self) -> DetailUiState {
        self.loader.state.borrow().clone()
    }

    pub fn countdown(&self) -> watch::Receiver<Option<TimeRemaining>> {
        self.countdown.subscribe()
    }

    /// Wait for the latest load to finish and return the state
    pub async fn settled(&self) -> DetailUiState {
        self.loader.generation.wait_current().await;
        self.state()
    }
}
