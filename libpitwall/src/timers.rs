//! Countdown and carousel timers
//!
//! Recurring updates layered on a screen's `Success` state. Every timer is a
//! [`ScopedTask`]: dropping the handle aborts the task, so a timer can never
//! outlive whatever owns it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant};
use tracing::debug;

use crate::config::DisplayConfig;

const SECS_PER_DAY: i64 = 86_400;
const SECS_PER_HOUR: i64 = 3_600;
const SECS_PER_MINUTE: i64 = 60;

/// Time left until a target, never negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRemaining {
    pub total_secs: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeRemaining {
    pub fn between(target: i64, now: i64) -> Self {
        let total_secs = target.saturating_sub(now).max(0);
        Self {
            total_secs,
            days: total_secs / SECS_PER_DAY,
            hours: (total_secs % SECS_PER_DAY) / SECS_PER_HOUR,
            minutes: (total_secs % SECS_PER_HOUR) / SECS_PER_MINUTE,
            seconds: total_secs % SECS_PER_MINUTE,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_secs == 0
    }
}

impl std::fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d {:02}h {:02}m", self.days, self.hours, self.minutes)
    }
}

/// Next carousel position; 0 for an empty list
pub fn next_index(current: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (current + 1) % count
    }
}

/// Source of "now" in Unix seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Clock anchored at a Unix time that advances with tokio's clock, so it
/// follows `tokio::time::pause`/`advance` in tests
pub struct MonotonicClock {
    origin_unix: i64,
    origin: Instant,
}

impl MonotonicClock {
    pub fn starting_at(origin_unix: i64) -> Self {
        Self {
            origin_unix,
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> i64 {
        self.origin_unix + self.origin.elapsed().as_secs() as i64
    }
}

/// Spawned task that is aborted when the handle is dropped
pub struct ScopedTask {
    handle: JoinHandle<()>,
}

impl ScopedTask {
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(future),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ScopedTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Publish the time left until `target` every `tick` until it reaches zero.
///
/// The first value is published immediately. Once zero is published the task
/// ends; the last value stays in the channel.
pub fn spawn_countdown(
    target: i64,
    tick: Duration,
    clock: Arc<dyn Clock>,
    output: Arc<watch::Sender<Option<TimeRemaining>>>,
) -> ScopedTask {
    ScopedTask::spawn(async move {
        let mut ticker = interval(tick);
        loop {
            ticker.tick().await;
            let remaining = TimeRemaining::between(target, clock.now());
            output.send_replace(Some(remaining));
            if remaining.is_zero() {
                debug!(target, "Countdown reached zero");
                break;
            }
        }
    })
}

/// Call `advance` once every `period`, first call one period from now
pub fn spawn_carousel<A>(period: Duration, advance: A) -> ScopedTask
where
    A: Fn() + Send + 'static,
{
    ScopedTask::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;
            advance();
        }
    })
}

/// Which timers a screen state wants running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerPlan {
    pub carousel: bool,
    pub countdown_target: Option<i64>,
}

/// Keep a screen's timers in line with its state.
///
/// Re-evaluates `plan` on every state change: timers start when the plan
/// asks for them and are dropped (aborted) as soon as it no longer does,
/// e.g. when the state leaves `Success`. Aborting this future drops
/// every timer it started.
pub(crate) async fn supervise<S, P, A>(
    mut state: watch::Receiver<S>,
    plan: P,
    advance: A,
    display: DisplayConfig,
    clock: Arc<dyn Clock>,
    countdown: Arc<watch::Sender<Option<TimeRemaining>>>,
) where
    S: Send + Sync + 'static,
    P: Fn(&S) -> TimerPlan + Send + 'static,
    A: Fn() + Clone + Send + 'static,
{
    let mut carousel: Option<ScopedTask> = None;
    let mut running_countdown: Option<(i64, ScopedTask)> = None;

    loop {
        let wanted = plan(&state.borrow_and_update());

        if wanted.carousel {
            if carousel.is_none() {
                debug!("Starting carousel");
                carousel = Some(spawn_carousel(display.carousel_interval(), advance.clone()));
            }
        } else if carousel.take().is_some() {
            debug!("Stopped carousel");
        }

        match wanted.countdown_target {
            Some(target) => {
                let same_target = matches!(running_countdown, Some((t, _)) if t == target);
                if !same_target {
                    debug!(target, "Starting countdown");
                    running_countdown = Some((
                        target,
                        spawn_countdown(
                            target,
                            display.countdown_tick(),
                            Arc::clone(&clock),
                            Arc::clone(&countdown),
                        ),
                    ));
                }
            }
            None => {
                if running_countdown.take().is_some() {
                    debug!("Stopped countdown");
                }
                countdown.send_replace(None);
            }
        }

        if state.changed().await.is_err() {
            break;
        }
    }
}
