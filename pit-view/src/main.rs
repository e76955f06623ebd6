//! pit-view - Terminal viewer for Pitwall screens
//!
//! Drives the Home or Race Detail screen against the configured endpoints and
//! prints each published state to stdout.

mod render;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use libpitwall::logging::{LogFormat, LoggingConfig};
use libpitwall::timers::{Clock, SystemClock, TimeRemaining};
use libpitwall::{
    Config, DetailScreen, DetailUiState, HomeContent, HomeScreen, HomeUiState, PitwallError,
    PitwallService,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "pit-view")]
#[command(version)]
#[command(about = "Show the Formula 1 home and race detail screens in the terminal")]
#[command(long_about = "\
pit-view - Show the Formula 1 home and race detail screens in the terminal

DESCRIPTION:
    pit-view loads driver standings and the race calendar and renders the
    screen you ask for as plain text. By default it waits for the screen to
    finish loading, prints it once and exits. With --watch it keeps running,
    printing every state change and a countdown to the next session.

USAGE:
    # Championship leader, next race and next session
    pit-view home

    # Details for one race
    pit-view race bahrain_2025

    # Keep the home screen live, retrying 30s after a failure
    pit-view home --watch --retry-after 30

SIGNALS:
    SIGTERM, SIGINT - Stop watching and exit

CONFIGURATION:
    Configuration file: ~/.config/pitwall/config.toml
    (override with --config or PITWALL_CONFIG)

    [api]
    base_url = \"https://mocki.io/v1\"
    drivers_path = \"<drivers endpoint>\"
    schedule_path = \"<schedule endpoint>\"

    [display]
    carousel_interval_ms = 3000
    countdown_tick_ms = 1000

EXIT CODES:
    0 - Success
    1 - Load failed
    2 - Configuration error
    3 - Invalid input
")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to the standard location)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Log output format: text, json or pretty
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Championship leader, upcoming race and its next session
    Home {
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// Details for a single race
    Race {
        /// Race identifier as listed in the schedule
        race_id: String,

        #[command(flatten)]
        watch: WatchArgs,
    },
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Keep running and print every update until interrupted
    #[arg(short, long)]
    watch: bool,

    /// Retry a failed load after this many seconds (watch mode only)
    #[arg(long, value_name = "SECONDS", requires = "watch")]
    retry_after: Option<u64>,
}

impl WatchArgs {
    fn retry_delay(&self) -> Option<Duration> {
        self.retry_after.map(Duration::from_secs)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::from_env(cli.verbose);
    if let Some(format) = cli.log_format {
        logging = logging.with_format(format);
    }
    logging.init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<PitwallError>()
        .map(PitwallError::exit_code)
        .unwrap_or(1)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_or_default()?,
    };
    debug!(
        drivers = %config.api.drivers_url(),
        schedule = %config.api.schedule_url(),
        "Configuration loaded"
    );

    let service = PitwallService::from_config(&config);
    let shutdown = shutdown_signal()?;

    match cli.command {
        Command::Home { watch } => {
            let screen = HomeScreen::new(&service, config.display.clone());
            if watch.watch {
                watch_screen(screen, watch.retry_delay(), shutdown).await
            } else {
                print_once(screen, shutdown).await
            }
        }
        Command::Race { race_id, watch } => {
            let race_id = race_id.trim();
            if race_id.is_empty() {
                return Err(PitwallError::InvalidInput("race id must not be empty".to_string()).into());
            }

            let screen = DetailScreen::new(&service, race_id, config.display.clone());
            if watch.watch {
                watch_screen(screen, watch.retry_delay(), shutdown).await
            } else {
                print_once(screen, shutdown).await
            }
        }
    }
}

/// What the viewer needs from a screen
trait Screen {
    type State: Clone + Send + Sync;

    fn subscribe(&self) -> watch::Receiver<Self::State>;
    fn countdown(&self) -> watch::Receiver<Option<TimeRemaining>>;
    fn retry(&mut self);
    async fn settled(&self) -> Self::State;

    fn render(state: &Self::State) -> String;
    fn error_message(state: &Self::State) -> Option<&str>;
    fn countdown_target(state: &Self::State) -> Option<i64>;
}

impl Screen for HomeScreen {
    type State = HomeUiState;

    fn subscribe(&self) -> watch::Receiver<HomeUiState> {
        HomeScreen::subscribe(self)
    }

    fn countdown(&self) -> watch::Receiver<Option<TimeRemaining>> {
        HomeScreen::countdown(self)
    }

    fn retry(&mut self) {
        HomeScreen::retry(self)
    }

    async fn settled(&self) -> HomeUiState {
        HomeScreen::settled(self).await
    }

    fn render(state: &HomeUiState) -> String {
        render::home(state)
    }

    fn error_message(state: &HomeUiState) -> Option<&str> {
        match state {
            HomeUiState::Error(message) => Some(message),
            _ => None,
        }
    }

    fn countdown_target(state: &HomeUiState) -> Option<i64> {
        state.content().and_then(HomeContent::countdown_target)
    }
}

impl Screen for DetailScreen {
    type State = DetailUiState;

    fn subscribe(&self) -> watch::Receiver<DetailUiState> {
        DetailScreen::subscribe(self)
    }

    fn countdown(&self) -> watch::Receiver<Option<TimeRemaining>> {
        DetailScreen::countdown(self)
    }

    fn retry(&mut self) {
        DetailScreen::retry(self)
    }

    async fn settled(&self) -> DetailUiState {
        DetailScreen::settled(self).await
    }

    fn render(state: &DetailUiState) -> String {
        render::detail(state)
    }

    fn error_message(state: &DetailUiState) -> Option<&str> {
        match state {
            DetailUiState::Error(message) => Some(message),
            _ => None,
        }
    }

    fn countdown_target(state: &DetailUiState) -> Option<i64> {
        state.race().map(libpitwall::format::countdown_target)
    }
}

/// Wait for the screen to settle, print it and exit
async fn print_once<S: Screen>(screen: S, mut shutdown: watch::Receiver<bool>) -> anyhow::Result<()> {
    let state = tokio::select! {
        state = screen.settled() => state,
        _ = shutdown.changed() => {
            info!("Interrupted before the screen finished loading");
            return Ok(());
        }
    };

    println!("{}", S::render(&state));
    if let Some(target) = S::countdown_target(&state) {
        let remaining = TimeRemaining::between(target, SystemClock.now());
        println!("{}", render::countdown(&remaining));
    }

    if let Some(message) = S::error_message(&state) {
        bail!("{}", message);
    }
    Ok(())
}

/// Print every state change and countdown tick until interrupted
async fn watch_screen<S: Screen>(
    mut screen: S,
    retry_after: Option<Duration>,
    mut shutdown: watch::Receiver<bool>,
) -> anyhow::Result<()> {
    let mut states = screen.subscribe();
    let mut countdown = screen.countdown();

    let initial = states.borrow_and_update().clone();
    println!("{}", S::render(&initial));

    loop {
        let failed = S::error_message(&states.borrow()).is_some();
        let retry_due = async move {
            match retry_after {
                Some(delay) if failed => tokio::time::sleep(delay).await,
                _ => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = shutdown.changed() => {
                info!("Received shutdown signal, stopping");
                break;
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!("{}", S::render(&state));
            }
            changed = countdown.changed() => {
                if changed.is_err() {
                    break;
                }
                let remaining = *countdown.borrow_and_update();
                if let Some(remaining) = remaining {
                    println!("{}", render::countdown(&remaining));
                }
            }
            _ = retry_due => {
                info!("Retrying after failure");
                screen.retry();
            }
        }
    }

    Ok(())
}

/// Receiver that flips to `true` on SIGINT or SIGTERM
fn shutdown_signal() -> anyhow::Result<watch::Receiver<bool>> {
    let (tx, rx) = watch::channel(false);

    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        use signal_hook::iterator::Signals;

        let mut signals = Signals::new([SIGINT, SIGTERM]).context("Signal setup failed")?;
        std::thread::spawn(move || {
            if let Some(signal) = signals.forever().next() {
                debug!(signal, "Shutdown signal received");
                tx.send_replace(true);
            }
        });
    }

    #[cfg(not(unix))]
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tx.send_replace(true);
        }
    });

    Ok(rx)
}
