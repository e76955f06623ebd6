//! Plain-text rendering of screen states

use libpitwall::format::{
    circuit_description, format_circuit_name, format_race_dates, format_race_name,
    format_session_time,
};
use libpitwall::timers::TimeRemaining;
use libpitwall::{DetailUiState, Driver, HomeContent, HomeUiState, Race, Session};
use std::fmt::Write;

const LOADING: &str = "Loading...";

pub fn home(state: &HomeUiState) -> String {
    match state {
        HomeUiState::Loading => LOADING.to_string(),
        HomeUiState::Error(message) => format!("Error: {message}"),
        HomeUiState::Success(content) => home_content(content),
    }
}

fn home_content(content: &HomeContent) -> String {
    let mut out = String::new();

    match content.current_driver() {
        Some(driver) if content.drivers.len() > 1 => {
            let _ = writeln!(
                out,
                "Top drivers [{}/{}]: {}",
                content.current_driver_index + 1,
                content.drivers.len(),
                driver_line(driver)
            );
        }
        Some(driver) => {
            let _ = writeln!(out, "Leader: {}", driver_line(driver));
        }
        None => {
            let _ = writeln!(out, "No standings yet");
        }
    }

    match &content.upcoming_race {
        Some(race) => {
            let _ = writeln!(out, "Next race: {}", race_heading(race));
            let _ = writeln!(out, "  {}", format_race_dates(race.race_start_time, race.race_end_time));
        }
        None => {
            let _ = writeln!(out, "No upcoming race");
        }
    }

    if let Some(session) = &content.next_session {
        let _ = writeln!(out, "Next session: {}", session_line(session));
    }

    out.trim_end().to_string()
}

pub fn detail(state: &DetailUiState) -> String {
    match state {
        DetailUiState::Loading => LOADING.to_string(),
        DetailUiState::Error(message) => format!("Error: {message}"),
        DetailUiState::Success(race) => race_detail(race),
    }
}

fn race_detail(race: &Race) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", race_heading(race));
    let _ = writeln!(out, "{}", format_race_dates(race.race_start_time, race.race_end_time));
    let _ = writeln!(out, "{}", circuit_description(&race.circuit_id));

    if !race.sessions.is_empty() {
        let _ = writeln!(out, "Sessions:");
        let mut sessions: Vec<&Session> = race.sessions.iter().collect();
        sessions.sort_by_key(|session| session.start_time);
        for session in sessions {
            let _ = writeln!(out, "  {}", session_line(session));
        }
    }

    if let Some(podium) = race.podium.as_ref().filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "Podium: {}", podium.join(", "));
    }

    out.trim_end().to_string()
}

pub fn countdown(remaining: &TimeRemaining) -> String {
    if remaining.is_zero() {
        "Starting now".to_string()
    } else {
        format!("Starts in {remaining}")
    }
}

fn driver_line(driver: &Driver) -> String {
    format!(
        "P{} {} ({}) {} - {} pts",
        driver.position,
        driver.full_name(),
        driver.driver_code,
        driver.team_name,
        driver.points
    )
}

fn race_heading(race: &Race) -> String {
    let name = if race.race_name.trim().is_empty() {
        format_circuit_name(&race.circuit_id)
    } else {
        format_race_name(&race.race_name)
    };
    let sprint = if race.is_sprint { " (sprint)" } else { "" };

    if race.round > 0 {
        format!("Round {}: {}{} - {}", race.round, name, sprint, format_circuit_name(&race.circuit_id))
    } else {
        format!("{}{} - {}", name, sprint, format_circuit_name(&race.circuit_id))
    }
}

fn session_line(session: &Session) -> String {
    format!(
        "{} {} UTC [{}]",
        session.session_name,
        format_session_time(session.start_time),
        session.session_state
    )
}
