//! Presentation helpers
//!
//! Pure formatting over the data model. All calendar math is UTC.

use chrono::{DateTime, Datelike, Utc};

use crate::repository::earliest_upcoming_session;
use crate::types::Race;

fn to_datetime(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or_default()
}

/// `sao_paulo` -> `São Paulo`
pub fn format_circuit_name(circuit_id: &str) -> String {
    circuit_id
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
        .replace("Sao", "São")
}

/// Race weekend window, compacted when start and end share a month or year
pub fn format_race_dates(start_time: i64, end_time: i64) -> String {
    let start = to_datetime(start_time);
    let end = to_datetime(end_time);

    let same_year = start.year() == end.year();
    let same_month = same_year && start.month() == end.month();

    if same_month {
        format!("{} - {} {}", start.day(), end.day(), start.format("%B"))
    } else if same_year {
        format!("{} - {}", start.format("%-d %b"), end.format("%-d %b"))
    } else {
        format!("{} - {}", start.format("%-d %b %Y"), end.format("%-d %b %Y"))
    }
}

/// `1730419200` -> `12:00 AM`
pub fn format_session_time(timestamp: i64) -> String {
    to_datetime(timestamp).format("%-I:%M %p").to_string()
}

pub fn format_race_name(race_name: &str) -> String {
    race_name.replace("Grand Prix", "GP").trim().to_string()
}

pub fn circuit_description(circuit_id: &str) -> &'static str {
    match circuit_id {
        "sao_paulo" => "The São Paulo Grand Prix takes place at the Interlagos circuit, one of the most challenging tracks in Formula 1. Known for its elevation changes and technical corners, it provides exciting racing action.",
        "sakhir" => "The Bahrain International Circuit, located in Sakhir, was designed by Hermann Tilke. Originally a camel farm, it features a 5.412 km layout with 15 corners, 3 DRS Zones, and 57 laps. The circuit has 6 alternative layouts.",
        _ => "This circuit is one of the premier venues in Formula 1, featuring challenging corners and high-speed sections that test both drivers and cars to their limits.",
    }
}

/// Countdown target for a race: its earliest upcoming session, else the race
/// start
pub fn countdown_target(race: &Race) -> i64 {
    earliest_upcoming_session(&race.sessions)
        .map(|session| session.start_time)
        .unwrap_or(race.race_start_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::fixtures::{race, race_with_sessions, session};

    #[test]
    fn test_format_circuit_name() {
        assert_eq!(format_circuit_name("sao_paulo"), "São Paulo");
        assert_eq!(format_circuit_name("yas_marina"), "Yas Marina");
        assert_eq!(format_circuit_name("monza"), "Monza");
    }

    #[test]
    fn test_format_race_dates_same_month() {
        // 2024-11-01 .. 2024-11-03
        assert_eq!(format_race_dates(1_730_419_200, 1_730_592_000), "1 - 3 November");
    }

    #[test]
    fn test_format_race_dates_across_months() {
        // 2024-10-30 .. 2024-11-02
        assert_eq!(format_race_dates(1_730_246_400, 1_730_505_600), "30 Oct - 2 Nov");
    }

    #[test]
    fn test_format_race_dates_across_years() {
        // 2024-12-31 .. 2025-01-01
        assert_eq!(
            format_race_dates(1_735_603_200, 1_735_689_600),
            "31 Dec 2024 - 1 Jan 2025"
        );
    }

    #[test]
    fn test_format_session_time() {
        // 2024-11-01 14:30 UTC
        assert_eq!(format_session_time(1_730_471_400), "2:30 PM");
    }

    #[test]
    fn test_format_race_name() {
        assert_eq!(format_race_name("Bahrain Grand Prix "), "Bahrain GP");
    }

    #[test]
    fn test_circuit_description_fallback() {
        assert!(circuit_description("sakhir").contains("Hermann Tilke"));
        assert!(circuit_description("unknown").starts_with("This circuit"));
    }

    #[test]
    fn test_countdown_target_prefers_earliest_upcoming_session() {
        let with_sessions = race_with_sessions(
            "r1",
            "upcoming",
            5_000,
            vec![
                session("race", "upcoming", 5_000),
                session("fp1", "completed", 1_000),
                session("quali", "upcoming", 4_000),
            ],
        );
        assert_eq!(countdown_target(&with_sessions), 4_000);
        assert_eq!(countdown_target(&race("r2", "upcoming", 7_000)), 7_000);
    }
}
