//! Core types for Pitwall
//!
//! Snapshots decoded from the remote service. Field names follow the wire
//! format (camelCase); unknown fields are ignored so newer payloads still
//! decode.

use serde::{Deserialize, Serialize};

/// Literal state value marking a race or session that has not started
pub const UPCOMING: &str = "upcoming";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: String,
    pub driver_code: String,
    pub team_id: String,
    pub team_name: String,
    pub points: i32,
    pub podiums: i32,
    pub poles: i32,
    pub wins: i32,
    /// 1-based championship rank
    pub position: i32,
    pub first_name: String,
    pub last_name: String,
    pub racing_number: i32,
}

impl Driver {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub session_type: String,
    pub session_name: String,
    /// Unix seconds
    pub start_time: i64,
    /// Unix seconds
    pub end_time: i64,
    pub session_state: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
}

impl Session {
    pub fn is_upcoming(&self) -> bool {
        self.session_state == UPCOMING
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub race_id: String,
    pub circuit_id: String,
    #[serde(default)]
    pub race_name: String,
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub is_sprint: bool,
    /// Unix seconds
    pub race_start_time: i64,
    /// Unix seconds
    pub race_end_time: i64,
    pub race_state: String,
    #[serde(default)]
    pub sessions: Vec<Session>,
    /// Finishing order, only present once the race is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub podium: Option<Vec<String>>,
}

impl Race {
    pub fn is_upcoming(&self) -> bool {
        self.race_state == UPCOMING
    }
}

/// Envelope returned by the drivers endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriversPayload {
    pub drivers: Vec<Driver>,
}

/// Envelope returned by the schedule endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub schedule: Vec<Race>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_decodes_and_ignores_unknown_fields() {
        let json = r#"{
            "driverId": "max_verstappen",
            "driverCode": "VER",
            "teamId": "red_bull",
            "teamName": "Red Bull Racing",
            "points": 437,
            "podiums": 14,
            "poles": 8,
            "wins": 9,
            "position": 1,
            "firstName": "Max",
            "lastName": "Verstappen",
            "racingNumber": 1,
            "helmetColour": "navy"
        }"#;

        let driver: Driver = serde_json::from_str(json).unwrap();
        assert_eq!(driver.driver_code, "VER");
        assert_eq!(driver.position, 1);
        assert_eq!(driver.full_name(), "Max Verstappen");
    }

    #[test]
    fn test_schedule_payload_decodes_sessions_and_optional_podium() {
        let json = r#"{
            "schedule": [{
                "raceId": "r1",
                "circuitId": "sao_paulo",
                "raceName": "Sao Paulo Grand Prix",
                "round": 21,
                "isSprint": true,
                "raceStartTime": 1730419200,
                "raceEndTime": 1730592000,
                "raceState": "upcoming",
                "sessions": [{
                    "sessionId": "s1",
                    "sessionType": "fp1",
                    "sessionName": "Practice 1",
                    "startTime": 1730419200,
                    "endTime": 1730422800,
                    "sessionState": "upcoming",
                    "_id": "6720c1"
                }],
                "trackTemperature": 41
            }],
            "season": 2024
        }"#;

        let payload: SchedulePayload = serde_json::from_str(json).unwrap();
        let race = &payload.schedule[0];
        assert!(race.is_upcoming());
        assert!(race.is_sprint);
        assert_eq!(race.podium, None);
        assert_eq!(race.sessions[0].backend_id.as_deref(), Some("6720c1"));
        assert!(race.sessions[0].is_upcoming());
    }

    #[test]
    fn test_race_optional_fields_default() {
        let json = r#"{
            "raceId": "r9",
            "circuitId": "sakhir",
            "raceStartTime": 10,
            "raceEndTime": 20,
            "raceState": "completed",
            "podium": ["VER", "LEC", "NOR"]
        }"#;

        let race: Race = serde_json::from_str(json).unwrap();
        assert!(!race.is_upcoming());
        assert!(race.sessions.is_empty());
        assert_eq!(race.round, 0);
        assert_eq!(race.podium.unwrap().len(), 3);
    }
}
