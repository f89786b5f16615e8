use std::error::Error;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckInType {
    #[default]
    Daily,
    Weekly,
    Blocked,
    Win,
    Other,
}

impl CheckInType {
    pub const ALL: [CheckInType; 5] = [
        CheckInType::Daily,
        CheckInType::Weekly,
        CheckInType::Blocked,
        CheckInType::Win,
        CheckInType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CheckInType::Daily => "Daily",
            CheckInType::Weekly => "Weekly",
            CheckInType::Blocked => "Blocked",
            CheckInType::Win => "Win",
            CheckInType::Other => "Other",
        }
    }
}

impl fmt::Display for CheckInType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckInType {
    type Err = ParseCheckInTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        let kind = match normalized.as_str() {
            "daily" => CheckInType::Daily,
            "weekly" => CheckInType::Weekly,
            "blocked" => CheckInType::Blocked,
            "win" => CheckInType::Win,
            "other" => CheckInType::Other,
            _ => {
                return Err(ParseCheckInTypeError {
                    value: value.to_string(),
                });
            }
        };

        Ok(kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCheckInTypeError {
    value: String,
}

impl fmt::Display for ParseCheckInTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid check-in type '{}': expected one of {}",
            self.value,
            CheckInType::ALL
                .iter()
                .map(|kind| kind.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Error for ParseCheckInTypeError {}
