//! The closed vocabulary of reminder lead intervals.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::priority::Priority;
use crate::error::AppError;

/// How long before an event a reminder fires.
///
/// Only these six intervals exist. Configuration and callers parse into
/// this enum at the boundary, so scheduling code never sees an unknown
/// interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LeadInterval {
    /// One hour before the event.
    #[serde(rename = "1_hour")]
    OneHour,
    /// Six hours before the event.
    #[serde(rename = "6_hours")]
    SixHours,
    /// One day before the event.
    #[serde(rename = "1_day")]
    OneDay,
    /// Three days before the event.
    #[serde(rename = "3_days")]
    ThreeDays,
    /// One week before the event.
    #[serde(rename = "1_week")]
    OneWeek,
    /// Two weeks before the event.
    #[serde(rename = "2_weeks")]
    TwoWeeks,
}

impl LeadInterval {
    /// All intervals, shortest first.
    pub const ALL: [LeadInterval; 6] = [
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
        Self::TwoWeeks,
    ];

    /// The interval as a duration.
    pub fn duration(&self) -> Duration {
        match self {
            Self::OneHour => Duration::hours(1),
            Self::SixHours => Duration::hours(6),
            Self::OneDay => Duration::days(1),
            Self::ThreeDays => Duration::days(3),
            Self::OneWeek => Duration::weeks(1),
            Self::TwoWeeks => Duration::weeks(2),
        }
    }

    /// Wire name, e.g. `"1_hour"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneHour => "1_hour",
            Self::SixHours => "6_hours",
            Self::OneDay => "1_day",
            Self::ThreeDays => "3_days",
            Self::OneWeek => "1_week",
            Self::TwoWeeks => "2_weeks",
        }
    }

    /// Priority band of a reminder sent this long before the event.
    pub fn priority(&self) -> Priority {
        match self {
            Self::OneHour | Self::SixHours => Priority::Urgent,
            Self::OneDay => Priority::High,
            Self::ThreeDays | Self::OneWeek => Priority::Medium,
            Self::TwoWeeks => Priority::Low,
        }
    }

    /// Human phrase used in reminder messages ("due tomorrow").
    pub fn description(&self) -> &'static str {
        match self {
            Self::OneHour => "in 1 hour",
            Self::SixHours => "in 6 hours",
            Self::OneDay => "tomorrow",
            Self::ThreeDays => "in 3 days",
            Self::OneWeek => "in 1 week",
            Self::TwoWeeks => "in 2 weeks",
        }
    }
}

impl fmt::Display for LeadInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadInterval {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown reminder interval '{s}'")))
    }
}
