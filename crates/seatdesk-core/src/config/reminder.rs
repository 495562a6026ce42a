//! Reminder lead-interval configuration.

use serde::{Deserialize, Serialize};

use crate::types::LeadInterval;

/// Lead intervals used when an event does not request its own.
///
/// Values outside the closed [`LeadInterval`] vocabulary fail at
/// configuration load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Default intervals for task due dates.
    #[serde(default = "default_task")]
    pub task: Vec<LeadInterval>,
    /// Default intervals for exam dates.
    #[serde(default = "default_exam")]
    pub exam: Vec<LeadInterval>,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            task: default_task(),
            exam: default_exam(),
        }
    }
}

fn default_task() -> Vec<LeadInterval> {
    vec![LeadInterval::OneHour, LeadInterval::OneDay]
}

fn default_exam() -> Vec<LeadInterval> {
    vec![LeadInterval::OneDay, LeadInterval::OneWeek]
}
