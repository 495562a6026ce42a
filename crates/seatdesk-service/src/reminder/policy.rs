//! Maps an event date and lead intervals to notification drafts.
//!
//! The policy is pure: it reads no clock and no store. Drafts whose
//! `scheduled_for` is already in the past are still produced so the
//! scheduler dispatches them on its next tick.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatdesk_core::config::ReminderConfig;
use seatdesk_core::types::{ExamId, LeadInterval, RecipientId, TaskId};
use seatdesk_entity::notification::{NewNotification, NotificationKind};

/// The event a reminder is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderTarget {
    /// A task with a due date.
    Task {
        /// The task.
        id: TaskId,
        /// Task title, used in the reminder text.
        title: String,
    },
    /// An exam with a scheduled date.
    Exam {
        /// The exam.
        id: ExamId,
        /// Exam name, used in the reminder text.
        name: String,
    },
}

/// Default lead intervals per event type, plus the draft builder.
#[derive(Debug, Clone)]
pub struct ReminderPolicy {
    task_defaults: Vec<LeadInterval>,
    exam_defaults: Vec<LeadInterval>,
}

impl ReminderPolicy {
    /// Build a policy from configured defaults.
    pub fn new(config: &ReminderConfig) -> Self {
        Self {
            task_defaults: config.task.clone(),
            exam_defaults: config.exam.clone(),
        }
    }

    /// The configured intervals for a target's event type.
    pub fn defaults_for(&self, target: &ReminderTarget) -> &[LeadInterval] {
        match target {
            ReminderTarget::Task { .. } => &self.task_defaults,
            ReminderTarget::Exam { .. } => &self.exam_defaults,
        }
    }

    /// One draft per distinct interval, in the order given, with
    /// `scheduled_for = due - interval` and the interval's priority band.
    pub fn drafts(
        recipient_id: RecipientId,
        target: &ReminderTarget,
        due: DateTime<Utc>,
        intervals: &[LeadInterval],
    ) -> Vec<NewNotification> {
        let mut seen: Vec<LeadInterval> = Vec::with_capacity(intervals.len());
        for interval in intervals {
            if !seen.contains(interval) {
                seen.push(*interval);
            }
        }

        seen.into_iter()
            .map(|interval| draft(recipient_id, target, due, interval))
            .collect()
    }
}

fn draft(
    recipient_id: RecipientId,
    target: &ReminderTarget,
    due: DateTime<Utc>,
    interval: LeadInterval,
) -> NewNotification {
    let scheduled_for = due - interval.duration();
    let when = interval.description();
    match target {
        ReminderTarget::Task { id, title } => {
            let mut draft = NewNotification::new(
                recipient_id,
                NotificationKind::TaskReminder,
                interval.priority(),
                format!("Task Reminder: {title}"),
                format!("Your task '{title}' is due {when}."),
                scheduled_for,
            );
            draft.related_task_id = Some(*id);
            draft
        }
        ReminderTarget::Exam { id, name } => {
            let mut draft = NewNotification::new(
                recipient_id,
                NotificationKind::ExamReminder,
                interval.priority(),
                format!("Exam Reminder: {name}"),
                format!("Your exam '{name}' is scheduled {when}."),
                scheduled_for,
            );
            draft.related_exam_id = Some(*id);
            draft
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use seatdesk_core::types::Priority;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, 10, 0, 0).unwrap()
    }

    fn task() -> ReminderTarget {
        ReminderTarget::Task {
            id: TaskId::new(),
            title: "Physics assignment".to_string(),
        }
    }

    #[test]
    fn test_hour_and_day_produce_urgent_and_high() {
        let drafts = ReminderPolicy::drafts(
            RecipientId::new(),
            &task(),
            due(),
            &[LeadInterval::OneHour, LeadInterval::OneDay],
        );
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].priority, Priority::Urgent);
        assert_eq!(drafts[0].scheduled_for, due() - Duration::hours(1));
        assert_eq!(drafts[1].priority, Priority::High);
        assert_eq!(drafts[1].scheduled_for, due() - Duration::days(1));
        assert!(drafts.iter().all(|d| d.kind == NotificationKind::TaskReminder));
    }

    #[test]
    fn test_duplicate_intervals_collapse() {
        let drafts = ReminderPolicy::drafts(
            RecipientId::new(),
            &task(),
            due(),
            &[LeadInterval::OneWeek, LeadInterval::OneWeek, LeadInterval::TwoWeeks],
        );
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[1].priority, Priority::Low);
    }

    #[test]
    fn test_exam_text_and_reference() {
        let exam_id = ExamId::new();
        let target = ReminderTarget::Exam {
            id: exam_id,
            name: "Organic Chemistry".to_string(),
        };
        let drafts =
            ReminderPolicy::drafts(RecipientId::new(), &target, due(), &[LeadInterval::OneDay]);
        assert_eq!(drafts[0].title, "Exam Reminder: Organic Chemistry");
        assert_eq!(
            drafts[0].message,
            "Your exam 'Organic Chemistry' is scheduled tomorrow."
        );
        assert_eq!(drafts[0].related_exam_id, Some(exam_id));
        assert_eq!(drafts[0].related_task_id, None);
    }

    #[test]
    fn test_past_due_drafts_are_kept() {
        let drafts = ReminderPolicy::drafts(
            RecipientId::new(),
            &task(),
            Utc::now() + Duration::minutes(10),
            &[LeadInterval::OneDay],
        );
        assert_eq!(drafts.len(), 1);
        assert!(drafts[0].scheduled_for < Utc::now());
    }

    #[test]
    fn test_configured_defaults() {
        let policy = ReminderPolicy::new(&ReminderConfig::default());
        assert_eq!(
            policy.defaults_for(&task()),
            &[LeadInterval::OneHour, LeadInterval::OneDay]
        );
    }
}
