// Task model and status workflow

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A user-created unit of work with a due date and a three-stage status.
///
/// Serialized field names are the persisted document format: camelCase,
/// dates as ISO-8601 strings, timestamps as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_date: NaiveDate,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Workflow stage. Strict linear progression: a task never skips a stage
/// and never moves backward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
        }
    }

    /// The single status this one may advance to. Completed is terminal.
    pub fn successor(self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Scheduled => Some(TaskStatus::InProgress),
            TaskStatus::InProgress => Some(TaskStatus::Completed),
            TaskStatus::Completed => None,
        }
    }

    pub fn can_advance_to(self, target: TaskStatus) -> bool {
        self.successor() == Some(target)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "scheduled" => Ok(TaskStatus::Scheduled),
            "in-progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(Error::Validation(format!(
                "unknown status: {other} (expected scheduled, in-progress or completed)"
            ))),
        }
    }
}

/// On-time/late classification of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Completion {
    OnTime,
    Late,
}

impl Task {
    /// Classify a completed task against the last instant of its due
    /// date (23:59:59.999 UTC). Late iff completion is strictly after
    /// that instant, so finishing on the due date itself is on time.
    pub fn classify_completion(&self) -> Result<Completion> {
        let completed_at = match (self.status, self.completed_at) {
            (TaskStatus::Completed, Some(at)) => at,
            _ => {
                return Err(Error::InvalidState(format!(
                    "task {} is {}, only completed tasks are classified",
                    self.id, self.status
                )));
            }
        };

        let deadline = self
            .due_date
            .and_hms_milli_opt(23, 59, 59, 999)
            .expect("end of day is a valid time")
            .and_utc();

        if completed_at > deadline {
            Ok(Completion::Late)
        } else {
            Ok(Completion::OnTime)
        }
    }
}
