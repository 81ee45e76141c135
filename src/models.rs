use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::HubError;

#[derive(Debug, Clone, Serialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub color: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Pending,
    Submitted,
    Overdue,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Submitted => "submitted",
            AssignmentStatus::Overdue => "overdue",
        }
    }

    pub fn badge(&self) -> Badge {
        match self {
            AssignmentStatus::Pending => Badge::Warning,
            AssignmentStatus::Submitted => Badge::Success,
            AssignmentStatus::Overdue => Badge::Danger,
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub due: DateTime<Utc>,
    pub status: AssignmentStatus,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub id: String,
    pub course_id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Faculty {
    pub id: String,
    pub name: String,
    pub department: String,
    pub email: String,
    pub office: String,
    /// Display codes such as "CSE101", not course ids.
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub course_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    Deadline,
    Overdue,
    Event,
}

impl ReminderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ReminderKind::Deadline => "Deadline",
            ReminderKind::Overdue => "Overdue",
            ReminderKind::Event => "Event",
        }
    }

    pub fn badge(&self) -> Badge {
        match self {
            ReminderKind::Overdue => Badge::Danger,
            ReminderKind::Deadline => Badge::Warning,
            ReminderKind::Event => Badge::Success,
        }
    }
}

/// Advisory derived from assignment and event proximity. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reminder {
    pub kind: ReminderKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Faculty,
}

impl Role {
    pub fn toggled(self) -> Role {
        match self {
            Role::Student => Role::Faculty,
            Role::Faculty => Role::Student,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }
}

impl FromStr for Role {
    type Err = HubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            other => Err(HubError::InvalidValue {
                field: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Only(AssignmentStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: AssignmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = HubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Only(AssignmentStatus::Pending)),
            "submitted" => Ok(StatusFilter::Only(AssignmentStatus::Submitted)),
            "overdue" => Ok(StatusFilter::Only(AssignmentStatus::Overdue)),
            other => Err(HubError::InvalidValue {
                field: "status",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Warning,
    Success,
    Danger,
}

/// Search hit over any searchable entity kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entity {
    Course(Course),
    Assignment(Assignment),
    Notice(Notice),
    Faculty(Faculty),
}

impl Entity {
    pub fn kind_label(&self) -> &'static str {
        match self {
            Entity::Course(_) => "Course",
            Entity::Assignment(_) => "Assignment",
            Entity::Notice(_) => "Notice",
            Entity::Faculty(_) => "Faculty",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentInput {
    pub title: String,
    pub course_id: String,
    pub due: chrono::NaiveDate,
    pub description: String,
    /// Comma separated, as typed.
    pub tags: String,
}

#[derive(Debug, Clone)]
pub struct NoticeInput {
    pub title: String,
    pub course_id: String,
    pub body: String,
    pub tags: String,
}

#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub date: chrono::NaiveDate,
    pub course_id: String,
}

pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(|tag| tag.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(parse_tags("x, y"), vec!["x".to_string(), "y".to_string()]);
        assert_eq!(parse_tags(" , lab,,  "), vec!["lab".to_string()]);
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn status_filter_parses_known_values() {
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "Overdue".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(AssignmentStatus::Overdue)
        );
        assert!("late".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn role_toggles_between_student_and_faculty() {
        assert_eq!(Role::Student.toggled(), Role::Faculty);
        assert_eq!(Role::Faculty.toggled(), Role::Student);
        assert_eq!("faculty".parse::<Role>().unwrap(), Role::Faculty);
    }
}
