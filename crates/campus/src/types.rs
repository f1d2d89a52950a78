use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CampusError;

/// One of the four interchangeable views mounted by the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    #[default]
    AiChat,
    Schedule,
    Events,
    Tracker,
}

impl View {
    pub const ALL: [View; 4] = [View::AiChat, View::Schedule, View::Events, View::Tracker];

    pub fn label(self) -> &'static str {
        match self {
            Self::AiChat => "AI Assistant",
            Self::Schedule => "Schedule",
            Self::Events => "Upcoming Events",
            Self::Tracker => "Progress Tracker",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Lecture,
    Lab,
    Seminar,
}

impl ScheduleKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Lecture => "lecture",
            Self::Lab => "lab",
            Self::Seminar => "seminar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub time: String,
    pub title: String,
    pub location: String,
    pub kind: ScheduleKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventItem {
    pub id: String,
    pub date: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 3] = [Self::ToDo, Self::InProgress, Self::Completed];

    pub fn label(self) -> &'static str {
        match self {
            Self::ToDo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.label())
    }
}

impl FromStr for AssignmentStatus {
    type Err = CampusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" | "doing" | "started" => Ok(Self::InProgress),
            "completed" | "complete" | "done" => Ok(Self::Completed),
            _ => Err(CampusError::UnknownStatus {
                stage: "parse-assignment-status",
                raw: raw.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub course: String,
    pub due: String,
    pub status: AssignmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_labels_and_aliases() {
        assert_eq!("To Do".parse().ok(), Some(AssignmentStatus::ToDo));
        assert_eq!("in-progress".parse().ok(), Some(AssignmentStatus::InProgress));
        assert_eq!(" DONE ".parse().ok(), Some(AssignmentStatus::Completed));
        assert!("later".parse::<AssignmentStatus>().is_err());
    }

    #[test]
    fn status_serializes_with_display_labels() {
        let json = serde_json::to_string(&AssignmentStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"In Progress\"");
    }

    #[test]
    fn chat_is_the_default_view() {
        assert_eq!(View::default(), View::AiChat);
        assert_eq!(View::ALL.map(View::label)[3], "Progress Tracker");
    }
}
