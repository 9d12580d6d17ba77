//! Enumerations and field types for the task board.
//!
//! This module defines the structured values a task carries (workflow status and
//! priority) together with the filter selectors used by the board and the CLI.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workflow stage of a task. Columns on the board follow this order.
///
/// Transitions are unrestricted: any status can be reached from any other.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Backlog,
    Todo,
    #[value(name = "inprogress", alias = "in-progress")]
    #[serde(alias = "in-progress")]
    InProgress,
    Review,
    Done,
}

impl Status {
    /// Every status in board column order.
    pub const ALL: [Status; 5] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::Review,
        Status::Done,
    ];

    /// Position of this status on the board.
    pub fn column(self) -> usize {
        match self {
            Status::Backlog => 0,
            Status::Todo => 1,
            Status::InProgress => 2,
            Status::Review => 3,
            Status::Done => 4,
        }
    }

    /// The storage key used in snapshots.
    pub fn key(self) -> &'static str {
        match self {
            Status::Backlog => "backlog",
            Status::Todo => "todo",
            Status::InProgress => "inprogress",
            Status::Review => "review",
            Status::Done => "done",
        }
    }

    /// Column heading shown by the renderers.
    pub fn title(self) -> &'static str {
        match self {
            Status::Backlog => "Backlog",
            Status::Todo => "To Do",
            Status::InProgress => "In Progress",
            Status::Review => "Review",
            Status::Done => "Done",
        }
    }

    /// Placeholder text for a column with no visible tasks.
    pub fn empty_message(self) -> &'static str {
        match self {
            Status::Backlog => "No tasks in backlog",
            Status::Todo => "No tasks to do",
            Status::InProgress => "No tasks in progress",
            Status::Review => "No tasks under review",
            Status::Done => "No completed tasks",
        }
    }

    /// The column to the left, if any.
    pub fn prev(self) -> Option<Status> {
        self.column().checked_sub(1).map(|i| Status::ALL[i])
    }

    /// The column to the right, if any.
    pub fn next(self) -> Option<Status> {
        Status::ALL.get(self.column() + 1).copied()
    }
}


impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Priority classification for task importance.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// High and urgent tasks are what the priority filter shows.
    pub fn is_pressing(self) -> bool {
        matches!(self, Priority::High | Priority::Urgent)
    }

    pub fn key(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}


impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Quick filters offered next to the search box.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    AssignedToMe,
    Priority,
    DueSoon,
    Overdue,
}

/// Selector for the due-soon summary view.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum DueSoonFilter {
    /// Everything due within the next two weeks, overdue included.
    #[default]
    All,
    Overdue,
    Today,
    Week,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serialises_to_board_keys() {
        let json = serde_json::to_string(&Status::ALL).unwrap();
        assert_eq!(json, r#"["backlog","todo","inprogress","review","done"]"#);
        let parsed: Status = serde_json::from_str(r#""in-progress""#).unwrap();
        assert_eq!(parsed, Status::InProgress);
    }

    #[test]
    fn status_neighbours_stop_at_board_edges() {
        assert_eq!(Status::Backlog.prev(), None);
        assert_eq!(Status::Backlog.next(), Some(Status::Todo));
        assert_eq!(Status::Review.next(), Some(Status::Done));
        assert_eq!(Status::Done.next(), None);
    }

    #[test]
    fn defaults_match_new_task_defaults() {
        assert_eq!(Status::default(), Status::Backlog);
        assert_eq!(Priority::default(), Priority::Medium);
        assert!(Priority::Urgent.is_pressing());
        assert!(!Priority::Medium.is_pressing());
    }
}
