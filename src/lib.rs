//! # taskflow
//!
//! A kanban task board: tasks live in five status columns (backlog, to do,
//! in progress, review, done), belong to projects, and carry a priority,
//! an assignee, labels and an optional due date.
//!
//! ## Module Organization
//!
//! - `task`: task records and the authoritative task store with its
//!   per-project membership index
//! - `project`: projects, the current-project pointer and default seeding
//! - `due`: day arithmetic, due-date buckets, board stats and due-soon views
//! - `board`: the application context that owns the stores and queues
//!   notifications for renderers
//! - `view`: the render model kept in step with those notifications
//! - `db`: key-value persistence (`MemoryStore`, `FileStore`)
//! - `config`, `theme`, `labels`, `fields`, `error`: supporting types
//! - `cli`, `cmd`: the `tf` command line
//! - `tui`: the interactive board
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the board
//! tf
//!
//! # Add a task due on Friday
//! tf add "Write release notes" --priority high --due fri --label documentation
//!
//! # What is due soon across every project?
//! tf due
//! ```

pub mod board;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod due;
pub mod error;
pub mod fields;
pub mod labels;
pub mod project;
pub mod task;
pub mod theme;
pub mod view;
pub mod tui {
    pub mod board;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
}
