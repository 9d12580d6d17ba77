//! Enumerations for TUI state management.

use crate::fields::DueSoonFilter;

/// What the board is currently doing with keyboard input.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardMode {
    /// Navigating columns and cards.
    Browse,
    /// Typing into the search box.
    Search,
    /// Typing the title of a new task.
    NewTask,
    /// Typing the name of a new project.
    NewProject,
    /// Waiting for y/n before deleting the selected task.
    ConfirmDelete,
    /// Task detail popup.
    Detail,
    /// Due-soon overlay with its filter.
    DueSoon(DueSoonFilter),
    Help,
}

impl BoardMode {
    /// Modes that read free text.
    pub fn takes_text(self) -> bool {
        matches!(self, BoardMode::Search | BoardMode::NewTask | BoardMode::NewProject)
    }
}

/// Next due-soon filter in the overlay's tab order.
pub fn next_due_filter(filter: DueSoonFilter) -> DueSoonFilter {
    match filter {
        DueSoonFilter::All => DueSoonFilter::Overdue,
        DueSoonFilter::Overdue => DueSoonFilter::Today,
        DueSoonFilter::Today => DueSoonFilter::Week,
        DueSoonFilter::Week => DueSoonFilter::All,
    }
}

pub fn due_filter_title(filter: DueSoonFilter) -> &'static str {
    match filter {
        DueSoonFilter::All => "All",
        DueSoonFilter::Overdue => "Overdue",
        DueSoonFilter::Today => "Today",
        DueSoonFilter::Week => "This Week",
    }
}
