//! Render model of the board.
//!
//! `BoardView` is what a renderer keeps between frames: which cards sit in
//! which column for the viewed project, which of them the search box hides,
//! and which columns need an empty-state placeholder. It is kept in step with
//! the [`Board`] by applying the notifications the board queues.
//!
//! Placing a card always drops any existing card for the same task first, so a
//! task shows up at most once no matter how many notifications mention it.

use std::collections::HashSet;

use crate::board::{Board, BoardEvent};
use crate::fields::Status;
use crate::task::Task;

/// Placeholder shown in a column emptied by the search box.
pub const NO_MATCHES_MESSAGE: &str = "No matching tasks";

#[derive(Debug, Default, Clone)]
pub struct BoardView {
    project_id: String,
    columns: [Vec<String>; 5],
    search: String,
    hidden: HashSet<String>,
    stats_stale: bool,
}

impl BoardView {
    /// A view showing the board's current project.
    pub fn new(board: &Board) -> Self {
        let mut view = BoardView::default();
        view.load(board);
        view
    }

    /// Project whose cards are shown.
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Clear and render every task of the board's current project.
    pub fn load(&mut self, board: &Board) {
        for column in self.columns.iter_mut() {
            column.clear();
        }
        self.hidden.clear();
        self.project_id = board.current_project_id().to_string();
        for task in board.current_project_tasks() {
            self.place(task);
        }
        self.stats_stale = true;
    }

    fn place(&mut self, task: &Task) {
        self.remove(&task.id);
        self.columns[task.status.column()].push(task.id.clone());
        if task.matches_search(&self.search) {
            self.hidden.remove(&task.id);
        } else {
            self.hidden.insert(task.id.clone());
        }
    }

    fn remove(&mut self, task_id: &str) -> bool {
        let mut found = false;
        for column in self.columns.iter_mut() {
            let before = column.len();
            column.retain(|id| id != task_id);
            found |= column.len() != before;
        }
        self.hidden.remove(task_id);
        found
    }

    /// Bring the view up to date with `events`, which must come from `board`.
    pub fn apply(&mut self, events: &[BoardEvent], board: &Board) {
        for event in events {
            match event {
                BoardEvent::EntryPlaced { task_id } => match board.tasks().get(task_id) {
                    Some(task) if task.project_id == self.project_id => self.place(task),
                    _ => {
                        self.remove(task_id);
                    }
                },
                BoardEvent::EntryRemoved { task_id } => {
                    self.remove(task_id);
                }
                BoardEvent::ProjectSwitched { .. } => self.load(board),
                BoardEvent::TasksChanged { project_id }
                | BoardEvent::CountsChanged { project_id }
                | BoardEvent::EmptyStatesChanged { project_id } => {
                    if *project_id == self.project_id {
                        self.stats_stale = true;
                    }
                }
                BoardEvent::ProjectCreated { .. }
                | BoardEvent::ThemeChanged { .. }
                | BoardEvent::Notice { .. } => {}
            }
        }
    }

    /// Set the search term and recompute which cards are hidden.
    pub fn set_search(&mut self, term: &str, board: &Board) {
        self.search = term.to_string();
        self.hidden.clear();
        for id in self.columns.iter().flatten() {
            let visible = board.tasks().get(id).is_some_and(|t| t.matches_search(term));
            if !visible {
                self.hidden.insert(id.clone());
            }
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn is_searching(&self) -> bool {
        !self.search.trim().is_empty()
    }

    /// Every card in a column, hidden ones included.
    pub fn entries(&self, status: Status) -> &[String] {
        &self.columns[status.column()]
    }

    /// Cards in a column that pass the search.
    pub fn visible(&self, status: Status) -> Vec<&str> {
        self.columns[status.column()]
            .iter()
            .filter(|id| !self.hidden.contains(*id))
            .map(String::as_str)
            .collect()
    }

    pub fn visible_count(&self) -> usize {
        Status::ALL.iter().map(|s| self.visible(*s).len()).sum()
    }

    pub fn is_visible(&self, task_id: &str) -> bool {
        self.column_of(task_id).is_some() && !self.hidden.contains(task_id)
    }

    /// Whether a column has no visible cards.
    pub fn is_empty(&self, status: Status) -> bool {
        self.visible(status).is_empty()
    }

    /// Placeholder text for a column, if it needs one.
    pub fn empty_state(&self, status: Status) -> Option<&'static str> {
        if !self.is_empty(status) {
            None
        } else if self.is_searching() {
            Some(NO_MATCHES_MESSAGE)
        } else {
            Some(status.empty_message())
        }
    }

    /// Column currently holding a task's card.
    pub fn column_of(&self, task_id: &str) -> Option<Status> {
        Status::ALL
            .into_iter()
            .find(|s| self.columns[s.column()].iter().any(|id| id == task_id))
    }

    /// How many cards exist for a task. Never more than one.
    pub fn occurrences(&self, task_id: &str) -> usize {
        self.columns.iter().flatten().filter(|id| *id == task_id).count()
    }

    /// Whether counts or stats changed since the last call.
    pub fn take_stats_stale(&mut self) -> bool {
        std::mem::take(&mut self.stats_stale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskPatch};
    use proptest::prelude::*;

    fn new(title: &str) -> NewTask {
        NewTask { title: title.into(), ..Default::default() }
    }

    fn sync(view: &mut BoardView, board: &mut Board) {
        let events = board.drain_events();
        view.apply(&events, board);
    }

    #[test]
    fn fresh_board_shows_every_placeholder() {
        let board = Board::in_memory();
        let view = BoardView::new(&board);
        for status in Status::ALL {
            assert_eq!(view.empty_state(status), Some(status.empty_message()));
        }
    }

    #[test]
    fn moves_leave_one_card() {
        let mut board = Board::in_memory();
        let mut view = BoardView::new(&board);
        let task = board
            .create_task(NewTask { status: Some(Status::Todo), ..new("card") }, false)
            .unwrap();
        sync(&mut view, &mut board);
        assert_eq!(view.column_of(&task.id), Some(Status::Todo));
        assert_eq!(view.empty_state(Status::Todo), None);

        board.move_task(&task.id, Status::Done).unwrap();
        sync(&mut view, &mut board);
        assert_eq!(view.occurrences(&task.id), 1);
        assert_eq!(view.column_of(&task.id), Some(Status::Done));
        assert_eq!(view.empty_state(Status::Todo), Some("No tasks to do"));
    }

    #[test]
    fn applying_events_twice_is_harmless() {
        let mut board = Board::in_memory();
        let mut view = BoardView::new(&board);
        let task = board.create_task(new("twice"), false).unwrap();
        board.update_task(&task.id, TaskPatch::status(Status::Review)).unwrap();
        let events = board.drain_events();
        view.apply(&events, &board);
        view.apply(&events, &board);
        assert_eq!(view.occurrences(&task.id), 1);
        assert_eq!(view.column_of(&task.id), Some(Status::Review));
    }

    #[test]
    fn search_hides_cards_and_changes_placeholder() {
        let mut board = Board::in_memory();
        let mut view = BoardView::new(&board);
        let a = board.create_task(new("Homepage"), false).unwrap();
        let b = board
            .create_task(NewTask { status: Some(Status::Todo), ..new("Database") }, false)
            .unwrap();
        sync(&mut view, &mut board);

        view.set_search("home", &board);
        assert!(view.is_visible(&a.id));
        assert!(!view.is_visible(&b.id));
        assert_eq!(view.empty_state(Status::Todo), Some(NO_MATCHES_MESSAGE));
        assert_eq!(view.entries(Status::Todo).len(), 1);

        // Edits re-evaluate the search for the edited card.
        let patch = TaskPatch { title: Some("Home database".into()), ..Default::default() };
        board.update_task(&b.id, patch).unwrap();
        sync(&mut view, &mut board);
        assert!(view.is_visible(&b.id));

        view.set_search("", &board);
        assert_eq!(view.visible_count(), 2);
    }

    #[test]
    fn switching_projects_reloads() {
        let mut board = Board::in_memory();
        let mut view = BoardView::new(&board);
        board.create_task(new("p1 task"), false).unwrap();
        let other = board
            .create_task(NewTask { project_id: Some("project-2".into()), ..new("p2 task") }, false)
            .unwrap();
        sync(&mut view, &mut board);
        assert_eq!(view.visible_count(), 1);
        assert!(view.take_stats_stale());
        assert!(!view.take_stats_stale());

        board.switch_project("project-2");
        sync(&mut view, &mut board);
        assert_eq!(view.project_id(), "project-2");
        assert_eq!(view.visible(Status::Backlog), vec![other.id.as_str()]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Create(usize),
        Move(usize, usize),
        Retitle(usize),
        Delete(usize),
        Switch(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..5usize).prop_map(Op::Create),
            (0..8usize, 0..5usize).prop_map(|(t, s)| Op::Move(t, s)),
            (0..8usize).prop_map(Op::Retitle),
            (0..8usize).prop_map(Op::Delete),
            (0..2usize).prop_map(Op::Switch),
        ]
    }

    proptest! {
        #[test]
        fn view_mirrors_store_and_never_duplicates(ops in prop::collection::vec(op(), 1..40)) {
            let mut board = Board::in_memory();
            let mut view = BoardView::new(&board);
            let mut ids: Vec<String> = Vec::new();

            for op in ops {
                match op {
                    Op::Create(s) => {
                        let data = NewTask { status: Some(Status::ALL[s]), ..new("t") };
                        ids.push(board.create_task(data, false).unwrap().id);
                    }
                    Op::Move(t, s) => {
                        if let Some(id) = ids.get(t) {
                            board.move_task(id, Status::ALL[s]);
                        }
                    }
                    Op::Retitle(t) => {
                        if let Some(id) = ids.get(t) {
                            let patch = TaskPatch { title: Some(format!("t{t}")), ..Default::default() };
                            board.update_task(id, patch).unwrap();
                        }
                    }
                    Op::Delete(t) => {
                        if let Some(id) = ids.get(t) {
                            board.delete_task(id);
                        }
                    }
                    Op::Switch(p) => {
                        board.switch_project(["project-1", "project-2"][p]);
                    }
                }
                sync(&mut view, &mut board);

                for status in Status::ALL {
                    let mut shown: Vec<&str> = view.entries(status).iter().map(String::as_str).collect();
                    let mut stored: Vec<&str> = board.tasks_by_status(status).iter().map(|t| t.id.as_str()).collect();
                    shown.sort();
                    stored.sort();
                    prop_assert_eq!(shown, stored);
                }
                for id in &ids {
                    prop_assert!(view.occurrences(id) <= 1);
                }
            }
        }
    }
}
