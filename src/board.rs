//! The board: application context and call surface.
//!
//! A `Board` owns one project store, one task store, the storage they persist
//! to and a queue of notifications for whoever renders the board. Every
//! mutation follows the same order: change memory, persist, queue
//! notifications, return. Renderers drain the queue when it suits them.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::db::{MemoryStore, Storage};
use crate::due::{due_soon_view, is_due_soon, is_overdue, BoardStats, DueSummary};
use crate::error::{BoardError, Result};
use crate::fields::{DueSoonFilter, Status, TaskFilter};
use crate::project::{NewProject, Project, ProjectStore};
use crate::task::{NewTask, Task, TaskChange, TaskPatch, TaskStore};
use crate::theme::Theme;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

/// Notifications queued for the renderer after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Render the task's card in its status column, replacing any existing card.
    EntryPlaced { task_id: String },
    /// Drop the task's card wherever it is.
    EntryRemoved { task_id: String },
    /// The set of tasks in a project changed.
    TasksChanged { project_id: String },
    /// Column counts and board stats for a project need refreshing.
    CountsChanged { project_id: String },
    /// A move settled; column placeholders need recomputing.
    EmptyStatesChanged { project_id: String },
    ProjectCreated { project_id: String },
    ProjectSwitched { project_id: String },
    ThemeChanged { theme: Theme },
    Notice { level: NoticeLevel, message: String },
}

pub struct Board {
    storage: Box<dyn Storage>,
    projects: ProjectStore,
    tasks: TaskStore,
    theme: Theme,
    config: Config,
    events: Vec<BoardEvent>,
}

impl Board {
    /// Restore a board from `storage`.
    pub fn open(storage: Box<dyn Storage>, config: Config) -> Self {
        let projects = ProjectStore::restore(storage.as_ref());
        let tasks = TaskStore::restore(storage.as_ref());

        for task in projects.orphans(&tasks) {
            warn!(
                task = %task.id,
                project = %task.project_id,
                title = %task.title,
                "project not found for task, keeping it hidden"
            );
        }
        let stale = projects.check_cached_membership(&tasks);
        if stale > 0 {
            debug!(stale, "rebuilt project membership from tasks");
        }

        let theme = Theme::load(storage.as_ref(), config.system_theme);
        info!(
            projects = projects.len(),
            tasks = tasks.len(),
            current = %projects.current_id(),
            %theme,
            "board initialised"
        );

        Board { storage, projects, tasks, theme, config, events: Vec::new() }
    }

    /// A board backed by memory only, with default configuration.
    pub fn in_memory() -> Self {
        Self::open(Box::new(MemoryStore::new()), Config::default())
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn current_project_id(&self) -> &str {
        self.projects.current_id()
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.projects.current()
    }

    /// Display name of a project, for tasks that may be orphaned.
    pub fn project_name(&self, project_id: &str) -> &str {
        self.projects.get(project_id).map_or("Unknown Project", |p| p.name.as_str())
    }

    /// Take every queued notification.
    pub fn drain_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[BoardEvent] {
        &self.events
    }

    fn emit(&mut self, event: BoardEvent) {
        self.events.push(event);
    }

    fn notice(&mut self, level: NoticeLevel, message: String) {
        self.emit(BoardEvent::Notice { level, message });
    }

    fn project_changed(&mut self, project_id: &str) {
        self.emit(BoardEvent::TasksChanged { project_id: project_id.to_string() });
        self.emit(BoardEvent::CountsChanged { project_id: project_id.to_string() });
    }

    fn persist_tasks(&mut self) {
        self.tasks.persist(self.storage.as_mut());
    }

    fn persist_projects(&mut self) {
        self.projects.persist(&self.tasks, self.storage.as_mut());
    }

    fn check_project(&self, project_id: &str) -> Result<()> {
        if self.projects.contains(project_id) {
            Ok(())
        } else {
            Err(BoardError::UnknownProject(project_id.to_string()))
        }
    }

    // ---------------------------------------------------------------------
    // Task mutations
    // ---------------------------------------------------------------------

    /// Create a task in the current project unless `data.project_id` says otherwise.
    ///
    /// Rejects a blank title or an unknown project. With `notify` a success
    /// notice is queued alongside the render notifications.
    pub fn create_task(&mut self, mut data: NewTask, notify: bool) -> Result<Task> {
        data.title = data.title.trim().to_string();
        if data.title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }
        if let Some(project_id) = &data.project_id {
            self.check_project(project_id)?;
        }

        let previous = data.id.as_deref().and_then(|id| self.tasks.get(id)).cloned();
        let current = self.projects.current_id().to_string();
        let task = self.tasks.create(data, &current, Utc::now());
        self.persist_tasks();
        self.persist_projects();

        if let Some(previous) = previous {
            if previous.status != task.status || previous.project_id != task.project_id {
                self.emit(BoardEvent::EntryRemoved { task_id: task.id.clone() });
            }
            if previous.project_id != task.project_id {
                self.project_changed(&previous.project_id);
            }
        }
        if task.project_id == current {
            self.emit(BoardEvent::EntryPlaced { task_id: task.id.clone() });
        }
        self.project_changed(&task.project_id);
        if notify {
            self.notice(NoticeLevel::Success, format!("Task \"{}\" created successfully", task.title));
        }
        Ok(task)
    }

    fn validate_patch(&self, patch: &TaskPatch) -> Result<()> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(BoardError::EmptyTitle);
        }
        if let Some(project_id) = &patch.project_id {
            self.check_project(project_id)?;
        }
        Ok(())
    }

    /// Apply an already validated patch and queue render notifications.
    fn apply_patch(&mut self, id: &str, patch: &TaskPatch) -> Option<TaskChange> {
        let change = self.tasks.update(id, patch, Utc::now())?;
        self.persist_tasks();
        if change.project_changed() {
            self.persist_projects();
        }

        let current = self.projects.current_id().to_string();
        // A card changing column is removed before it is placed again, so the
        // renderer never holds two cards or a card in a stale column.
        if change.status_changed() || change.project_changed() {
            self.emit(BoardEvent::EntryRemoved { task_id: change.task.id.clone() });
        }
        if change.task.project_id == current {
            self.emit(BoardEvent::EntryPlaced { task_id: change.task.id.clone() });
        }
        if change.project_changed() {
            self.project_changed(&change.previous_project);
        }
        self.project_changed(&change.task.project_id);
        Some(change)
    }

    /// Merge `patch` into a task. `Ok(None)` when the id is unknown.
    pub fn update_task(&mut self, id: &str, mut patch: TaskPatch) -> Result<Option<Task>> {
        self.validate_patch(&patch)?;
        if let Some(title) = patch.title.as_mut() {
            *title = title.trim().to_string();
        }
        let Some(change) = self.apply_patch(id, &patch) else {
            return Ok(None);
        };
        self.notice(
            NoticeLevel::Success,
            format!("Task \"{}\" updated successfully", change.task.title),
        );
        Ok(Some(change.task))
    }

    /// Move a task to another column. `None` when the id is unknown.
    pub fn move_task(&mut self, id: &str, status: Status) -> Option<Task> {
        let change = self.apply_patch(id, &TaskPatch::status(status))?;
        debug!(
            id,
            from = %change.previous_status,
            to = %change.task.status,
            "moved task"
        );
        self.emit(BoardEvent::EmptyStatesChanged { project_id: change.task.project_id.clone() });
        self.notice(
            NoticeLevel::Success,
            format!("Task \"{}\" moved to {}", change.task.title, status.title()),
        );
        Some(change.task)
    }

    /// Delete a task. False when the id is unknown.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let Some(task) = self.tasks.delete(id) else {
            return false;
        };
        self.persist_tasks();
        self.persist_projects();
        self.emit(BoardEvent::EntryRemoved { task_id: task.id.clone() });
        self.project_changed(&task.project_id);
        self.notice(NoticeLevel::Warning, format!("Task \"{}\" deleted", task.title));
        true
    }

    /// Delete every task on every project.
    pub fn clear_all_tasks(&mut self) {
        let removed: Vec<(String, String)> = self
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.project_id.clone()))
            .collect();
        self.tasks.clear();
        self.persist_tasks();
        self.persist_projects();

        let mut touched: Vec<String> = Vec::new();
        for (task_id, project_id) in removed {
            self.emit(BoardEvent::EntryRemoved { task_id });
            if !touched.contains(&project_id) {
                touched.push(project_id);
            }
        }
        for project_id in touched {
            self.project_changed(&project_id);
        }
        self.notice(NoticeLevel::Warning, "All tasks cleared".to_string());
    }

    /// The current project's tasks as a pretty JSON array.
    pub fn export_tasks(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.current_project_tasks())?)
    }

    /// Create every task in a JSON array. Records that do not decode or fail
    /// validation are skipped. Returns how many were created.
    pub fn import_tasks(&mut self, json: &str) -> Result<usize> {
        let records: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = records.len();
        let mut created = 0;
        for (index, value) in records.into_iter().enumerate() {
            let record: NewTask = match serde_json::from_value(value) {
                Ok(record) => record,
                Err(e) => {
                    warn!(index, error = %e, "skipping malformed imported task");
                    continue;
                }
            };
            match self.create_task(record, false) {
                Ok(_) => created += 1,
                Err(e) => warn!(error = %e, "skipping imported task"),
            }
        }
        info!(created, total, "imported tasks");
        self.notice(NoticeLevel::Success, format!("Imported {created} tasks successfully"));
        Ok(created)
    }

    // ---------------------------------------------------------------------
    // Projects
    // ---------------------------------------------------------------------

    /// Create a project. Rejects a blank name.
    pub fn create_project(&mut self, mut data: NewProject) -> Result<Project> {
        data.name = data.name.trim().to_string();
        if data.name.is_empty() {
            return Err(BoardError::EmptyProjectName);
        }
        let project = self.projects.create(data, Utc::now());
        self.persist_projects();
        self.emit(BoardEvent::ProjectCreated { project_id: project.id.clone() });
        self.notice(
            NoticeLevel::Success,
            format!("Project \"{}\" created successfully", project.name),
        );
        Ok(project)
    }

    /// Select a project. Unknown ids are a no-op returning false.
    pub fn switch_project(&mut self, id: &str) -> bool {
        if !self.projects.switch(id) {
            return false;
        }
        self.persist_projects();
        let name = self.project_name(id).to_string();
        info!(project = id, "switched project");
        self.emit(BoardEvent::ProjectSwitched { project_id: id.to_string() });
        self.emit(BoardEvent::CountsChanged { project_id: id.to_string() });
        self.notice(NoticeLevel::Info, format!("Switched to {name}"));
        true
    }

    /// Number of tasks in a project.
    pub fn task_count_for(&self, project_id: &str) -> usize {
        self.projects.task_count_for(project_id, &self.tasks)
    }

    // ---------------------------------------------------------------------
    // Queries, scoped to the current project
    // ---------------------------------------------------------------------

    pub fn current_project_tasks(&self) -> Vec<&Task> {
        self.tasks.in_project(self.projects.current_id()).collect()
    }

    pub fn tasks_by_status(&self, status: Status) -> Vec<&Task> {
        self.tasks.by_status(self.projects.current_id(), status)
    }

    pub fn overdue_tasks(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks.overdue(self.projects.current_id(), today)
    }

    pub fn due_soon_tasks(&self, today: NaiveDate, window_days: i64) -> Vec<&Task> {
        self.tasks.due_soon(self.projects.current_id(), today, window_days)
    }

    pub fn filter_by_search_term(&self, term: &str) -> Vec<&Task> {
        self.tasks.search(self.projects.current_id(), term)
    }

    /// Apply one of the quick filters. The due-soon filter uses the configured window.
    pub fn quick_filter(&self, filter: TaskFilter, today: NaiveDate) -> Vec<&Task> {
        let window = self.config.due_soon_days;
        let me = self.config.current_user.as_deref();
        self.tasks
            .in_project(self.projects.current_id())
            .filter(|t| match filter {
                TaskFilter::All => true,
                TaskFilter::AssignedToMe => me.is_some() && t.assignee.as_deref() == me,
                TaskFilter::Priority => t.priority.is_pressing(),
                TaskFilter::DueSoon => is_due_soon(t, today, window),
                TaskFilter::Overdue => is_overdue(t, today),
            })
            .collect()
    }

    pub fn board_stats(&self, today: NaiveDate) -> BoardStats {
        BoardStats::compute(self.tasks.in_project(self.projects.current_id()), today)
    }

    /// Tasks across all projects for the due-soon view, soonest first,
    /// narrowed to those matching `search`. A blank term keeps everything.
    pub fn due_soon_view(&self, today: NaiveDate, filter: DueSoonFilter, search: &str) -> Vec<&Task> {
        due_soon_view(self.tasks.iter().filter(|t| t.matches_search(search)), today, filter)
    }

    pub fn due_summary(&self, listed: &[&Task], today: NaiveDate) -> DueSummary {
        DueSummary::compute(listed, today, self.config.due_soon_days)
    }

    // ---------------------------------------------------------------------
    // Theme
    // ---------------------------------------------------------------------

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
        theme.save(self.storage.as_mut());
        self.emit(BoardEvent::ThemeChanged { theme });
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme.toggled();
        debug!(from = %self.theme, to = %theme, "toggling theme");
        self.set_theme(theme);
        theme
    }
}
