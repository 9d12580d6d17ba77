//! Task data structure and the task store.
//!
//! `TaskStore` is the single source of truth for which tasks exist. It also
//! keeps the per-project membership index, so a project's task count is always
//! derived from the tasks themselves and never stored independently.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info, warn};

use crate::db::{Storage, TASKS_KEY};
use crate::due::{is_due_soon, is_overdue};
use crate::fields::{Priority, Status};
use crate::labels::split_and_normalise_labels;

/// A unit of work on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    pub project_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a task. Everything but the title is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<Status>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "blank_date_as_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The mutable fields of a task. `None` leaves a field untouched; for the
/// optional fields `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub assignee: Option<Option<String>>,
    pub due_date: Option<Option<NaiveDate>>,
    /// Replaces the label set.
    pub labels: Option<Vec<String>>,
    pub add_labels: Vec<String>,
    pub remove_labels: Vec<String>,
    pub project_id: Option<String>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    pub fn status(status: Status) -> Self {
        TaskPatch { status: Some(status), ..Default::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }
}

/// Outcome of a successful update.
#[derive(Debug, Clone)]
pub struct TaskChange {
    pub task: Task,
    pub previous_status: Status,
    pub previous_project: String,
}

impl TaskChange {
    pub fn status_changed(&self) -> bool {
        self.task.status != self.previous_status
    }

    pub fn project_changed(&self) -> bool {
        self.task.project_id != self.previous_project
    }
}

/// Generate a fresh identifier with the given prefix.
pub fn generate_id(prefix: &str) -> String {
    format!("{}-{}", prefix, ulid::Ulid::new().to_string().to_lowercase())
}

impl Task {
    /// Build a task from creation input, filling in defaults.
    pub fn from_new(data: NewTask, default_project: &str, now: DateTime<Utc>) -> Self {
        Task {
            id: data.id.unwrap_or_else(|| generate_id("task")),
            title: data.title,
            description: data.description.unwrap_or_default(),
            status: data.status.unwrap_or_default(),
            priority: data.priority.unwrap_or_default(),
            assignee: data.assignee.filter(|a| !a.trim().is_empty()),
            due_date: data.due_date,
            labels: split_and_normalise_labels(&data.labels),
            project_id: data.project_id.unwrap_or_else(|| default_project.to_string()),
            created_at: data.created_at.unwrap_or(now),
            updated_at: now,
        }
    }

    /// Case-insensitive substring match over title, description and labels.
    /// A blank term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.labels.iter().any(|l| l.to_lowercase().contains(&needle))
    }

    fn apply(&mut self, patch: &TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignee) = &patch.assignee {
            self.assignee = assignee.clone().filter(|a| !a.trim().is_empty());
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
        if let Some(labels) = &patch.labels {
            self.labels = split_and_normalise_labels(labels);
        }
        if !patch.add_labels.is_empty() {
            let mut all = self.labels.clone();
            all.extend(patch.add_labels.iter().cloned());
            self.labels = split_and_normalise_labels(&all);
        }
        if !patch.remove_labels.is_empty() {
            let drop = split_and_normalise_labels(&patch.remove_labels);
            self.labels.retain(|l| !drop.contains(l));
        }
        if let Some(project_id) = &patch.project_id {
            self.project_id = project_id.clone();
        }
        self.updated_at = now;
    }
}

/// Authoritative, insertion-ordered task collection.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
    members: HashMap<String, BTreeSet<String>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from tasks in order. A repeated id keeps its first
    /// position and its last value.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut store = TaskStore::new();
        for task in tasks {
            store.insert(task);
        }
        store
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    fn index_add(&mut self, task: &Task) {
        self.members
            .entry(task.project_id.clone())
            .or_default()
            .insert(task.id.clone());
    }

    fn index_remove(&mut self, project_id: &str, task_id: &str) {
        if let Some(set) = self.members.get_mut(project_id) {
            set.remove(task_id);
            if set.is_empty() {
                self.members.remove(project_id);
            }
        }
    }

    /// Insert or replace by id, keeping the membership index in step.
    fn insert(&mut self, task: Task) {
        match self.position(&task.id) {
            Some(i) => {
                let old_project = self.tasks[i].project_id.clone();
                self.index_remove(&old_project, &task.id);
                self.index_add(&task);
                self.tasks[i] = task;
            }
            None => {
                self.index_add(&task);
                self.tasks.push(task);
            }
        }
    }

    /// Create a task, defaulting its project to `default_project`.
    ///
    /// Validation is the caller's job; an id that already exists is replaced in place.
    pub fn create(&mut self, data: NewTask, default_project: &str, now: DateTime<Utc>) -> Task {
        let task = Task::from_new(data, default_project, now);
        if self.contains(&task.id) {
            warn!(id = %task.id, "task id already exists, replacing record");
        }
        debug!(id = %task.id, title = %task.title, labels = ?task.labels, "creating task");
        self.insert(task.clone());
        task
    }

    /// Merge `patch` into the task with `id`. `None` when the id is unknown.
    pub fn update(&mut self, id: &str, patch: &TaskPatch, now: DateTime<Utc>) -> Option<TaskChange> {
        let Some(i) = self.position(id) else {
            warn!(id, "task not found for update");
            return None;
        };
        let previous_status = self.tasks[i].status;
        let previous_project = self.tasks[i].project_id.clone();
        self.tasks[i].apply(patch, now);
        let task = self.tasks[i].clone();
        if task.project_id != previous_project {
            self.index_remove(&previous_project, id);
            self.index_add(&task);
        }
        Some(TaskChange { task, previous_status, previous_project })
    }

    /// Remove a task. `None` when the id is unknown.
    pub fn delete(&mut self, id: &str) -> Option<Task> {
        let Some(i) = self.position(id) else {
            warn!(id, "task not found for deletion");
            return None;
        };
        let task = self.tasks.remove(i);
        self.index_remove(&task.project_id, id);
        Some(task)
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.members.clear();
    }

    /// Ids of the tasks belonging to a project.
    pub fn member_ids(&self, project_id: &str) -> Vec<String> {
        self.members
            .get(project_id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn member_count(&self, project_id: &str) -> usize {
        self.members.get(project_id).map_or(0, BTreeSet::len)
    }

    /// Tasks of one project. Items borrow the store only, so the id may be a temporary.
    pub fn in_project<'a, 'p>(&'a self, project_id: &'p str) -> impl Iterator<Item = &'a Task> + 'p
    where
        'a: 'p,
    {
        self.tasks.iter().filter(move |t| t.project_id == project_id)
    }

    pub fn by_status(&self, project_id: &str, status: Status) -> Vec<&Task> {
        self.in_project(project_id).filter(|t| t.status == status).collect()
    }

    pub fn overdue(&self, project_id: &str, today: NaiveDate) -> Vec<&Task> {
        self.in_project(project_id).filter(|t| is_overdue(t, today)).collect()
    }

    pub fn due_soon(&self, project_id: &str, today: NaiveDate, window_days: i64) -> Vec<&Task> {
        self.in_project(project_id)
            .filter(|t| is_due_soon(t, today, window_days))
            .collect()
    }

    pub fn search(&self, project_id: &str, term: &str) -> Vec<&Task> {
        self.in_project(project_id).filter(|t| t.matches_search(term)).collect()
    }

    /// Serialise as an ordered list of `[id, task]` pairs.
    pub fn to_snapshot(&self) -> serde_json::Result<String> {
        let pairs: Vec<(&str, &Task)> = self.tasks.iter().map(|t| (t.id.as_str(), t)).collect();
        serde_json::to_string(&pairs)
    }

    pub fn from_snapshot(raw: &str) -> serde_json::Result<Self> {
        let pairs: Vec<(String, Task)> = serde_json::from_str(raw)?;
        Ok(Self::from_tasks(pairs.into_iter().map(|(id, mut task)| {
            if task.id != id {
                warn!(key = %id, id = %task.id, "task snapshot key disagrees with record id");
                task.id = id;
            }
            task
        })))
    }

    /// Write the whole collection. Failures are logged; memory stays authoritative.
    pub fn persist(&self, storage: &mut dyn Storage) -> bool {
        let raw = match self.to_snapshot() {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "error serialising tasks");
                return false;
            }
        };
        match storage.set(TASKS_KEY, &raw) {
            Ok(()) => {
                debug!(count = self.len(), "saved tasks to storage");
                true
            }
            Err(e) => {
                error!(error = %e, "error saving tasks to storage");
                false
            }
        }
    }

    /// Load the collection, starting empty on any read or parse failure.
    pub fn restore(storage: &dyn Storage) -> Self {
        match storage.get(TASKS_KEY) {
            Ok(Some(raw)) => match Self::from_snapshot(&raw) {
                Ok(store) => {
                    info!(count = store.len(), "loaded tasks from storage");
                    store
                }
                Err(e) => {
                    error!(error = %e, "error parsing stored tasks, starting fresh");
                    Self::default()
                }
            },
            Ok(None) => {
                debug!("no stored tasks found");
                Self::default()
            }
            Err(e) => {
                error!(error = %e, "error loading tasks from storage, starting fresh");
                Self::default()
            }
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Accepts `YYYY-MM-DD`, a full timestamp (date part used), blank or null.
fn blank_date_as_none<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    let Some(raw) = raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let day = raw.get(..10).unwrap_or(raw.as_str());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(serde::de::Error::custom)
}
