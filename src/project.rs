//! Projects and the current-project selection.
//!
//! Projects group tasks on the board. The store owns the project records and
//! which one is selected; how many tasks a project has is always asked of the
//! `TaskStore`. The membership list written alongside each project is a cache
//! for readers of the snapshot and is only compared against the task store on
//! load, never trusted.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::db::{Storage, CURRENT_PROJECT_KEY, PROJECTS_KEY};
use crate::task::{generate_id, Task, TaskStore};

/// Colors a new project may be given when none is supplied.
pub const PROJECT_PALETTE: [&str; 7] = [
    "#3498db", "#e74c3c", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#34495e",
];

/// A named collection of tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub id: Option<String>,
    pub name: String,
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Persisted form of a project: the record plus its cached task ids.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectRecord {
    #[serde(flatten)]
    project: Project,
    #[serde(default)]
    tasks: Vec<String>,
}

/// Pick a color from [`PROJECT_PALETTE`].
pub fn random_color() -> String {
    PROJECT_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PROJECT_PALETTE[0])
        .to_string()
}

/// The projects a fresh board starts with.
pub fn default_projects(now: DateTime<Utc>) -> Vec<Project> {
    [
        ("project-1", "Website Redesign", "#3498db", "Complete redesign of company website"),
        ("project-2", "Mobile App", "#e74c3c", "New mobile application development"),
        ("project-3", "Marketing Campaign", "#2ecc71", "Q2 marketing campaign planning"),
        ("project-4", "Product Launch", "#f39c12", "New product launch preparation"),
    ]
    .into_iter()
    .map(|(id, name, color, description)| Project {
        id: id.into(),
        name: name.into(),
        color: color.into(),
        description: description.into(),
        created_at: now,
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct ProjectStore {
    projects: Vec<Project>,
    current: String,
    cached_members: HashMap<String, Vec<String>>,
}

impl ProjectStore {
    /// Store holding `projects`, with the first one selected.
    pub fn with_projects(projects: Vec<Project>) -> Self {
        let current = projects.first().map(|p| p.id.clone()).unwrap_or_default();
        ProjectStore { projects, current, cached_members: HashMap::new() }
    }

    /// Store seeded with [`default_projects`].
    pub fn seeded() -> Self {
        Self::with_projects(default_projects(Utc::now()))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Id of the selected project.
    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> Option<&Project> {
        self.get(&self.current)
    }

    /// Add a project, filling in id and color. Name validation is the caller's job.
    pub fn create(&mut self, data: NewProject, now: DateTime<Utc>) -> Project {
        let project = Project {
            id: data.id.unwrap_or_else(|| generate_id("project")),
            name: data.name,
            color: data.color.unwrap_or_else(random_color),
            description: data.description.unwrap_or_default(),
            created_at: now,
        };
        match self.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => {
                warn!(id = %project.id, "project id already exists, replacing record");
                *existing = project.clone();
            }
            None => self.projects.push(project.clone()),
        }
        if self.current.is_empty() {
            self.current = project.id.clone();
        }
        project
    }

    /// Select a project. Unknown ids are ignored and return false.
    pub fn switch(&mut self, id: &str) -> bool {
        if !self.contains(id) {
            debug!(id, "ignoring switch to unknown project");
            return false;
        }
        self.current = id.to_string();
        true
    }

    /// Number of tasks in a project, derived from the task store.
    pub fn task_count_for(&self, project_id: &str, tasks: &TaskStore) -> usize {
        tasks.member_count(project_id)
    }

    /// Tasks whose project is not in this store.
    pub fn orphans<'a>(&self, tasks: &'a TaskStore) -> Vec<&'a Task> {
        tasks.iter().filter(|t| !self.contains(&t.project_id)).collect()
    }

    /// Compare the membership lists read from storage with the live index.
    /// Returns how many projects disagree; the live index always wins.
    pub fn check_cached_membership(&self, tasks: &TaskStore) -> usize {
        let mut mismatched = 0;
        for project in &self.projects {
            let Some(cached) = self.cached_members.get(&project.id) else { continue };
            let mut cached = cached.clone();
            cached.sort();
            let live = tasks.member_ids(&project.id);
            if cached != live {
                debug!(
                    project = %project.id,
                    cached = cached.len(),
                    live = live.len(),
                    "stored membership list is stale, using task store"
                );
                mismatched += 1;
            }
        }
        mismatched
    }

    /// Serialise as `[id, project]` pairs, each embedding its task ids.
    pub fn to_snapshot(&self, tasks: &TaskStore) -> serde_json::Result<String> {
        let records: Vec<(&str, ProjectRecord)> = self
            .projects
            .iter()
            .map(|p| {
                let record = ProjectRecord { project: p.clone(), tasks: tasks.member_ids(&p.id) };
                (p.id.as_str(), record)
            })
            .collect();
        serde_json::to_string(&records)
    }

    pub fn from_snapshot(raw: &str) -> serde_json::Result<Self> {
        let pairs: Vec<(String, ProjectRecord)> = serde_json::from_str(raw)?;
        let mut cached_members = HashMap::new();
        let mut projects: Vec<Project> = Vec::with_capacity(pairs.len());
        for (id, mut record) in pairs {
            record.project.id = id.clone();
            cached_members.insert(id.clone(), record.tasks);
            match projects.iter_mut().find(|p| p.id == id) {
                Some(existing) => *existing = record.project,
                None => projects.push(record.project),
            }
        }
        let mut store = Self::with_projects(projects);
        store.cached_members = cached_members;
        Ok(store)
    }

    /// Write the project list and the current pointer. Failures are logged.
    pub fn persist(&self, tasks: &TaskStore, storage: &mut dyn Storage) -> bool {
        let raw = match self.to_snapshot(tasks) {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "error serialising projects");
                return false;
            }
        };
        let mut ok = true;
        if let Err(e) = storage.set(PROJECTS_KEY, &raw) {
            error!(error = %e, "error saving projects to storage");
            ok = false;
        }
        if let Err(e) = storage.set(CURRENT_PROJECT_KEY, &self.current) {
            error!(error = %e, "error saving current project to storage");
            ok = false;
        }
        ok
    }

    /// Load projects and the current pointer. Seeds the defaults when nothing
    /// was stored or the stored data cannot be read.
    pub fn restore(storage: &dyn Storage) -> Self {
        let mut store = match storage.get(PROJECTS_KEY) {
            Ok(Some(raw)) => match Self::from_snapshot(&raw) {
                Ok(store) if !store.is_empty() => {
                    info!(count = store.len(), "loaded projects from storage");
                    store
                }
                Ok(_) => {
                    warn!("stored project list is empty, seeding defaults");
                    Self::seeded()
                }
                Err(e) => {
                    error!(error = %e, "error parsing stored projects, seeding defaults");
                    Self::seeded()
                }
            },
            Ok(None) => {
                debug!("no stored projects found, seeding defaults");
                Self::seeded()
            }
            Err(e) => {
                error!(error = %e, "error loading projects from storage, seeding defaults");
                Self::seeded()
            }
        };

        match storage.get(CURRENT_PROJECT_KEY) {
            Ok(Some(id)) => {
                let id = id.trim();
                if !store.switch(id) {
                    warn!(id, "stored current project is unknown, keeping {}", store.current);
                }
            }
            Ok(None) => {}
            Err(e) => error!(error = %e, "error loading current project"),
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::task::NewTask;

    #[test]
    fn seeded_store_starts_on_first_default() {
        let store = ProjectStore::seeded();
        assert_eq!(store.len(), 4);
        assert_eq!(store.current_id(), "project-1");
        assert_eq!(store.current().unwrap().name, "Website Redesign");
    }

    #[test]
    fn create_fills_id_and_palette_color() {
        let mut store = ProjectStore::seeded();
        let project = store.create(NewProject { name: "Ops".into(), ..Default::default() }, Utc::now());
        assert!(project.id.starts_with("project-"));
        assert!(PROJECT_PALETTE.contains(&project.color.as_str()));
        assert_eq!(project.description, "");
        assert_eq!(store.len(), 5);
        // Creating does not change the selection.
        assert_eq!(store.current_id(), "project-1");
    }

    #[test]
    fn switch_ignores_unknown_ids() {
        let mut store = ProjectStore::seeded();
        assert!(!store.switch("project-99"));
        assert_eq!(store.current_id(), "project-1");
        assert!(store.switch("project-3"));
        assert_eq!(store.current_id(), "project-3");
    }

    #[test]
    fn restore_round_trips_projects_and_pointer() {
        let mut projects = ProjectStore::seeded();
        projects.create(
            NewProject { id: Some("ops".into()), name: "Ops".into(), color: Some("#000".into()), ..Default::default() },
            Utc::now(),
        );
        projects.switch("ops");
        let mut tasks = TaskStore::new();
        tasks.create(NewTask { title: "t".into(), ..Default::default() }, "ops", Utc::now());

        let mut storage = MemoryStore::new();
        assert!(projects.persist(&tasks, &mut storage));
        let restored = ProjectStore::restore(&storage);

        let before: Vec<_> = projects.iter().cloned().collect();
        let after: Vec<_> = restored.iter().cloned().collect();
        assert_eq!(before, after);
        assert_eq!(restored.current_id(), "ops");
        assert_eq!(restored.check_cached_membership(&tasks), 0);
    }

    #[test]
    fn stale_membership_cache_is_detected_not_trusted() {
        let projects = ProjectStore::seeded();
        let mut tasks = TaskStore::new();
        tasks.create(NewTask { title: "t".into(), ..Default::default() }, "project-1", Utc::now());
        let mut storage = MemoryStore::new();
        projects.persist(&tasks, &mut storage);

        let restored = ProjectStore::restore(&storage);
        assert_eq!(restored.check_cached_membership(&TaskStore::new()), 1);
        assert_eq!(restored.task_count_for("project-1", &TaskStore::new()), 0);
    }

    #[test]
    fn restore_seeds_defaults_and_ignores_unknown_pointer() {
        let mut storage = MemoryStore::new();
        storage.set(CURRENT_PROJECT_KEY, "project-42").unwrap();
        let store = ProjectStore::restore(&storage);
        assert_eq!(store.len(), 4);
        assert_eq!(store.current_id(), "project-1");

        storage.set(PROJECTS_KEY, "not json").unwrap();
        assert_eq!(ProjectStore::restore(&storage).len(), 4);
    }

    #[test]
    fn orphans_are_reported() {
        let projects = ProjectStore::seeded();
        let mut tasks = TaskStore::new();
        tasks.create(NewTask { title: "lost".into(), ..Default::default() }, "project-gone", Utc::now());
        tasks.create(NewTask { title: "fine".into(), ..Default::default() }, "project-2", Utc::now());
        let orphans = projects.orphans(&tasks);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].title, "lost");
    }
}
