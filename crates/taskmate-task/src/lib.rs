//! The canonical task collection. `TaskStore` owns the in-memory `Vec<Task>`
//! and is the single source of truth: every view projection reads from it and
//! every mutation goes through its methods, each of which persists to the
//! backing `StateStore` before returning, so a reload never loses the last
//! applied change.

pub mod rules;

use anyhow::Result;
use taskmate_core::{
    storage::{StateStore, StateStoreError},
    tasks::{Task, TaskDraft, TaskId, TaskStatus},
};
use thiserror::Error;
use tracing::{instrument, warn};

/// Storage key holding the serialized task collection.
pub const TASKS_KEY: &str = "taskmate_data";

/// Errors a caller can act on; everything else surfaces as `anyhow`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskStoreError {
    #[error("task title must not be empty")]
    EmptyTitle,
}

/// Task collection backed by a `StateStore`.
pub struct TaskStore<S: StateStore> {
    store: S,
    tasks: Vec<Task>,
}

impl<S: StateStore> TaskStore<S> {
    /// Opens the store, loading any persisted collection. Absent or corrupt
    /// data falls back to an empty collection so the app always starts in a
    /// usable state.
    pub fn open(store: S) -> Self {
        let tasks = match store.get(TASKS_KEY) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(tasks) => tasks,
                Err(err) => {
                    warn!("discarding corrupt task data: {err}");
                    Vec::new()
                }
            },
            Err(StateStoreError::NotFound { .. }) => Vec::new(),
            Err(err) => {
                warn!("failed to read task data, starting empty: {err}");
                Vec::new()
            }
        };
        Self { store, tasks }
    }

    /// Creates a task from the draft. A draft whose id matches an existing
    /// task replaces it in place (same slot, same collection length); the
    /// edit path and the create path share this entry point. New tasks are
    /// prepended so the collection stays newest-first.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        if draft.title.trim().is_empty() {
            return Err(TaskStoreError::EmptyTitle.into());
        }

        let task = Task {
            id: draft.id.unwrap_or_else(TaskId::generate),
            title: draft.title,
            priority: draft.priority,
            notes: draft.notes,
            due_date: draft.due_date,
            status: TaskStatus::Todo,
            subtasks: draft.subtasks,
            created_at: chrono::Utc::now(),
        };

        match self.tasks.iter().position(|t| t.id == task.id) {
            Some(slot) => self.tasks[slot] = task.clone(),
            None => self.tasks.insert(0, task.clone()),
        }

        self.persist()?;
        Ok(task)
    }

    /// Removes the task with the given id. Unknown ids are silently ignored;
    /// nothing is persisted unless something was actually removed.
    #[instrument(skip(self))]
    pub fn delete(&mut self, id: &TaskId) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != *id);
        if self.tasks.len() != before {
            self.persist()?;
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    /// Sets the status unconditionally when the task exists (any status to
    /// any status, including the one it already has), and persists the
    /// write. A stale id is a silent no-op.
    #[instrument(skip(self))]
    pub fn set_status(&mut self, id: &TaskId, status: TaskStatus) -> Result<()> {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
            task.status = status;
            self.persist()?;
        }
        Ok(())
    }

    /// List-view convenience: flips between `done` and `todo`. A `doing`
    /// task counts as not done and flips to `done`.
    #[instrument(skip(self))]
    pub fn toggle_done(&mut self, id: &TaskId) -> Result<()> {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
            task.status = if task.status == TaskStatus::Done {
                TaskStatus::Todo
            } else {
                TaskStatus::Done
            };
            self.persist()?;
        }
        Ok(())
    }

    /// Flips one checklist step. Unknown ids and out-of-range indexes are
    /// silent no-ops.
    #[instrument(skip(self))]
    pub fn toggle_subtask(&mut self, id: &TaskId, index: usize) -> Result<()> {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) {
            if let Some(step) = task.subtasks.get_mut(index) {
                step.done = !step.done;
                self.persist()?;
            }
        }
        Ok(())
    }

    /// Snapshot of the full collection, newest-created-first for new tasks
    /// (edited tasks keep their original slot).
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    fn persist(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.tasks)?;
        self.store.put(TASKS_KEY, &bytes)?;
        Ok(())
    }
}
