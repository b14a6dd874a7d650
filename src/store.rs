// Task collection ownership, lifecycle and persistence

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec;
use crate::error::{Error, Result};
use crate::kv::KvStore;
use crate::model::{Completion, Task, TaskStatus};

/// Fixed key the whole task collection is persisted under.
pub const STORE_KEY: &str = "tasks";

/// Owns the ordered task collection. All mutation goes through its
/// methods; every mutating operation writes the full collection back to
/// the key-value store before returning.
pub struct TaskStore<K: KvStore> {
    kv: K,
    tasks: Vec<Task>,
}

impl<K: KvStore> TaskStore<K> {
    /// Open a store over the given backend, loading whatever collection
    /// it currently holds.
    pub fn open(kv: K) -> Result<Self> {
        let mut store = Self { kv, tasks: Vec::new() };
        store.load()?;
        Ok(store)
    }

    /// Create a task in the scheduled stage and persist it.
    ///
    /// The title must be non-empty after trimming and the due date must
    /// parse as a `YYYY-MM-DD` calendar date.
    pub fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
        due_date: &str,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title is required".to_string()));
        }

        let due = due_date.trim();
        let due_date = due.parse::<NaiveDate>().map_err(|_| {
            Error::Validation(format!("invalid due date: {due} (expected YYYY-MM-DD)"))
        })?;

        let task = Task {
            id: Uuid::now_v7().to_string(),
            title: title.to_string(),
            description: description.unwrap_or_default().trim().to_string(),
            due_date,
            status: TaskStatus::Scheduled,
            created_at: Utc::now(),
            completed_at: None,
        };

        debug!(id = %task.id, title = %task.title, "creating task");
        self.tasks.push(task.clone());
        self.save()?;

        Ok(task)
    }

    /// Move a task to the given status, which must be the immediate
    /// successor of its current one. Entering completed stamps
    /// `completed_at`; no other field changes.
    pub fn advance_status(&mut self, id: &str, target: TaskStatus) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        if !task.status.can_advance_to(target) {
            return Err(Error::InvalidTransition { from: task.status, to: target });
        }

        task.status = target;
        if target == TaskStatus::Completed {
            task.completed_at = Some(Utc::now());
        }

        let updated = task.clone();
        debug!(id = %updated.id, status = %updated.status, "advanced task");
        self.save()?;

        Ok(updated)
    }

    /// Remove a task permanently. Deleting the same id twice surfaces
    /// `NotFound` the second time.
    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let removed = self.tasks.remove(index);
        debug!(id = %removed.id, "deleted task");
        self.save()?;

        Ok(())
    }

    /// Tasks with the given status, in creation order. Pure read.
    pub fn list_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.status == status).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks in creation order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// On-time/late classification for the completed task with this id.
    pub fn classify_completion(&self, id: &str) -> Result<Completion> {
        let task = self.get(id).ok_or_else(|| Error::NotFound(id.to_string()))?;
        task.classify_completion()
    }

    /// Write the full collection to the backend under the fixed key.
    pub fn save(&mut self) -> Result<()> {
        let document = codec::encode(&self.tasks)?;
        self.kv.set(STORE_KEY, &document)?;
        debug!(count = self.tasks.len(), "saved task collection");
        Ok(())
    }

    /// Replace the in-memory collection with whatever the backend holds.
    ///
    /// An absent key is a fresh store. An unparseable document is logged
    /// and replaced by an empty collection so the application stays
    /// usable after corrupted storage; the stored document is left
    /// untouched.
    pub fn load(&mut self) -> Result<()> {
        let document = match self.kv.get(STORE_KEY)? {
            Some(document) => document,
            None => {
                self.tasks = Vec::new();
                return Ok(());
            }
        };

        match codec::decode(&document) {
            Ok(tasks) => {
                info!(count = tasks.len(), "loaded task collection");
                self.tasks = tasks;
            }
            Err(err) => {
                warn!(error = %err, "persisted task collection is corrupt, starting empty");
                self.tasks = Vec::new();
            }
        }

        Ok(())
    }
}
