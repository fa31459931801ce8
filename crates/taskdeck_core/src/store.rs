use crate::clock;
use crate::error::AppError;
use crate::model::{NewTask, Task};
use crate::storage::{FileStorage, KeyValueStorage};
use log::warn;
use std::sync::atomic::{AtomicI64, Ordering};

/// Storage key holding the serialized task collection.
pub const STORAGE_KEY: &str = "todos";

/// Result of a mutation that targets an existing task. `NotFound` is a
/// legitimate outcome, not an error: the store is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Applied,
    NotFound,
}

/// Sole authority over durable task state. Every mutation reads the full
/// collection, applies one change and writes the full collection back;
/// there is no per-record addressing. Stored order is most-recent-first
/// and update/delete never reorder.
///
/// Overlapping mutations from multiple callers can lose an update (each
/// read sees the pre-mutation snapshot). The store assumes one active
/// caller at a time.
pub struct TaskStore {
    storage: Box<dyn KeyValueStorage>,
    last_issued_ms: AtomicI64,
}

impl TaskStore {
    pub fn new(storage: Box<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            last_issued_ms: AtomicI64::new(0),
        }
    }

    pub fn open_default() -> Result<Self, AppError> {
        Ok(Self::new(Box::new(FileStorage::open_default()?)))
    }

    /// Returns the stored collection, most-recently-added first. An absent
    /// key is an empty collection; so is an unreadable or unparsable blob,
    /// which is logged and swallowed rather than propagated.
    pub fn load_all(&self) -> Vec<Task> {
        let blob = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!("failed to read task collection: {err}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&blob) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("stored task collection is corrupt, starting empty: {err}");
                Vec::new()
            }
        }
    }

    /// Creates a task from `draft`, assigning its identity and prepending
    /// it to the collection. On `Err` nothing was saved.
    pub fn add(&self, draft: NewTask) -> Result<Task, AppError> {
        let text = draft.text.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("text is required"));
        }

        let stamp = self.next_timestamp_ms();
        let task = Task {
            id: stamp,
            text: text.to_string(),
            // New tasks always start open, whatever the caller sent.
            completed: false,
            priority: draft.priority,
            created_at: stamp,
            deadline: draft.deadline,
            notification_id: draft.notification_id,
        };

        let mut tasks = self.load_all();
        tasks.insert(0, task.clone());
        self.persist(&tasks)?;

        Ok(task)
    }

    /// Replaces the stored record whose id matches `task.id`, preserving
    /// its position. Callers construct the full replacement; there is no
    /// partial patch.
    pub fn update(&self, task: Task) -> Result<Mutation, AppError> {
        let mut tasks = self.load_all();
        let Some(slot) = tasks.iter_mut().find(|stored| stored.id == task.id) else {
            return Ok(Mutation::NotFound);
        };

        *slot = task;
        self.persist(&tasks)?;
        Ok(Mutation::Applied)
    }

    /// Removes the task with `id`. Deleting an id that is already gone is
    /// `NotFound`, with the stored collection untouched.
    pub fn delete(&self, id: i64) -> Result<Mutation, AppError> {
        let mut tasks = self.load_all();
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        if tasks.len() == before {
            return Ok(Mutation::NotFound);
        }

        self.persist(&tasks)?;
        Ok(Mutation::Applied)
    }

    /// Read-only lookup within the current collection snapshot.
    pub fn get(&self, id: i64) -> Option<Task> {
        self.load_all().into_iter().find(|task| task.id == id)
    }

    fn persist(&self, tasks: &[Task]) -> Result<(), AppError> {
        let blob = serde_json::to_string(tasks)?;
        self.storage.set_item(STORAGE_KEY, &blob)
    }

    /// Epoch-ms timestamp used for both id and created_at. Strictly
    /// increasing per store instance so rapid adds never collide on id.
    fn next_timestamp_ms(&self) -> i64 {
        let now = clock::now_ms();
        let mut prev = self.last_issued_ms.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last_issued_ms.compare_exchange(
                prev,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
