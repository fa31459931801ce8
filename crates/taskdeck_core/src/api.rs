//! Composed operations tying the Task Store and the Deadline Notifier
//! together, the way the UI layer drives them: store mutations that add or
//! remove a deadline trigger the matching schedule/cancel call.

use crate::error::AppError;
use crate::model::{NewTask, Priority, Task};
use crate::notify::DeadlineNotifier;
use crate::store::{Mutation, TaskStore};
use log::warn;

/// Adds a task and, when it carries a future deadline, schedules its alert
/// and persists the returned handle on the task.
pub fn add_task(
    store: &TaskStore,
    notifier: &DeadlineNotifier,
    text: &str,
    priority: Priority,
    deadline: Option<i64>,
) -> Result<Task, AppError> {
    let mut task = store.add(NewTask {
        text: text.to_string(),
        priority,
        deadline,
        notification_id: None,
    })?;

    if let Some(deadline_ms) = task.deadline
        && let Some(handle) = notifier.schedule(task.id, &task.text, deadline_ms)
    {
        task.notification_id = Some(handle);
        if let Mutation::NotFound = store.update(task.clone())? {
            // The task was just written; a concurrent delete is the only
            // way to get here.
            warn!("task {} vanished before its alert handle was saved", task.id);
        }
    }

    Ok(task)
}

/// Flips a task's completed flag. Completing a task cancels its pending
/// alert and clears the stored handle; reopening never reschedules.
pub fn set_completed(
    store: &TaskStore,
    notifier: &DeadlineNotifier,
    id: i64,
    completed: bool,
) -> Result<Mutation, AppError> {
    let Some(mut task) = store.get(id) else {
        return Ok(Mutation::NotFound);
    };

    if completed && task.has_pending_alert() {
        notifier.cancel(task.notification_id.as_deref());
        task.notification_id = None;
    }
    task.completed = completed;
    store.update(task)
}

/// Deletes a task, cancelling any still-pending alert first.
pub fn remove_task(
    store: &TaskStore,
    notifier: &DeadlineNotifier,
    id: i64,
) -> Result<Mutation, AppError> {
    notifier.cancel_for_task(store, id);
    store.delete(id)
}

/// Explicit reload for the UI layer; view state is always a read of the
/// store, never a second copy.
pub fn refresh(store: &TaskStore) -> Vec<Task> {
    store.load_all()
}
