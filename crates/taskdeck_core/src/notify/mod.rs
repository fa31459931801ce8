use crate::clock;
use crate::error::AppError;
use crate::store::{Mutation, TaskStore};
use log::{debug, info, warn};

#[cfg(any(target_os = "linux", windows))]
mod pending;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxScheduler;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsScheduler;

/// Notification category and action identifiers, part of the persisted
/// alert contract.
pub const CATEGORY_DEADLINE: &str = "TASK_DEADLINE";
pub const ACTION_SHOW: &str = "show";
pub const ACTION_DELETE: &str = "delete";
/// Identifier the platform reports for a plain tap on the alert.
pub const ACTION_DEFAULT: &str = "default";

const DISABLE_ENV_VAR: &str = "TASKDECK_DISABLE_NOTIFICATIONS";

/// A request to fire one local alert at `fire_at_ms` carrying the task id
/// as payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub task_id: i64,
    pub text: String,
    pub fire_at_ms: i64,
}

/// Platform notification service boundary: schedule returns an opaque
/// handle that `cancel` accepts later.
pub trait Scheduler: Send + Sync {
    fn permission_granted(&self) -> bool {
        true
    }

    fn schedule(&self, request: &AlertRequest) -> Result<String, AppError>;

    fn cancel(&self, handle: &str) -> Result<(), AppError>;
}

/// Stand-in when notifications are disabled or unsupported. Reports no
/// permission, so scheduling is skipped before it is ever attempted.
pub struct NoopScheduler;

impl Scheduler for NoopScheduler {
    fn permission_granted(&self) -> bool {
        false
    }

    fn schedule(&self, _request: &AlertRequest) -> Result<String, AppError> {
        Err(AppError::invalid_data("notifications are disabled"))
    }

    fn cancel(&self, _handle: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn scheduler_from_env() -> Box<dyn Scheduler> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        return Box::new(NoopScheduler);
    }

    match platform_scheduler() {
        Ok(scheduler) => scheduler,
        Err(err) => {
            debug!("no platform scheduler available: {err}");
            Box::new(NoopScheduler)
        }
    }
}

#[cfg(target_os = "linux")]
fn platform_scheduler() -> Result<Box<dyn Scheduler>, AppError> {
    Ok(Box::new(LinuxScheduler::new()))
}

#[cfg(windows)]
fn platform_scheduler() -> Result<Box<dyn Scheduler>, AppError> {
    Ok(Box::new(WindowsScheduler::new()))
}

#[cfg(not(any(target_os = "linux", windows)))]
fn platform_scheduler() -> Result<Box<dyn Scheduler>, AppError> {
    Err(AppError::invalid_data(
        "local alerts are not supported on this platform",
    ))
}

/// What a fired alert's user action resolved to. `OpenTask` is a signal
/// for the UI layer; the notifier itself only mutates the store on delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Deleted(i64),
    AlreadyGone(i64),
    OpenTask(i64),
    Ignored,
}

/// Maps a task's deadline to at most one scheduled local alert and turns
/// user actions on a fired alert back into Task Store calls.
pub struct DeadlineNotifier {
    scheduler: Box<dyn Scheduler>,
}

impl DeadlineNotifier {
    pub fn new(scheduler: Box<dyn Scheduler>) -> Self {
        Self { scheduler }
    }

    pub fn from_env() -> Self {
        Self::new(scheduler_from_env())
    }

    /// Schedules an alert for `deadline_ms`. A deadline at or before now is
    /// skipped by policy, as is a denied permission; a platform failure is
    /// logged. All three return `None` and the caller treats that as a
    /// legitimate outcome.
    pub fn schedule(&self, task_id: i64, text: &str, deadline_ms: i64) -> Option<String> {
        if deadline_ms <= clock::now_ms() {
            debug!("deadline for task {task_id} is in the past, skipping alert");
            return None;
        }

        if !self.scheduler.permission_granted() {
            debug!("notification permission not granted, skipping alert for task {task_id}");
            return None;
        }

        let request = AlertRequest {
            task_id,
            text: text.to_string(),
            fire_at_ms: deadline_ms,
        };
        match self.scheduler.schedule(&request) {
            Ok(handle) => {
                info!("scheduled alert {handle} for task {task_id}");
                Some(handle)
            }
            Err(err) => {
                warn!("failed to schedule alert for task {task_id}: {err}");
                None
            }
        }
    }

    /// Cancels a previously scheduled alert. A missing or empty handle is a
    /// no-op; a platform failure is logged and swallowed.
    pub fn cancel(&self, handle: Option<&str>) {
        let Some(handle) = handle.filter(|handle| !handle.trim().is_empty()) else {
            return;
        };

        match self.scheduler.cancel(handle) {
            Ok(()) => info!("cancelled alert {handle}"),
            Err(err) => warn!("failed to cancel alert {handle}: {err}"),
        }
    }

    /// Cancels the alert recorded on the task with `task_id`, if any.
    /// Silent no-op when the task is missing or carries no handle.
    pub fn cancel_for_task(&self, store: &TaskStore, task_id: i64) {
        if let Some(task) = store.get(task_id) {
            self.cancel(task.notification_id.as_deref());
        }
    }

    /// Entry point for a user action on a fired alert. The destructive
    /// action deletes the task; show and the default tap only signal the
    /// caller to foreground the task.
    pub fn handle_action(
        &self,
        store: &TaskStore,
        action_identifier: &str,
        task_id: Option<i64>,
    ) -> ActionOutcome {
        match (action_identifier, task_id) {
            (ACTION_DELETE, Some(id)) => match store.delete(id) {
                Ok(Mutation::Applied) => {
                    info!("task {id} deleted via alert action");
                    ActionOutcome::Deleted(id)
                }
                Ok(Mutation::NotFound) => {
                    debug!("alert delete action for task {id}, already gone");
                    ActionOutcome::AlreadyGone(id)
                }
                Err(err) => {
                    warn!("alert delete action for task {id} failed: {err}");
                    ActionOutcome::AlreadyGone(id)
                }
            },
            (ACTION_SHOW | ACTION_DEFAULT, Some(id)) => ActionOutcome::OpenTask(id),
            _ => ActionOutcome::Ignored,
        }
    }
}

/// Re-enters the application in a fresh process when an alert action is
/// selected, the way a platform would deliver the action event.
pub fn launch_action(action: &str, task_id: i64) -> Result<(), AppError> {
    let exe = std::env::current_exe()?;
    std::process::Command::new(exe)
        .arg("notify-action")
        .arg(action)
        .arg(task_id.to_string())
        .spawn()?;
    Ok(())
}
