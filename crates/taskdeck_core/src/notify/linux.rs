use crate::error::AppError;
use crate::notify::pending::{AlertRegistry, new_handle, wait_until};
use crate::notify::{ACTION_DELETE, ACTION_SHOW, AlertRequest, CATEGORY_DEADLINE, Scheduler, launch_action};
use notify_rust::{Hint, Notification};

/// Thread-per-alert scheduler on top of desktop notifications. The alert
/// thread sleeps until the trigger time, re-checks cancellation, then shows
/// the notification with the show/delete actions and waits for a selection.
pub struct LinuxScheduler {
    pending: AlertRegistry,
}

impl LinuxScheduler {
    pub fn new() -> Self {
        Self {
            pending: AlertRegistry::default(),
        }
    }
}

impl Default for LinuxScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for LinuxScheduler {
    fn schedule(&self, request: &AlertRequest) -> Result<String, AppError> {
        let handle = new_handle();
        let cancelled = self.pending.register(&handle);
        let pending = self.pending.clone();
        let request = request.clone();
        let thread_handle = handle.clone();

        std::thread::spawn(move || {
            if wait_until(request.fire_at_ms, &cancelled) {
                present(&request);
            }
            pending.remove(&thread_handle);
        });

        Ok(handle)
    }

    fn cancel(&self, handle: &str) -> Result<(), AppError> {
        self.pending.cancel(handle);
        Ok(())
    }
}

fn present(request: &AlertRequest) {
    let task_id = request.task_id;
    let shown = Notification::new()
        .summary("Deadline reminder")
        .body(&format!("Task \"{}\" needs attention.", request.text))
        .hint(Hint::Category(CATEGORY_DEADLINE.to_string()))
        .action(ACTION_SHOW, "View")
        .action(ACTION_DELETE, "Delete task")
        .show();

    match shown {
        Ok(notification) => {
            notification.wait_for_action(|selected| {
                let action = if selected == "default" {
                    ACTION_SHOW
                } else {
                    selected
                };
                if action == ACTION_SHOW || action == ACTION_DELETE {
                    let _ = launch_action(action, task_id);
                }
            });
        }
        Err(err) => {
            log::warn!("failed to show alert for task {task_id}: {err}");
        }
    }
}
