use crate::error::AppError;
use crate::notify::pending::{AlertRegistry, new_handle, wait_until};
use crate::notify::{ACTION_DELETE, ACTION_SHOW, AlertRequest, Scheduler, launch_action};
use tauri_winrt_notification::Toast;

pub struct WindowsScheduler {
    pending: AlertRegistry,
}

impl WindowsScheduler {
    pub fn new() -> Self {
        Self {
            pending: AlertRegistry::default(),
        }
    }
}

impl Default for WindowsScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for WindowsScheduler {
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
    let shown = Toast::new(Toast::POWERSHELL_APP_ID)
        .title("Deadline reminder")
        .text1(&format!("Task \"{}\" needs attention.", request.text))
        .add_button("View", ACTION_SHOW)
        .add_button("Delete task", ACTION_DELETE)
        .on_activated(move |argument| {
            let action = match argument.as_deref() {
                Some(ACTION_DELETE) => ACTION_DELETE,
                // A bare tap reports no argument and foregrounds the task.
                Some(ACTION_SHOW) | Some("") | None => ACTION_SHOW,
                Some(_) => return Ok(()),
            };
            let _ = launch_action(action, task_id);
            Ok(())
        })
        .show();

    if let Err(err) = shown {
        log::warn!("failed to show alert for task {task_id}: {err}");
    }
}
