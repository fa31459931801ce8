use crate::clock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Cancellation registry shared between a platform scheduler and its alert
/// threads. Cancelling flips the flag the thread re-checks before firing.
#[derive(Clone, Default)]
pub(crate) struct AlertRegistry {
    inner: Arc<Mutex<HashMap<String, Arc<AtomicBool>>>>,
}

impl AlertRegistry {
    pub(crate) fn register(&self, handle: &str) -> Arc<AtomicBool> {
        let flag = Arc::new(AtomicBool::new(false));
        if let Ok(mut pending) = self.inner.lock() {
            pending.insert(handle.to_string(), Arc::clone(&flag));
        }
        flag
    }

    pub(crate) fn cancel(&self, handle: &str) {
        if let Ok(mut pending) = self.inner.lock()
            && let Some(flag) = pending.remove(handle)
        {
            flag.store(true, Ordering::Relaxed);
        }
    }

    pub(crate) fn remove(&self, handle: &str) {
        if let Ok(mut pending) = self.inner.lock() {
            pending.remove(handle);
        }
    }
}

pub(crate) fn new_handle() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    format!("alert-{nanos}")
}

/// Sleeps until `fire_at_ms`, polling the cancellation flag. Returns true
/// when the alert should still fire.
pub(crate) fn wait_until(fire_at_ms: i64, cancelled: &AtomicBool) -> bool {
    loop {
        if cancelled.load(Ordering::Relaxed) {
            return false;
        }
        let remaining_ms = fire_at_ms - clock::now_ms();
        if remaining_ms <= 0 {
            return !cancelled.load(Ordering::Relaxed);
        }
        std::thread::sleep(Duration::from_millis(remaining_ms.min(200) as u64));
    }
}
