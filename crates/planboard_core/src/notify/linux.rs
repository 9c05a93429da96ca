use crate::error::AppError;
use crate::notify::{APP_NAME, Notifier, join_within, launch_show, notification_body};
use crate::risk::{RiskEntry, Severity};
use notify_rust::{Notification, Urgency};
use std::sync::Mutex;
use std::thread::JoinHandle;
use std::time::Duration;

/// Desktop notifier over D-Bus. Each notification with an action gets a thread waiting for the click.
#[derive(Default)]
pub struct LinuxNotifier {
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl Notifier for LinuxNotifier {
    fn notify(&self, entry: &RiskEntry) -> Result<(), AppError> {
        self.notify_with_action(entry, "")
    }

    fn notify_with_action(&self, entry: &RiskEntry, action: &str) -> Result<(), AppError> {
        let urgency = match entry.severity {
            Severity::Critical => Urgency::Critical,
            Severity::Warning | Severity::Notice => Urgency::Normal,
        };

        let mut notification = Notification::new();
        notification
            .summary(APP_NAME)
            .body(&notification_body(entry))
            .urgency(urgency);
        if !action.trim().is_empty() {
            notification.action(action, "Open");
        }

        let handle = notification
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        if !action.trim().is_empty() {
            let action_key = action.to_string();
            let task_id = entry.task.id.to_string();
            let listener = std::thread::spawn(move || {
                handle.wait_for_action(|selected| {
                    if (selected == action_key || selected == "default")
                        && let Err(err) = launch_show(&task_id)
                    {
                        log::warn!("could not open task {task_id}: {err}");
                    }
                });
            });
            self.listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(listener);
        }

        Ok(())
    }

    fn wait_for_actions(&self, timeout: Duration) {
        let listeners = std::mem::take(
            &mut *self
                .listeners
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        );
        let open = join_within(listeners, timeout);
        if open > 0 {
            log::debug!("{open} notifications still open after {}s", timeout.as_secs());
        }
    }
}
