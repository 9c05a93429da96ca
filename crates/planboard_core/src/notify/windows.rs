use crate::error::AppError;
use crate::notify::{APP_NAME, Notifier, join_within, launch_show, parse_activation_argument};
use crate::risk::RiskEntry;
use std::sync::{Mutex, mpsc};
use std::thread::JoinHandle;
use std::time::Duration;
use tauri_winrt_notification::Toast;

/// Toast notifier. Activations are handed to a listener thread that opens the task.
#[derive(Default)]
pub struct WindowsNotifier {
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl Notifier for WindowsNotifier {
    fn notify(&self, entry: &RiskEntry) -> Result<(), AppError> {
        self.notify_with_action(entry, "")
    }

    fn notify_with_action(&self, entry: &RiskEntry, action: &str) -> Result<(), AppError> {
        let task_id = entry.task.id.to_string();
        let action_value = action.to_string();
        let mut toast = Toast::new(Toast::POWERSHELL_APP_ID)
            .title(APP_NAME)
            .text1(&entry.task.name)
            .text2(&format!("{} ({})", entry.label, task_id));

        if !action_value.trim().is_empty() {
            toast = toast.add_button("Open", &action_value);
        }

        let (activated, activations) = mpsc::channel::<String>();
        let fallback = task_id.clone();
        toast
            .on_activated(move |args| {
                let target = args
                    .as_deref()
                    .and_then(parse_activation_argument)
                    .unwrap_or_else(|| fallback.clone());
                let _ = activated.send(target);
                Ok(())
            })
            .show()
            .map_err(|err| AppError::io(err.to_string()))?;

        let listener = std::thread::spawn(move || {
            if let Ok(target) = activations.recv()
                && let Err(err) = launch_show(&target)
            {
                log::warn!("could not open task {target}: {err}");
            }
        });
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(listener);
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
