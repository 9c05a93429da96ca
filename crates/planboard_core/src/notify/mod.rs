use crate::error::AppError;
use crate::risk::RiskEntry;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::LinuxNotifier;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::WindowsNotifier;

const DISABLE_ENV_VAR: &str = "PLANBOARD_DISABLE_NOTIFICATIONS";
const ACTION_PREFIX: &str = "show:";
const POLL_INTERVAL: Duration = Duration::from_millis(100);
pub(crate) const APP_NAME: &str = "planboard";

pub trait Notifier {
    fn notify(&self, entry: &RiskEntry) -> Result<(), AppError>;

    fn notify_with_action(&self, entry: &RiskEntry, action: &str) -> Result<(), AppError> {
        let _ = action;
        self.notify(entry)
    }

    /// Keeps the process alive until open notifications are answered or `timeout` passes.
    fn wait_for_actions(&self, timeout: Duration) {
        let _ = timeout;
    }
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _entry: &RiskEntry) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn notifier_from_env() -> Result<Box<dyn Notifier>, AppError> {
    if std::env::var(DISABLE_ENV_VAR).is_ok() {
        log::debug!("{DISABLE_ENV_VAR} is set, notifications are disabled");
        return Ok(Box::new(NoopNotifier));
    }

    match platform_notifier() {
        Ok(notifier) => Ok(notifier),
        Err(AppError::InvalidData(message)) => {
            log::warn!("{message}");
            Ok(Box::new(NoopNotifier))
        }
        Err(other) => Err(other),
    }
}

/// One-line body used by every platform notifier.
pub fn notification_body(entry: &RiskEntry) -> String {
    format!("{}: {} ({})", entry.label, entry.task.name, entry.task.id)
}

pub fn activation_argument(task_id: &str) -> String {
    format!("{ACTION_PREFIX}{task_id}")
}

pub fn parse_activation_argument(argument: &str) -> Option<String> {
    argument
        .strip_prefix(ACTION_PREFIX)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Opens the task detail view in a new process of the current executable.
pub fn launch_show(task_id: &str) -> Result<(), AppError> {
    let exe = std::env::current_exe().map_err(|err| AppError::io(err.to_string()))?;
    std::process::Command::new(exe)
        .arg("show")
        .arg(task_id)
        .spawn()
        .map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}

/// Joins every handle that finishes before `timeout`; returns how many were still running.
#[cfg_attr(not(any(target_os = "linux", windows)), allow(dead_code))]
pub(crate) fn join_within(handles: Vec<JoinHandle<()>>, timeout: Duration) -> usize {
    let deadline = Instant::now() + timeout;
    let mut running = handles;
    loop {
        let (finished, rest): (Vec<_>, Vec<_>) =
            running.into_iter().partition(|handle| handle.is_finished());
        for handle in finished {
            if handle.join().is_err() {
                log::warn!("notification action handler panicked");
            }
        }
        running = rest;
        if running.is_empty() || Instant::now() >= deadline {
            return running.len();
        }
        std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
    }
}

#[cfg(target_os = "linux")]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(LinuxNotifier::default()))
}

#[cfg(windows)]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Ok(Box::new(WindowsNotifier::default()))
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn platform_notifier() -> Result<Box<dyn Notifier>, AppError> {
    Err(AppError::invalid_data(
        "notifications are not supported on this platform",
    ))
}
