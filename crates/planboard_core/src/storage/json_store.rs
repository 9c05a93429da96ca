use crate::error::AppError;
use crate::model::{Action, EntityId, Plan, Task};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
const SNAPSHOT_FILE_NAME: &str = "snapshot.json";
const SNAPSHOT_ENV_VAR: &str = "PLANBOARD_SNAPSHOT_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredSnapshot {
    schema_version: u32,
    #[serde(default)]
    plans: Vec<Plan>,
    #[serde(default)]
    tasks: Vec<Task>,
    #[serde(default)]
    actions: Vec<Action>,
}

/// Records fetched from the planning backend, held in memory for aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub plans: Vec<Plan>,
    pub tasks: Vec<Task>,
    pub actions: Vec<Action>,
}

impl Snapshot {
    pub fn plan(&self, plan_id: &EntityId) -> Option<&Plan> {
        self.plans.iter().find(|plan| &plan.id == plan_id)
    }

    pub fn tasks_for_plan(&self, plan_id: &EntityId) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.plan_id.as_ref() == Some(plan_id))
            .cloned()
            .collect()
    }

    pub fn task(&self, task_id: &EntityId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == task_id)
    }
}

pub fn snapshot_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(SNAPSHOT_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("planboard")
            .join(SNAPSHOT_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("planboard")
            .join(SNAPSHOT_FILE_NAME))
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot, AppError> {
    if !path.exists() {
        log::debug!("no snapshot at {}, using an empty one", path.display());
        return Ok(Snapshot::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    parse_snapshot(&content)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))
}

pub fn parse_snapshot(content: &str) -> Result<Snapshot, AppError> {
    let invalid = |err: serde_json::Error| AppError::invalid_data(err.to_string());

    // A bare array is a task list; an object is a versioned snapshot.
    let snapshot = match content.trim_start().chars().next() {
        Some('[') => Snapshot {
            tasks: serde_json::from_str(content).map_err(invalid)?,
            ..Snapshot::default()
        },
        Some('{') => {
            let stored: StoredSnapshot = serde_json::from_str(content).map_err(invalid)?;
            if !(1..=SCHEMA_VERSION).contains(&stored.schema_version) {
                return Err(AppError::invalid_data("schema_version mismatch"));
            }
            Snapshot {
                plans: stored.plans,
                tasks: stored.tasks,
                actions: stored.actions,
            }
        }
        _ => {
            return Err(AppError::invalid_data(
                "snapshot must be a task array or an object",
            ));
        }
    };

    log::debug!(
        "loaded snapshot: {} plans, {} tasks, {} actions",
        snapshot.plans.len(),
        snapshot.tasks.len(),
        snapshot.actions.len()
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredSnapshot {
        schema_version: SCHEMA_VERSION,
        plans: snapshot.plans.clone(),
        tasks: snapshot.tasks.clone(),
        actions: snapshot.actions.clone(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;
    Ok(())
}
