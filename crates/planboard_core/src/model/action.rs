use crate::model::{dates, lenient};
use crate::model::refs::{EntityId, StaffRef};
use crate::model::status::{ActionStatus, Progress};
use serde::{Deserialize, Serialize};
use time::Date;

/// A single-owner step of execution under one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: EntityId,
    #[serde(alias = "task")]
    pub task_id: EntityId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub executor: Option<StaffRef>,
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub progress: Progress,
    #[serde(default, with = "dates::option")]
    pub deadline: Option<Date>,
}

impl Action {
    pub fn new(id: impl Into<EntityId>, task_id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            name: name.into(),
            description: None,
            executor: None,
            status: ActionStatus::Pending,
            progress: Progress::ZERO,
            deadline: None,
        }
    }

    pub fn is_owned_by(&self, staff_id: &EntityId) -> bool {
        self.executor
            .as_ref()
            .is_some_and(|executor| &executor.id == staff_id)
    }
}
