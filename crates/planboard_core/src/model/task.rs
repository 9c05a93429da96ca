use crate::model::{dates, lenient};
use crate::model::refs::{EntityId, IdOrRef, StaffRef, UnitRef};
use crate::model::status::{Progress, TaskStatus};
use crate::months::YearMonth;
use serde::{Deserialize, Serialize};
use time::Date;

/// Who a task is handed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Assignment {
    Unit(UnitRef),
    /// Staff executors, in the order the assigner picked them.
    Staff(Vec<StaffRef>),
    #[default]
    Unassigned,
}

impl Assignment {
    /// Executors win over a unit assignee; the backend keeps the owning unit on staff tasks too.
    pub fn from_wire(assignee: Option<UnitRef>, executors: Vec<StaffRef>) -> Self {
        if !executors.is_empty() {
            Self::Staff(executors)
        } else if let Some(unit) = assignee {
            Self::Unit(unit)
        } else {
            Self::Unassigned
        }
    }
}

/// One month's instance of work inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireTask", into = "WireTask")]
pub struct Task {
    pub id: EntityId,
    /// Tasks sharing a name within a plan form one task group.
    pub name: String,
    pub plan_id: Option<EntityId>,
    /// `None` when the record's month was missing or malformed.
    pub period: Option<YearMonth>,
    pub status: TaskStatus,
    pub progress: Progress,
    pub assignment: Assignment,
    pub team: Option<String>,
    pub current_end_date: Option<Date>,
    pub initial_deadline: Option<Date>,
    pub current_delay: u32,
    pub extensions: u32,
    pub is_on_time: bool,
    pub parent_task: Option<EntityId>,
    pub description: Option<String>,
}

impl Task {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plan_id: None,
            period: None,
            status: TaskStatus::Pending,
            progress: Progress::ZERO,
            assignment: Assignment::Unassigned,
            team: None,
            current_end_date: None,
            initial_deadline: None,
            current_delay: 0,
            extensions: 0,
            is_on_time: false,
            parent_task: None,
            description: None,
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.period.map(|period| period.year())
    }

    pub fn month_number(&self) -> Option<u8> {
        self.period.map(|period| period.month())
    }
}

/// A month as it appears on the wire: `"2024-09"` in plan views, `9` plus a `year` field in dashboard feeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum WireMonth {
    Number(i64),
    Text(String),
}

fn resolve_period(month: Option<WireMonth>, year: Option<i32>) -> Option<YearMonth> {
    match month? {
        WireMonth::Text(raw) => raw.parse::<YearMonth>().ok().or_else(|| {
            let number = raw.trim().parse::<u8>().ok()?;
            YearMonth::new(year?, number)
        }),
        WireMonth::Number(number) => YearMonth::new(year?, u8::try_from(number).ok()?),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct WireTask {
    id: EntityId,
    #[serde(rename = "_id", skip_serializing)]
    legacy_id: Option<EntityId>,
    #[serde(deserialize_with = "lenient::string")]
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan_id: Option<EntityId>,
    #[serde(skip_serializing)]
    plan: Option<IdOrRef>,
    month: Option<WireMonth>,
    year: Option<i32>,
    status: TaskStatus,
    progress: Progress,
    assignee: Option<UnitRef>,
    executors: Option<Vec<StaffRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    team: Option<String>,
    #[serde(with = "dates::option")]
    current_end_date: Option<Date>,
    #[serde(with = "dates::option", skip_serializing)]
    current_deadline: Option<Date>,
    #[serde(with = "dates::option")]
    initial_deadline: Option<Date>,
    #[serde(deserialize_with = "lenient::count")]
    current_delay: Option<i64>,
    #[serde(deserialize_with = "lenient::count")]
    extensions: Option<i64>,
    is_on_time: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_task: Option<IdOrRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

fn non_negative(value: Option<i64>) -> u32 {
    value.unwrap_or(0).clamp(0, i64::from(u32::MAX)) as u32
}

impl From<WireTask> for Task {
    fn from(wire: WireTask) -> Self {
        let id = match wire.legacy_id {
            Some(legacy) if wire.id.is_empty() => legacy,
            _ => wire.id,
        };
        let had_month = wire.month.is_some();
        let period = resolve_period(wire.month, wire.year);
        if had_month && period.is_none() {
            log::warn!("task {} has an unreadable month, treating it as undated", id);
        }
        let (assignee, executors) = (wire.assignee, wire.executors.unwrap_or_default());

        Task {
            id,
            name: wire.name,
            plan_id: wire.plan_id.or(wire.plan.map(IdOrRef::into_id)),
            period,
            status: wire.status,
            progress: wire.progress,
            assignment: Assignment::from_wire(assignee, executors),
            team: wire.team.filter(|team| !team.trim().is_empty()),
            current_end_date: wire.current_end_date.or(wire.current_deadline),
            initial_deadline: wire.initial_deadline,
            current_delay: non_negative(wire.current_delay),
            extensions: non_negative(wire.extensions),
            is_on_time: wire.is_on_time.unwrap_or(false),
            parent_task: wire.parent_task.map(IdOrRef::into_id),
            description: wire.description,
        }
    }
}

impl From<Task> for WireTask {
    fn from(task: Task) -> Self {
        let (assignee, executors) = match task.assignment {
            Assignment::Unit(unit) => (Some(unit), Vec::new()),
            Assignment::Staff(staff) => (None, staff),
            Assignment::Unassigned => (None, Vec::new()),
        };

        WireTask {
            id: task.id,
            legacy_id: None,
            name: task.name,
            plan_id: task.plan_id,
            plan: None,
            month: task.period.map(|period| WireMonth::Text(period.to_string())),
            year: task.period.map(|period| period.year()),
            status: task.status,
            progress: task.progress,
            assignee,
            executors: Some(executors),
            team: task.team,
            current_end_date: task.current_end_date,
            current_deadline: None,
            initial_deadline: task.initial_deadline,
            current_delay: Some(i64::from(task.current_delay)),
            extensions: Some(i64::from(task.extensions)),
            is_on_time: Some(task.is_on_time),
            parent_task: task.parent_task.map(IdOrRef::Id),
            description: task.description,
        }
    }
}
