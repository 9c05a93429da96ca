use crate::actions::{self, ActionSummary};
use crate::error::AppError;
use crate::grouping::{self, TaskGroup};
use crate::model::{Action, EntityId, Plan, Task, dates};
use crate::months::YearMonth;
use crate::notify::{Notifier, activation_argument};
use crate::risk::{self, RiskEntry};
use crate::stats::{self, Stats};
use crate::storage::json_store::{self, Snapshot};
use serde::Serialize;
use std::path::Path;
use time::{Date, OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: Stats,
    pub risks: Vec<RiskEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanView {
    pub plan: Option<Plan>,
    pub months: Vec<YearMonth>,
    pub groups: Vec<TaskGroup>,
    pub out_of_range: Vec<Task>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub actions: Vec<Action>,
    pub summary: ActionSummary,
    pub children: Vec<Task>,
}

#[derive(Debug)]
pub struct NotificationOutcome {
    pub entries: Vec<RiskEntry>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

pub fn dashboard(today: Date, plan_id: Option<&str>) -> Result<Dashboard, AppError> {
    let path = json_store::snapshot_path()?;
    dashboard_with_path(&path, today, plan_id)
}

pub fn plan_view(plan_id: &str) -> Result<PlanView, AppError> {
    let path = json_store::snapshot_path()?;
    plan_view_with_path(&path, plan_id)
}

pub fn month_view(plan_id: &str, month: YearMonth) -> Result<Vec<Task>, AppError> {
    let path = json_store::snapshot_path()?;
    month_view_with_path(&path, plan_id, month)
}

pub fn task_detail(task_id: &str) -> Result<TaskDetail, AppError> {
    let path = json_store::snapshot_path()?;
    task_detail_with_path(&path, task_id)
}

pub fn staff_actions(staff_id: &str) -> Result<Vec<Action>, AppError> {
    let path = json_store::snapshot_path()?;
    staff_actions_with_path(&path, staff_id)
}

pub fn notify_at_risk(
    today: Date,
    notifier: &dyn Notifier,
) -> Result<NotificationOutcome, AppError> {
    let path = json_store::snapshot_path()?;
    notify_at_risk_with_path(&path, today, notifier)
}

pub fn today_local() -> Date {
    OffsetDateTime::now_utc().to_offset(local_offset()).date()
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Parses a `YYYY-MM-DD` override for the dashboard clock.
pub fn parse_today(raw: &str) -> Result<Date, AppError> {
    dates::parse_date(raw)
        .ok_or_else(|| AppError::invalid_input(format!("invalid date '{}'", raw.trim())))
}

fn required_id(raw: &str, what: &str) -> Result<EntityId, AppError> {
    let id = EntityId::from(raw);
    if id.is_empty() {
        return Err(AppError::invalid_input(format!("{what} is required")));
    }
    Ok(id)
}

/// Tasks in scope for one plan, failing when the snapshot knows nothing about it.
fn plan_scope(snapshot: &Snapshot, plan_id: &EntityId) -> Result<(Option<Plan>, Vec<Task>), AppError> {
    let plan = snapshot.plan(plan_id).cloned();
    let tasks = snapshot.tasks_for_plan(plan_id);
    if plan.is_none() && tasks.is_empty() {
        return Err(AppError::not_found(format!("plan {plan_id} not found")));
    }
    Ok((plan, tasks))
}

pub fn dashboard_with_path(
    path: &Path,
    today: Date,
    plan_id: Option<&str>,
) -> Result<Dashboard, AppError> {
    let snapshot = json_store::load_snapshot(path)?;
    let tasks = match plan_id {
        Some(raw) => plan_scope(&snapshot, &required_id(raw, "plan id")?)?.1,
        None => snapshot.tasks,
    };

    Ok(Dashboard {
        stats: stats::aggregate(&tasks, today),
        risks: risk::classify(&tasks, today),
    })
}

pub fn plan_view_with_path(path: &Path, plan_id: &str) -> Result<PlanView, AppError> {
    let snapshot = json_store::load_snapshot(path)?;
    let plan_id = required_id(plan_id, "plan id")?;
    let (plan, tasks) = plan_scope(&snapshot, &plan_id)?;

    let (months, out_of_range) = match plan.as_ref() {
        Some(plan) => {
            if plan.span().is_none() {
                log::warn!("plan {} has no usable month span", plan.id);
            }
            let outside: Vec<Task> = plan.out_of_range(&tasks).into_iter().cloned().collect();
            for task in &outside {
                log::warn!("task {} ({}) falls outside plan {}", task.id, task.name, plan.id);
            }
            (plan.months(), outside)
        }
        None => (Vec::new(), Vec::new()),
    };

    Ok(PlanView {
        plan,
        months,
        groups: grouping::group_tasks(&tasks),
        out_of_range,
    })
}

pub fn month_view_with_path(
    path: &Path,
    plan_id: &str,
    month: YearMonth,
) -> Result<Vec<Task>, AppError> {
    let view = plan_view_with_path(path, plan_id)?;
    Ok(grouping::month_view(&view.groups, month)
        .into_iter()
        .cloned()
        .collect())
}

pub fn task_detail_with_path(path: &Path, task_id: &str) -> Result<TaskDetail, AppError> {
    let task_id = required_id(task_id, "id")?;
    let snapshot = json_store::load_snapshot(path)?;
    let task = snapshot
        .task(&task_id)
        .cloned()
        .ok_or_else(|| AppError::not_found(format!("task {task_id} not found")))?;

    let task_actions = actions::actions_for_task(&snapshot.actions, &task_id);
    let summary = actions::summarize(task_actions.iter().copied());
    Ok(TaskDetail {
        task,
        actions: task_actions.into_iter().cloned().collect(),
        summary,
        children: actions::child_tasks(&snapshot.tasks, &task_id)
            .into_iter()
            .cloned()
            .collect(),
    })
}

pub fn staff_actions_with_path(path: &Path, staff_id: &str) -> Result<Vec<Action>, AppError> {
    let staff_id = required_id(staff_id, "staff id")?;
    let snapshot = json_store::load_snapshot(path)?;
    Ok(actions::actions_for_executor(&snapshot.actions, &staff_id)
        .into_iter()
        .cloned()
        .collect())
}

pub fn notify_at_risk_with_path(
    path: &Path,
    today: Date,
    notifier: &dyn Notifier,
) -> Result<NotificationOutcome, AppError> {
    let snapshot = json_store::load_snapshot(path)?;
    let mut notified = Vec::new();
    let mut failures = Vec::new();

    for entry in risk::classify(&snapshot.tasks, today) {
        if !entry.reason.is_deadline() {
            continue;
        }

        let action = activation_argument(entry.task.id.as_str());
        match notifier.notify_with_action(&entry, &action) {
            Ok(()) => notified.push(entry),
            Err(err) => {
                log::warn!("notification for task {} failed: {}", entry.task.id, err);
                failures.push(NotificationFailure {
                    task_id: entry.task.id.to_string(),
                    error: err,
                });
            }
        }
    }

    Ok(NotificationOutcome {
        entries: notified,
        failures,
    })
}
