//! Roll-ups over actions and the task decomposition tree.

use crate::model::{Action, ActionStatus, EntityId, Task};
use crate::stats::{percentage, round1};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActionSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
    pub average_progress: f64,
    pub completion_rate: f64,
}

pub fn summarize<'a>(actions: impl IntoIterator<Item = &'a Action>) -> ActionSummary {
    let mut summary = ActionSummary::default();
    let mut progress_sum = 0u64;
    for action in actions {
        summary.total += 1;
        progress_sum += u64::from(action.progress.percent());
        match action.status {
            ActionStatus::Completed => summary.completed += 1,
            ActionStatus::InProgress => summary.in_progress += 1,
            ActionStatus::Pending => summary.pending += 1,
        }
    }

    if summary.total > 0 {
        summary.average_progress = round1(progress_sum as f64 / summary.total as f64);
    }
    summary.completion_rate = percentage(summary.completed, summary.total);
    summary
}

pub fn actions_for_task<'a>(actions: &'a [Action], task_id: &EntityId) -> Vec<&'a Action> {
    actions
        .iter()
        .filter(|action| &action.task_id == task_id)
        .collect()
}

pub fn actions_for_executor<'a>(actions: &'a [Action], staff_id: &EntityId) -> Vec<&'a Action> {
    actions
        .iter()
        .filter(|action| action.is_owned_by(staff_id))
        .collect()
}

/// Direct children spawned when a unit-level task was delegated.
pub fn child_tasks<'a>(tasks: &'a [Task], parent_id: &EntityId) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.parent_task.as_ref() == Some(parent_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{actions_for_executor, actions_for_task, child_tasks, summarize};
    use crate::model::{Action, ActionStatus, Progress, StaffRef, Task};

    fn action(id: u64, task: u64, owner: u64, status: ActionStatus, progress: i64) -> Action {
        let mut action = Action::new(id, task, format!("step {id}"));
        action.executor = Some(StaffRef::new(owner, format!("staff {owner}")));
        action.status = status;
        action.progress = Progress::from_percent(progress);
        action
    }

    #[test]
    fn summary_counts_statuses_and_averages_progress() {
        let actions = vec![
            action(1, 10, 1, ActionStatus::Completed, 100),
            action(2, 10, 2, ActionStatus::InProgress, 30),
            action(3, 10, 1, ActionStatus::Pending, 0),
            action(4, 11, 1, ActionStatus::Completed, 100),
        ];

        let summary = summarize(actions_for_task(&actions, &"10".into()));
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.average_progress, 43.3);
        assert_eq!(summary.completion_rate, 33.3);
    }

    #[test]
    fn empty_summary_is_zero() {
        let none: Vec<Action> = Vec::new();
        let summary = summarize(&none);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_progress, 0.0);
        assert_eq!(summary.completion_rate, 0.0);
    }

    #[test]
    fn executor_filter_matches_single_owner() {
        let actions = vec![
            action(1, 10, 1, ActionStatus::Pending, 0),
            action(2, 10, 2, ActionStatus::Pending, 0),
            Action::new(3u64, 10u64, "ownerless"),
        ];
        let mine: Vec<&str> = actions_for_executor(&actions, &"1".into())
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(mine, vec!["1"]);
    }

    #[test]
    fn child_tasks_follow_parent_reference() {
        let parent = Task::new(1u64, "Audit");
        let mut child = Task::new(2u64, "Audit");
        child.parent_task = Some("1".into());
        let other = Task::new(3u64, "Audit");
        let tasks = vec![parent, child, other];

        let children: Vec<&str> = child_tasks(&tasks, &"1".into())
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(children, vec!["2"]);
    }
}
