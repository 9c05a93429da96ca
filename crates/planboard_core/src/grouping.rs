//! Group flat task lists into task groups and assignee rows for the plan grid.

use crate::model::{Assignment, Task};
use crate::months::YearMonth;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

pub const UNASSIGNED_LABEL: &str = "unassigned";

/// Identity of an assignee row inside a task group.
///
/// Staff rows are keyed by the sorted executor ids so that the same set of
/// people collapses into one row regardless of the order they were picked in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    Staff(String),
    Unit(String),
    Unassigned,
}

impl RowKey {
    pub fn of(assignment: &Assignment) -> Self {
        match assignment {
            Assignment::Staff(executors) => {
                let mut ids: Vec<&str> = executors.iter().map(|staff| staff.id.as_str()).collect();
                ids.sort_unstable();
                Self::Staff(ids.join("_"))
            }
            Assignment::Unit(unit) => Self::Unit(unit.id.to_string()),
            Assignment::Unassigned => Self::Unassigned,
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff(ids) => write!(f, "S_{ids}"),
            Self::Unit(id) => write!(f, "U_{id}"),
            Self::Unassigned => f.write_str(UNASSIGNED_LABEL),
        }
    }
}

impl Serialize for RowKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn row_label(assignment: &Assignment) -> String {
    match assignment {
        Assignment::Staff(executors) => executors
            .iter()
            .map(|staff| staff.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        Assignment::Unit(unit) => unit.name.clone(),
        Assignment::Unassigned => UNASSIGNED_LABEL.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeRow {
    pub key: RowKey,
    pub label: String,
    pub tasks: Vec<Task>,
}

impl AssigneeRow {
    /// Presence test for one grid cell; duplicates in the same month still read as a single `true`.
    pub fn has_task_in(&self, month: YearMonth) -> bool {
        self.tasks.iter().any(|task| task.period == Some(month))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGroup {
    pub name: String,
    pub rows: Vec<AssigneeRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub key: RowKey,
    pub label: String,
    pub cells: Vec<bool>,
}

impl TaskGroup {
    pub fn task_count(&self) -> usize {
        self.rows.iter().map(|row| row.tasks.len()).sum()
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.rows.iter().flat_map(|row| row.tasks.iter())
    }

    /// One boolean per month and row, in the order of `months`.
    pub fn grid(&self, months: &[YearMonth]) -> Vec<GridRow> {
        self.rows
            .iter()
            .map(|row| GridRow {
                key: row.key.clone(),
                label: row.label.clone(),
                cells: months.iter().map(|month| row.has_task_in(*month)).collect(),
            })
            .collect()
    }

    /// All tasks of the group ordered by month; undated tasks go last.
    pub fn tasks_by_month(&self) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks().collect();
        tasks.sort_by_key(|task| (task.period.is_none(), task.period));
        tasks
    }
}

#[derive(Default)]
struct GroupAccumulator {
    groups: Vec<TaskGroup>,
    group_index: HashMap<String, usize>,
    row_index: HashMap<(usize, RowKey), usize>,
}

impl GroupAccumulator {
    fn push(mut self, task: &Task) -> Self {
        let group_slot = match self.group_index.get(&task.name) {
            Some(slot) => *slot,
            None => {
                self.groups.push(TaskGroup {
                    name: task.name.clone(),
                    rows: Vec::new(),
                });
                self.group_index
                    .insert(task.name.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };

        let key = RowKey::of(&task.assignment);
        let rows = &mut self.groups[group_slot].rows;
        match self.row_index.get(&(group_slot, key.clone())) {
            Some(row_slot) => rows[*row_slot].tasks.push(task.clone()),
            None => {
                rows.push(AssigneeRow {
                    key: key.clone(),
                    label: row_label(&task.assignment),
                    tasks: vec![task.clone()],
                });
                self.row_index.insert((group_slot, key), rows.len() - 1);
            }
        }
        self
    }
}

/// Groups tasks by name, then by assignee, both in first-seen order.
///
/// Every input task lands in exactly one row; tasks without an assignee go to
/// the unassigned row.
pub fn group_tasks(tasks: &[Task]) -> Vec<TaskGroup> {
    tasks
        .iter()
        .fold(GroupAccumulator::default(), GroupAccumulator::push)
        .groups
}

/// Tasks in group, row, then input order.
pub fn flatten(groups: &[TaskGroup]) -> Vec<Task> {
    groups.iter().flat_map(|group| group.tasks().cloned()).collect()
}

/// The first task of each group scheduled for `month`.
pub fn month_view(groups: &[TaskGroup], month: YearMonth) -> Vec<&Task> {
    groups
        .iter()
        .filter_map(|group| group.tasks().find(|task| task.period == Some(month)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RowKey, UNASSIGNED_LABEL, flatten, group_tasks, month_view};
    use crate::model::{Assignment, StaffRef, Task, UnitRef};
    use crate::months::{YearMonth, expand_months};

    fn task(id: u64, name: &str, month: &str, assignment: Assignment) -> Task {
        let mut task = Task::new(id, name);
        task.period = month.parse().ok();
        task.assignment = assignment;
        task
    }

    fn staff(members: &[(u64, &str)]) -> Assignment {
        Assignment::Staff(
            members
                .iter()
                .map(|(id, name)| StaffRef::new(*id, *name))
                .collect(),
        )
    }

    #[test]
    fn same_executor_set_collapses_into_one_row() {
        let tasks = vec![
            task(1, "Audit", "2024-01", staff(&[(2, "B"), (1, "A")])),
            task(2, "Audit", "2024-02", staff(&[(1, "A"), (2, "B")])),
        ];

        let groups = group_tasks(&tasks);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].rows.len(), 1);
        let row = &groups[0].rows[0];
        assert_eq!(row.key, RowKey::Staff("1_2".into()));
        assert_eq!(row.label, "B, A");
        assert_eq!(row.tasks.len(), 2);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let unit = Assignment::Unit(UnitRef::new(7u64, "Ops"));
        let tasks = vec![
            task(1, "Zeta", "2024-01", unit.clone()),
            task(2, "Alpha", "2024-01", unit.clone()),
            task(3, "Zeta", "2024-02", Assignment::Unassigned),
        ];

        let groups = group_tasks(&tasks);
        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
        assert_eq!(groups[0].rows[0].key, RowKey::Unit("7".into()));
        assert_eq!(groups[0].rows[0].label, "Ops");
        assert_eq!(groups[0].rows[1].key, RowKey::Unassigned);
        assert_eq!(groups[0].rows[1].label, UNASSIGNED_LABEL);
    }

    #[test]
    fn unit_and_staff_keys_never_collide() {
        let tasks = vec![
            task(1, "Audit", "2024-01", Assignment::Unit(UnitRef::new(1u64, "Ops"))),
            task(2, "Audit", "2024-01", staff(&[(1, "A")])),
        ];
        let groups = group_tasks(&tasks);
        assert_eq!(groups[0].rows.len(), 2);
        assert_eq!(groups[0].rows[0].key.to_string(), "U_1");
        assert_eq!(groups[0].rows[1].key.to_string(), "S_1");
    }

    #[test]
    fn unassigned_tasks_are_kept_so_totals_match() {
        let tasks = vec![
            task(1, "Audit", "2024-01", Assignment::Unassigned),
            task(2, "Audit", "2024-02", Assignment::Unassigned),
            task(3, "Report", "bad", Assignment::Unassigned),
        ];
        let groups = group_tasks(&tasks);
        let total: usize = groups.iter().map(|g| g.task_count()).sum();
        assert_eq!(total, tasks.len());
    }

    #[test]
    fn grid_marks_presence_and_tolerates_duplicates() {
        let a = staff(&[(1, "A")]);
        let tasks = vec![
            task(1, "Audit", "2024-01", a.clone()),
            task(2, "Audit", "2024-01", a.clone()),
            task(3, "Audit", "2024-03", a),
        ];
        let months = expand_months("2024-01", "2024-03");
        let grid = group_tasks(&tasks)[0].grid(&months);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].cells, vec![true, false, true]);
    }

    #[test]
    fn regrouping_flattened_output_is_identical() {
        let tasks = vec![
            task(1, "Audit", "2024-01", staff(&[(1, "A")])),
            task(2, "Report", "2024-01", Assignment::Unassigned),
            task(3, "Audit", "2024-01", Assignment::Unit(UnitRef::new(4u64, "Ops"))),
            task(4, "Audit", "2024-02", staff(&[(1, "A")])),
        ];
        let first = group_tasks(&tasks);
        let second = group_tasks(&flatten(&first));
        assert_eq!(first, second);
    }

    #[test]
    fn tasks_by_month_sorts_and_puts_undated_last() {
        let a = staff(&[(1, "A")]);
        let tasks = vec![
            task(1, "Audit", "", a.clone()),
            task(2, "Audit", "2024-03", a.clone()),
            task(3, "Audit", "2024-01", Assignment::Unassigned),
        ];
        let groups = group_tasks(&tasks);
        let ids: Vec<&str> = groups[0]
            .tasks_by_month()
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn month_view_picks_first_task_per_group() {
        let tasks = vec![
            task(1, "Audit", "2024-02", staff(&[(1, "A")])),
            task(2, "Audit", "2024-02", Assignment::Unassigned),
            task(3, "Report", "2024-01", Assignment::Unassigned),
            task(4, "Plan", "2024-02", Assignment::Unassigned),
        ];
        let groups = group_tasks(&tasks);
        let month = YearMonth::new(2024, 2).unwrap();
        let ids: Vec<&str> = month_view(&groups, month)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }
}
