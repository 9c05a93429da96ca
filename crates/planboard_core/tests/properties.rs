use planboard_core::grouping::{flatten, group_tasks};
use planboard_core::model::{Assignment, StaffRef, Task, TaskStatus, UnitRef};
use planboard_core::months::{YearMonth, expand_months, month_range, months_between};
use planboard_core::risk::classify;
use planboard_core::stats::aggregate;
use proptest::prelude::*;
use proptest::test_runner::Config;
use time::Duration;
use time::macros::date;

fn year_month() -> impl Strategy<Value = YearMonth> {
    (2000_i32..2031, 1_u8..=12).prop_map(|(year, month)| YearMonth::new(year, month).unwrap())
}

fn status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Pending),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Cancelled),
        Just(TaskStatus::Overdue),
        Just(TaskStatus::Withdrawn),
        Just(TaskStatus::Unknown("ON_HOLD".into())),
    ]
}

fn assignment() -> impl Strategy<Value = Assignment> {
    prop_oneof![
        Just(Assignment::Unassigned),
        (1_u64..4).prop_map(|id| Assignment::Unit(UnitRef::new(id, format!("unit {id}")))),
        prop::collection::vec(1_u64..5, 1..4).prop_map(|ids| {
            Assignment::Staff(
                ids.into_iter()
                    .map(|id| StaffRef::new(id, format!("staff {id}")))
                    .collect(),
            )
        }),
    ]
}

prop_compose! {
    fn task()(
        id in 0_u64..1_000,
        name in prop::sample::select(vec!["Audit", "Report", "Review"]),
        period in prop::option::of((2024_i32..2026, 1_u8..=12)),
        status in status(),
        assignment in assignment(),
        end_offset in prop::option::of(-20_i64..20),
        delay in 0_u32..5,
        extensions in 0_u32..4,
    ) -> Task {
        let mut task = Task::new(id, name);
        task.period = period.and_then(|(year, month)| YearMonth::new(year, month));
        task.status = status;
        task.assignment = assignment;
        task.current_end_date =
            end_offset.map(|days| date!(2024 - 09 - 15) + Duration::days(days));
        task.current_delay = delay;
        task.extensions = extensions;
        task
    }
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn expanded_range_steps_one_month(start in year_month(), end in year_month()) {
        let months = month_range(start, end);
        if start > end {
            prop_assert!(months.is_empty());
        } else {
            prop_assert_eq!(months.len() as i64, months_between(start, end) + 1);
            prop_assert_eq!(months.first().copied(), Some(start));
            prop_assert_eq!(months.last().copied(), Some(end));
            for pair in months.windows(2) {
                prop_assert_eq!(pair[0].next(), Some(pair[1]));
            }
        }
        let from_text = expand_months(&start.to_string(), &end.to_string());
        prop_assert_eq!(from_text, months);
    }

    #[test]
    fn breakdown_sums_to_current_month_total(tasks in prop::collection::vec(task(), 0..40)) {
        let stats = aggregate(&tasks, date!(2024 - 09 - 15));
        prop_assert_eq!(
            stats.current_month_breakdown.total(),
            stats.current_month_total
        );
    }

    #[test]
    fn completion_rate_grows_with_completed_tasks(total in 1_usize..30) {
        let mut tasks: Vec<Task> = (0..total as u64)
            .map(|id| Task::new(id, "Audit"))
            .collect();
        let mut previous = aggregate(&tasks, date!(2024 - 09 - 15)).completion_rate;
        prop_assert_eq!(previous, 0.0);

        for index in 0..total {
            tasks[index].status = TaskStatus::Completed;
            let rate = aggregate(&tasks, date!(2024 - 09 - 15)).completion_rate;
            prop_assert!(rate >= previous);
            previous = rate;
        }
        prop_assert_eq!(previous, 100.0);
    }

    #[test]
    fn grouping_is_idempotent(tasks in prop::collection::vec(task(), 0..40)) {
        let groups = group_tasks(&tasks);
        let regrouped = group_tasks(&flatten(&groups));
        prop_assert_eq!(&regrouped, &groups);

        let placed: usize = groups.iter().map(|group| group.task_count()).sum();
        prop_assert_eq!(placed, tasks.len());
    }

    #[test]
    fn finished_tasks_never_have_deadline_reasons(tasks in prop::collection::vec(task(), 0..40)) {
        for entry in classify(&tasks, date!(2024 - 09 - 15)) {
            if entry.reason.is_deadline() {
                prop_assert!(!matches!(
                    entry.task.status,
                    TaskStatus::Completed | TaskStatus::Cancelled
                ));
            }
        }
    }

    #[test]
    fn risk_entries_ordered_by_end_date(tasks in prop::collection::vec(task(), 0..40)) {
        let entries = classify(&tasks, date!(2024 - 09 - 15));
        for pair in entries.windows(2) {
            let (a, b) = (pair[0].task.current_end_date, pair[1].task.current_end_date);
            match (a, b) {
                (Some(a), Some(b)) => prop_assert!(a <= b),
                (None, Some(_)) => prop_assert!(false, "undated entry before dated one"),
                _ => {}
            }
        }
    }
}
