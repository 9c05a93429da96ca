//! Dashboard statistics over a flat task collection.

use crate::model::{Task, TaskStatus};
use crate::months::YearMonth;
use serde::Serialize;
use time::Date;

pub const OTHER_TEAM: &str = "Other";

/// Status buckets shown on the current-month card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonthBucket {
    Completed,
    NotStarted,
    InProgress,
    Cancelled,
}

impl MonthBucket {
    pub fn of(status: &TaskStatus) -> Self {
        match status {
            TaskStatus::Completed => Self::Completed,
            TaskStatus::InProgress | TaskStatus::Withdrawn => Self::InProgress,
            TaskStatus::Cancelled => Self::Cancelled,
            TaskStatus::Pending | TaskStatus::Overdue | TaskStatus::Unknown(_) => Self::NotStarted,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthBreakdown {
    pub completed: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub cancelled: usize,
}

impl MonthBreakdown {
    fn record(mut self, bucket: MonthBucket) -> Self {
        match bucket {
            MonthBucket::Completed => self.completed += 1,
            MonthBucket::NotStarted => self.not_started += 1,
            MonthBucket::InProgress => self.in_progress += 1,
            MonthBucket::Cancelled => self.cancelled += 1,
        }
        self
    }

    pub fn total(&self) -> usize {
        self.completed + self.not_started + self.in_progress + self.cancelled
    }

    pub fn get(&self, bucket: MonthBucket) -> usize {
        match bucket {
            MonthBucket::Completed => self.completed,
            MonthBucket::NotStarted => self.not_started,
            MonthBucket::InProgress => self.in_progress,
            MonthBucket::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamPerformance {
    pub name: String,
    pub total: usize,
    pub done_count: usize,
    pub progress_sum: u64,
    pub on_time_count: usize,
    pub average_progress: f64,
    pub on_time_rate: f64,
}

impl TeamPerformance {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total: 0,
            done_count: 0,
            progress_sum: 0,
            on_time_count: 0,
            average_progress: 0.0,
            on_time_rate: 0.0,
        }
    }

    fn record(&mut self, task: &Task) {
        self.total += 1;
        self.progress_sum += u64::from(task.progress.percent());
        if task.is_on_time {
            self.on_time_count += 1;
        }
        if task.status == TaskStatus::Completed {
            self.done_count += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.average_progress = ratio(self.progress_sum as f64, self.total);
        self.on_time_rate = percentage(self.on_time_count, self.total);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_tasks: usize,
    pub completed_count: usize,
    pub completion_rate: f64,
    pub on_time_count: usize,
    pub on_time_rate: f64,
    pub delayed_tasks_count: usize,
    pub total_delay_days: u64,
    pub current_month: YearMonth,
    pub current_month_total: usize,
    pub current_month_breakdown: MonthBreakdown,
    pub backlog_count: usize,
    pub team_performance: Vec<TeamPerformance>,
}

/// Rounds to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn ratio(numerator: f64, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        round1(numerator / denominator as f64)
    }
}

/// `part / whole * 100` to one decimal, `0.0` for an empty whole.
pub fn percentage(part: usize, whole: usize) -> f64 {
    ratio(part as f64 * 100.0, whole)
}

/// Unresolved work from a month strictly before `current`.
pub fn is_backlog(task: &Task, current: YearMonth) -> bool {
    !task.status.is_finished() && task.period.is_some_and(|period| period < current)
}

struct Tally {
    current: YearMonth,
    stats: Stats,
}

impl Tally {
    fn new(today: Date) -> Self {
        let current = YearMonth::of(today);
        Self {
            current,
            stats: Stats {
                total_tasks: 0,
                completed_count: 0,
                completion_rate: 0.0,
                on_time_count: 0,
                on_time_rate: 0.0,
                delayed_tasks_count: 0,
                total_delay_days: 0,
                current_month: current,
                current_month_total: 0,
                current_month_breakdown: MonthBreakdown::default(),
                backlog_count: 0,
                team_performance: Vec::new(),
            },
        }
    }

    fn push(mut self, task: &Task) -> Self {
        let stats = &mut self.stats;
        stats.total_tasks += 1;
        if task.status == TaskStatus::Completed {
            stats.completed_count += 1;
        }
        if task.is_on_time {
            stats.on_time_count += 1;
        }
        if task.current_delay > 0 {
            stats.delayed_tasks_count += 1;
            stats.total_delay_days += u64::from(task.current_delay);
        }
        if task.period == Some(self.current) {
            stats.current_month_total += 1;
            stats.current_month_breakdown = stats
                .current_month_breakdown
                .record(MonthBucket::of(&task.status));
        }
        if is_backlog(task, self.current) {
            stats.backlog_count += 1;
        }

        let team = task.team.as_deref().unwrap_or(OTHER_TEAM);
        match stats.team_performance.iter_mut().find(|entry| entry.name == team) {
            Some(entry) => entry.record(task),
            None => {
                let mut entry = TeamPerformance::empty(team);
                entry.record(task);
                stats.team_performance.push(entry);
            }
        }
        self
    }

    fn finish(self) -> Stats {
        let mut stats = self.stats;
        stats.completion_rate = percentage(stats.completed_count, stats.total_tasks);
        stats.on_time_rate = percentage(stats.on_time_count, stats.total_tasks);
        stats.team_performance = stats
            .team_performance
            .into_iter()
            .map(TeamPerformance::finish)
            .collect();
        stats
    }
}

/// Computes every dashboard metric in a single pass. `today` decides the current month and backlog.
pub fn aggregate(tasks: &[Task], today: Date) -> Stats {
    let stats = tasks.iter().fold(Tally::new(today), Tally::push).finish();
    log::debug!(
        "aggregated {} tasks: {} completed, {} backlog",
        stats.total_tasks,
        stats.completed_count,
        stats.backlog_count
    );
    stats
}
