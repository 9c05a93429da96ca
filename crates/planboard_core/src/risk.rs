//! Deadline and delay risk classification for the attention table.

use crate::model::Task;
use serde::Serialize;
use time::{Date, PrimitiveDateTime};

/// Tasks due within this many days are flagged as approaching their deadline.
pub const APPROACHING_WINDOW_DAYS: i64 = 3;
pub const PAGE_SIZES: [usize; 3] = [10, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;

const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Notice,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskReason {
    ApproachingDeadline { days: i64 },
    Overdue { days: i64 },
    MultiplyExtended { times: u32 },
    Delayed { days: u32 },
}

impl RiskReason {
    pub fn severity(&self) -> Severity {
        match self {
            Self::ApproachingDeadline { .. } => Severity::Notice,
            Self::Overdue { .. } => Severity::Critical,
            Self::MultiplyExtended { .. } | Self::Delayed { .. } => Severity::Warning,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::ApproachingDeadline { days } => format!("approaching deadline in {days} days"),
            Self::Overdue { days } => format!("overdue by {days} days"),
            Self::MultiplyExtended { times } => format!("extended {times} times"),
            Self::Delayed { days } => format!("delayed {days} days"),
        }
    }

    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::ApproachingDeadline { .. } | Self::Overdue { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskEntry {
    pub task: Task,
    pub days_remaining: Option<i64>,
    pub reason: RiskReason,
    pub label: String,
    pub severity: Severity,
}

/// Whole days from `now` until the start of `deadline`, rounded up.
pub fn days_remaining(deadline: Date, now: PrimitiveDateTime) -> i64 {
    let seconds = (deadline.midnight() - now).whole_seconds();
    -(-seconds).div_euclid(SECONDS_PER_DAY)
}

/// First matching reason in precedence order, or `None` when the task is not at risk.
pub fn reason_for(task: &Task, days_remaining: Option<i64>) -> Option<RiskReason> {
    let open = !task.status.is_finished();
    match days_remaining {
        Some(days) if open && (0..=APPROACHING_WINDOW_DAYS).contains(&days) => {
            return Some(RiskReason::ApproachingDeadline { days });
        }
        Some(days) if open && days < 0 => {
            return Some(RiskReason::Overdue { days: days.abs() });
        }
        _ => {}
    }
    if task.extensions > 1 {
        return Some(RiskReason::MultiplyExtended {
            times: task.extensions,
        });
    }
    if task.current_delay > 0 {
        return Some(RiskReason::Delayed {
            days: task.current_delay,
        });
    }
    None
}

/// [`classify_at`] with the clock at midnight of `today`.
pub fn classify(tasks: &[Task], today: Date) -> Vec<RiskEntry> {
    classify_at(tasks, today.midnight())
}

/// At-risk tasks ordered by current end date, earliest first; undated entries trail in input order.
pub fn classify_at(tasks: &[Task], now: PrimitiveDateTime) -> Vec<RiskEntry> {
    let mut entries: Vec<RiskEntry> = tasks
        .iter()
        .filter_map(|task| {
            let remaining = task
                .current_end_date
                .map(|deadline| days_remaining(deadline, now));
            let reason = reason_for(task, remaining)?;
            Some(RiskEntry {
                task: task.clone(),
                days_remaining: remaining,
                label: reason.label(),
                severity: reason.severity(),
                reason,
            })
        })
        .collect();

    entries.sort_by_key(|entry| {
        (
            entry.task.current_end_date.is_none(),
            entry.task.current_end_date,
        )
    });
    log::debug!("{} of {} tasks flagged at risk", entries.len(), tasks.len());
    entries
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// 1-based index of the first item on this page, `0` when the page is empty.
    pub fn first_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.page - 1) * self.per_page + 1
        }
    }

    pub fn last_index(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_index() + self.items.len() - 1
        }
    }
}

/// Slices `items` into 1-based pages. A zero `per_page` falls back to [`DEFAULT_PAGE_SIZE`].
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        per_page
    };
    let page = page.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    Page {
        items: items[start..end].to_vec(),
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
    }
}
