use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Lifecycle state of a monthly task.
///
/// Unrecognised wire values are preserved in [`TaskStatus::Unknown`] so that
/// aggregation can route them to a fallback bucket instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Overdue,
    /// The assignee withdrew their commitment; counted with in-progress work.
    Withdrawn,
    Unknown(String),
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "PENDING" | "NOT_STARTED" => return Self::Pending,
            "IN_PROGRESS" => return Self::InProgress,
            "COMPLETED" | "DONE" => return Self::Completed,
            "CANCELLED" | "CANCELED" => return Self::Cancelled,
            "OVERDUE" => return Self::Overdue,
            "WITHDRAWN" => return Self::Withdrawn,
            _ => {}
        }
        match trimmed {
            "Chưa bắt đầu" | "Chờ xử lý" => Self::Pending,
            "Đang thực hiện" => Self::InProgress,
            "Hoàn thành" => Self::Completed,
            "Hủy bỏ" => Self::Cancelled,
            "Quá hạn" => Self::Overdue,
            "Rút lại lời hứa" => Self::Withdrawn,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Overdue => "OVERDUE",
            Self::Withdrawn => "WITHDRAWN",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Overdue => "overdue",
            Self::Withdrawn => "withdrawn",
            Self::Unknown(raw) => raw,
        }
    }

    /// Completed and cancelled tasks no longer carry deadline risk or backlog weight.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Progress shown for a task whose status changed without an explicit progress value.
    pub fn default_progress(&self) -> Progress {
        match self {
            Self::Completed => Progress::FULL,
            Self::InProgress => Progress::from_percent(50),
            Self::Overdue => Progress::from_percent(90),
            Self::Pending | Self::Cancelled | Self::Withdrawn | Self::Unknown(_) => Progress::ZERO,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(TaskStatus::parse).unwrap_or_default())
    }
}

/// Lifecycle state of a single-owner action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ActionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl ActionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().replace([' ', '-'], "_").as_str() {
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETED" | "DONE" => Self::Completed,
            _ => Self::Pending,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "waiting",
            Self::InProgress => "working",
            Self::Completed => "completed",
        }
    }
}

impl Serialize for ActionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for ActionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(ActionStatus::parse).unwrap_or_default())
    }
}

/// Completion percentage, always held as an integer in `0..=100`.
///
/// Wire values arrive in two shapes: integer percentages from the planning
/// views and `0.0..=1.0` fractions from the personal task views. JSON integers
/// are read as percentages, floats within `[0, 1]` as fractions, any other
/// float as a percentage. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Progress = Progress(0);
    pub const FULL: Progress = Progress(100);

    pub fn from_percent(percent: i64) -> Self {
        Self(percent.clamp(0, 100) as u8)
    }

    pub fn from_fraction(fraction: f64) -> Self {
        Self::from_float_percent(fraction * 100.0)
    }

    fn from_float_percent(percent: f64) -> Self {
        if percent.is_nan() {
            return Self::ZERO;
        }
        Self(percent.round().clamp(0.0, 100.0) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }

    pub fn as_fraction(&self) -> f64 {
        f64::from(self.0) / 100.0
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Serialize for Progress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

struct ProgressVisitor;

impl Visitor<'_> for ProgressVisitor {
    type Value = Progress;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a percentage or a fraction")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Progress, E> {
        Ok(Progress::from_percent(value.min(100) as i64))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Progress, E> {
        Ok(Progress::from_percent(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Progress, E> {
        if (0.0..=1.0).contains(&value) {
            Ok(Progress::from_fraction(value))
        } else {
            Ok(Progress::from_float_percent(value))
        }
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Progress, E> {
        let trimmed = value.trim().trim_end_matches('%');
        if let Ok(percent) = trimmed.parse::<i64>() {
            return self.visit_i64(percent);
        }
        trimmed
            .parse::<f64>()
            .map_err(|_| E::custom(format!("invalid progress '{value}'")))
            .and_then(|parsed| self.visit_f64(parsed))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Progress, E> {
        Ok(Progress::ZERO)
    }

    fn visit_none<E: de::Error>(self) -> Result<Progress, E> {
        Ok(Progress::ZERO)
    }
}

impl<'de> Deserialize<'de> for Progress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ProgressVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionStatus, Progress, TaskStatus};

    #[test]
    fn parses_wire_and_dashboard_labels() {
        assert_eq!(TaskStatus::parse("IN_PROGRESS"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("in-progress"), TaskStatus::InProgress);
        assert_eq!(TaskStatus::parse("Hoàn thành"), TaskStatus::Completed);
        assert_eq!(TaskStatus::parse("Rút lại lời hứa"), TaskStatus::Withdrawn);
        assert_eq!(
            TaskStatus::parse("ON_HOLD"),
            TaskStatus::Unknown("ON_HOLD".into())
        );
    }

    #[test]
    fn unknown_status_round_trips() {
        let status: TaskStatus = serde_json::from_str("\"ON_HOLD\"").unwrap();
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"ON_HOLD\"");
        let missing: TaskStatus = serde_json::from_str("null").unwrap();
        assert_eq!(missing, TaskStatus::Pending);
    }

    #[test]
    fn finished_covers_completed_and_cancelled_only() {
        assert!(TaskStatus::Completed.is_finished());
        assert!(TaskStatus::Cancelled.is_finished());
        assert!(!TaskStatus::Withdrawn.is_finished());
        assert!(!TaskStatus::Unknown("x".into()).is_finished());
    }

    #[test]
    fn default_progress_per_status() {
        assert_eq!(TaskStatus::Completed.default_progress().percent(), 100);
        assert_eq!(TaskStatus::InProgress.default_progress().percent(), 50);
        assert_eq!(TaskStatus::Overdue.default_progress().percent(), 90);
        assert_eq!(TaskStatus::Pending.default_progress().percent(), 0);
    }

    #[test]
    fn progress_reads_percentages_and_fractions() {
        let read = |raw: &str| serde_json::from_str::<Progress>(raw).unwrap().percent();
        assert_eq!(read("65"), 65);
        assert_eq!(read("1"), 1);
        assert_eq!(read("0.65"), 65);
        assert_eq!(read("1.0"), 100);
        assert_eq!(read("42.4"), 42);
        assert_eq!(read("250"), 100);
        assert_eq!(read("-3"), 0);
        assert_eq!(read("\"40%\""), 40);
        assert_eq!(read("null"), 0);
    }

    #[test]
    fn progress_fraction_boundary() {
        assert_eq!(Progress::from_percent(25).as_fraction(), 0.25);
        assert_eq!(serde_json::to_string(&Progress::from_fraction(0.5)).unwrap(), "50");
    }

    #[test]
    fn action_status_falls_back_to_pending() {
        assert_eq!(ActionStatus::parse("COMPLETED"), ActionStatus::Completed);
        assert_eq!(ActionStatus::parse("whatever"), ActionStatus::Pending);
    }
}
