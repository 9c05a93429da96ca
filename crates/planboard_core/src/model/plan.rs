use crate::model::lenient;
use crate::model::refs::{EntityId, UnitRef};
use crate::model::task::Task;
use crate::months::{YearMonth, month_range};
use serde::{Deserialize, Serialize};

/// A dated container of work owned by one unit.
///
/// The month bounds are kept as received; a blank or malformed bound makes the
/// plan span empty rather than failing to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: EntityId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub end_month: Option<String>,
    #[serde(default, alias = "unit")]
    pub owner_unit: Option<UnitRef>,
    #[serde(default)]
    pub participants: Vec<UnitRef>,
}

impl Plan {
    pub fn span(&self) -> Option<(YearMonth, YearMonth)> {
        let start = self.start_month.as_deref()?.parse().ok()?;
        let end = self.end_month.as_deref()?.parse().ok()?;
        (start <= end).then_some((start, end))
    }

    pub fn months(&self) -> Vec<YearMonth> {
        self.span()
            .map(|(start, end)| month_range(start, end))
            .unwrap_or_default()
    }

    pub fn contains(&self, month: YearMonth) -> bool {
        self.span()
            .is_some_and(|(start, end)| start <= month && month <= end)
    }

    /// Tasks whose month is missing or outside the plan span.
    pub fn out_of_range<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        tasks
            .iter()
            .filter(|task| !task.period.is_some_and(|period| self.contains(period)))
            .collect()
    }
}
