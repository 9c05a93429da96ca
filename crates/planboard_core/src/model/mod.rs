mod action;
pub mod dates;
mod lenient;
mod plan;
mod refs;
mod status;
mod task;

pub use action::Action;
pub use plan::Plan;
pub use refs::{EntityId, StaffRef, UnitRef};
pub use status::{ActionStatus, Progress, TaskStatus};
pub use task::{Assignment, Task};
