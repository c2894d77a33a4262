pub mod app_data;
pub mod day;
pub mod goal;

pub use app_data::AppData;
pub use day::{ArchivedDayEntry, DayEntry};
pub use goal::{DurationUnit, Goal, GoalKind, GoalStatus};
