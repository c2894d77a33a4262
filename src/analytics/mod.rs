pub mod projection;
pub mod stats;

pub use projection::{days_to_reach, project, ProjectionPoint};
pub use stats::{max_drawdown, DayHighlight, LedgerStats};
