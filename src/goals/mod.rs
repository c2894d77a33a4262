pub mod evaluator;
pub mod manager;

pub use evaluator::{base_progress, check_and_update_status, hit_rate, progress, trailing_streak};
pub use manager::{
    add_goal, complete_goal, delete_goal, edit_goal, evaluate_all, goal_summary, GoalDraft,
    GoalSummary,
};
