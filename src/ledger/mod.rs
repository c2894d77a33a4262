pub mod input;
pub mod merge;
pub mod recalculator;

pub use input::{EntryInput, InputMode};
pub use merge::{
    apply_merge_actions, interactive_merge, merge_import, resolve_conflict, Confirm,
    ConflictChoice, FixedChoice, LedgerSet, MergeAction, MergeOutcome,
};
pub use recalculator::{
    append, archive, delete, delete_archived, edit, rebase, recompute_forward, redate, restore,
    ArchiveRecalculation, Recalculation,
};
