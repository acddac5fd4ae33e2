//! Administrative overrides.
//!
//! Overrides let an admin rewrite financial and operational records directly.
//! Each one requires a reason, computes a sparse change set from only the
//! fields the caller supplied, refuses to write when nothing would change,
//! and leaves an audit event holding the previous and new value of every
//! changed field.
//!
//! # Modules
//!
//! - `patch` - Three-state field patches and change tracking
//! - `types` - Override inputs and the common outcome

pub mod patch;
pub mod types;

pub use patch::{ChangeSet, FieldChange, FieldPatch};
pub use types::{
    CleaningAssignmentOverride, CleaningRestLevelOverride, EntryOwnerOverride,
    EvaluationScoreOverride, EventDeadlineOverride, EventOverride, FineOverride,
    OccupantOverride, OverrideOutcome, RestoreEntryInput,
};
