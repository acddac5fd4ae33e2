//! Append-only audit trail.
//!
//! Every mutating engine operation writes an [`AuditEvent`]. Writes are best
//! effort: a failed write never fails the mutation, but it is logged at
//! `error` level with structured fields and counted by [`AuditRecorder`] so
//! gaps in the trail are detectable.

pub mod recorder;
pub mod types;

pub use recorder::AuditRecorder;
pub use types::{AuditAction, AuditEvent, AuditFilter};
