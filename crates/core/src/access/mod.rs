//! Actor context and role-based access rules.
//!
//! Authentication happens outside the engine. Every engine operation receives
//! an [`ActorContext`] naming the user, their dorm, and their role, and checks
//! it against [`AccessPolicy`] before touching the store.
//!
//! # Modules
//!
//! - `types` - Roles and the actor context
//! - `policy` - Which roles may exercise which capabilities

pub mod policy;
pub mod types;

pub use policy::{AccessPolicy, Capability};
pub use types::{ActorContext, Role};
