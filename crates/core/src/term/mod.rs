//! Academic term resolution.
//!
//! All balance and clearance computations are scoped to the single active
//! term of a dorm. The resolver is the only writer of "which term is active";
//! callers receive the result as an explicit [`ActiveTerm`] value.
//!
//! # Modules
//!
//! - `types` - Term rows and the resolved active term
//! - `policy` - Calendar rules deriving a term window from a date
//! - `resolver` - Find-or-create of the active term

pub mod policy;
pub mod resolver;
pub mod types;

pub use policy::{TermPolicy, TermWindow};
pub use resolver::TermResolver;
pub use types::{ActiveTerm, Term, TermStatus};
