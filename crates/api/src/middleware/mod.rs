//! Request middleware and extractors.

pub mod auth;

pub use auth::{Actor, auth_middleware};
