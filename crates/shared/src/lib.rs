//! Shared types and configuration for Warden.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Peso amounts with decimal precision
//! - Pagination types for list endpoints
//! - Actor claims and JWT decoding
//! - Configuration management

pub mod auth;
pub mod config;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, LedgerConfig, ReceiptConfig};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{Amount, AmountError, PageRequest, PageResponse};
