//! Toolcrib-Common: Shared types, identifiers, and error handling.
//!
//! This crate provides functionality used by both the database layer and
//! the server:
//!
//! - **Typed IDs**: Integer newtypes for tools and history events
//! - **Core Types**: The kinds of events recorded in a tool's history
//! - **Error Handling**: Common error type with HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use toolcrib_common::{Error, EventKind, Result, ToolId};
//!
//! let id = ToolId::from(7);
//! assert_eq!(id.to_string(), "7");
//! assert_eq!(EventKind::Checkout.to_string(), "checkout");
//!
//! fn lookup() -> Result<()> {
//!     Err(Error::not_found("tool 7"))
//! }
//! assert!(lookup().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
