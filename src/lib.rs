//! Toolcrib - tool inventory service
//!
//! This library crate exposes the core functionality for integration testing.

pub mod config;
pub mod deploy;
pub mod launcher;
pub mod server;
pub mod uploads;
