//! Toolcrib-DB: Database schema, migrations, and query operations
//!
//! This crate provides database functionality for toolcrib using SQLite
//! with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use toolcrib_db::pool::{init_pool, get_conn};
//! use toolcrib_db::queries::tools::{self, NewTool};
//!
//! let pool = init_pool("/var/data/toolcrib.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let tool = tools::create_tool(&conn, &NewTool::named("Hammer drill")).unwrap();
//! println!("Created tool {}", tool.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
