//! Rust Auth Starter - user registration and token authentication
//!
//! Registers users, checks credentials and issues signed access/refresh
//! token pairs, with Axum in front and SeaORM behind.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core entities, identity validation, password hashing
//! - **services**: Token and user use cases
//! - **infra**: Database, migrations and repositories
//! - **api**: HTTP handlers, middleware, and routes
//! - **utils**: Utility functions and helpers
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User};
pub use errors::{AppError, AppResult};
