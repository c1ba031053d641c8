//! fintrack-api - personal finance backend
//!
//! CRUD backend for users, financial institutions, account types, accounts
//! and cards, built on Axum and SeaORM. Business logic reaches storage only
//! through repository ports inside a Unit-of-Work scope: one scope is one
//! transaction, commit is opt-in, and every state-changing operation emits
//! one audit event over a best-effort channel.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities (no storage awareness)
//! - **services**: Application use cases over the Unit of Work
//! - **infra**: Database, repositories, Unit of Work, audit sink
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error taxonomy
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
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Account, Actor, Card, FinancialInstitution, Password, User, UserRole};
pub use errors::{AppError, AppResult};
