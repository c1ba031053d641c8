//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Mapping between the two shapes lives next to each entity and is
//! bidirectional: a record and its domain object convert into each other
//! field for field.

pub mod account;
pub mod account_type;
pub mod audit_log;
pub mod card;
pub mod institution;
pub mod user;
