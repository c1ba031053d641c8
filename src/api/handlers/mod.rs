//! HTTP request handlers.

pub mod account_handler;
pub mod account_type_handler;
pub mod auth_handler;
pub mod card_handler;
pub mod institution_handler;
pub mod user_handler;

pub use account_handler::account_routes;
pub use account_type_handler::account_type_routes;
pub use auth_handler::auth_routes;
pub use card_handler::card_routes;
pub use institution_handler::institution_routes;
pub use user_handler::user_routes;
