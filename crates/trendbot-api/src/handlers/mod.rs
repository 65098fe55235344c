//! HTTP request handlers.

pub mod analyze;
pub mod health;

pub use analyze::{analyze, method_not_allowed, not_found};
pub use health::{health, ready};
