//! HTTP handlers.

pub mod ccl;
pub mod health;

pub use ccl::{create_ccl, get_ccl, update_ccl};
pub use health::health_check;
