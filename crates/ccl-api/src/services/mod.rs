//! Service layer for business logic.

pub mod ccl_service;

pub use ccl_service::CclService;
