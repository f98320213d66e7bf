//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Axum router with all planner endpoints
//! - Source management (register, list, delete)
//! - Tracks, profiles and delivery decisions per source
//! - CORS middleware

pub mod handlers;
pub mod routes;

pub use routes::create_router;
