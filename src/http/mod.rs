//! HTTP server module
//!
//! This module handles HTTP request routing and handling:
//! - Subtitle endpoint with auto-sync and manual offset
//! - Movie-hash endpoint
//! - Health, version and cache debug endpoints
//! - CORS middleware

pub mod handlers;
pub mod routes;

pub use routes::create_router;
