//! noteful-server: HTTP API for bookmarks, folders and notes.
//!
//! This crate provides:
//! - CRUD endpoints for every resource under `/api`
//! - Bearer token authentication on every route
//! - XSS-sanitized output
//! - A central error handler that masks server failures in production
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - CORS handling
//! - Request ID generation
//! - Hardening response headers
//! - JSON error responses
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use noteful_server::{AppState, ServerConfig, build_app};
//! use noteful_store::MemoryStore;
//!
//! let state = AppState::new(Arc::new(MemoryStore::new()), ServerConfig::new("token"));
//! let app = build_app(state)?;
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use app::build_app;
pub use config::{ConfigError, Environment, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;

// Re-export dependent crates
pub use noteful_core;
pub use noteful_store;
