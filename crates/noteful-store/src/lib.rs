//! noteful-store: Storage layer for the Noteful API
//!
//! This crate provides:
//! - The [`QueryBackend`] trait, the only way services reach a table
//! - [`Store`], the PostgreSQL backend built on sqlx
//! - [`MemoryStore`], an in-process backend for tests and local runs
//! - [`ResourceService`], the five CRUD operations for one resource
//! - Migration management
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use noteful_core::FOLDERS;
//! use noteful_store::{ResourceService, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Arc::new(Store::connect(config).await?);
//!
//! let folders = ResourceService::new(&FOLDERS, store);
//! let all = folders.get_all().await?;
//! ```

pub mod backend;
pub mod error;
pub mod memory;
pub mod schema;
pub mod service;
pub mod store;

pub use backend::QueryBackend;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use service::ResourceService;
pub use store::{Store, StoreConfig};

// Re-export noteful-core for downstream crates
pub use noteful_core;
