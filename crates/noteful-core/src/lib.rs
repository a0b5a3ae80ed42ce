//! noteful-core: Shared definitions for the Noteful API
//!
//! This crate provides:
//! - Static definitions of the three resources (bookmarks, folders, notes)
//! - Request field helpers (required-field and partial-update checks)
//! - Outbound serialization with XSS filtering of every listed field
//!
//! Everything here is pure and synchronous; the store and server crates
//! build the generic service and router on top of [`ResourceDef`].

pub mod resource;
pub mod sanitize;

pub use resource::{
    BOOKMARKS, FOLDERS, Field, FieldKind, NOTES, RESOURCES, Record, ResourceDef, ResourceId,
    is_truthy,
};
pub use sanitize::{sanitize_html, sanitize_value};
