//! Request-processing middleware.

pub mod errors;
pub mod request_id;
