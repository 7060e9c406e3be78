//! Wire types for the HTTP API.

pub mod v1;
