//! Wire layer: typed payloads and the REST API client.

pub mod api;
pub mod types;
