/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod auth;
pub mod client;
pub mod emission;
pub mod error;
pub mod swap;

pub use error::{CarbonHubError, Result};

pub use client::{CarbonHubClient, ClientConfig, DEFAULT_API_HOST};
