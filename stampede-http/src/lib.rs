//! HTTP client functionality for Stampede
//!
//! A thin wrapper around a pooled `reqwest::Client`, tuned for the
//! virtual-user workload: bounded per-host connections, DNS-cache retention
//! through pool idle timeouts, and a default timeout that individual test
//! plans may override per request. Transport failures are folded into the
//! returned outcome rather than surfaced as errors, so a request loop never
//! has to handle a fallible call.

pub mod client;
pub mod errors;
pub mod types;

pub use client::{PooledClient, RequestOutcome};
pub use errors::HttpError;
pub use types::{HttpMethod, HttpMethodError};
