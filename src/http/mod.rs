//! HTTP layer
//!
//! An explicitly constructed client with retry, backoff and rate limiting,
//! shared by the fetch components. Replaces the module-global session of
//! earlier designs: callers build a client and pass it where it is needed.

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
