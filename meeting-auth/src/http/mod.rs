//! Shared HTTP client for provider calls.

mod client;
mod retry;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig};
pub use retry::{BackoffPolicy, ConnectFailureStrategy};
