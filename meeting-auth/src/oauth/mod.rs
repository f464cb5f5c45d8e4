//! OAuth 2.0 authentication infrastructure.
//!
//! Provides the authorization-code flow and token lifecycle for video meeting platforms.

mod provider;

pub mod providers;
pub mod token;

pub use provider::Provider;
