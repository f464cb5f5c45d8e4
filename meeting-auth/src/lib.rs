//! # meeting-auth
//!
//! OAuth 2.0 plumbing for the meeting relay:
//! - the provider abstraction and the Zoom implementation (code exchange, refresh)
//! - the token set, the token storage seam and the refresh-serializing token manager
//! - HTTP client building with timeout and transient-failure retry middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use meeting_auth::{
//!     http::AuthenticatedClientBuilder,
//!     oauth::{providers::zoom, token::{Manager, MemoryStorage}},
//! };
//!
//! let client = AuthenticatedClientBuilder::new().build()?;
//! let provider = zoom::Provider::new(credentials, zoom::Urls::default(), client);
//! let manager = Manager::new(MemoryStorage::new());
//! let tokens = manager.exchange_code(&provider, &code).await?;
//! ```

pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind, ProviderResponse};
