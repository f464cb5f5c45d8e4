//! Clients for the external meeting provider.

pub mod oauth;
pub mod zoom;
