//! Domain layer of the Zoom meeting relay.
//!
//! Ties the OAuth plumbing from `meeting-auth` to the meeting provider: the
//! file-backed token store, the Zoom meeting client and the operations the web
//! layer drives (authorize, exchange-and-schedule, schedule with the stored token).

pub mod error;
pub mod gateway;
pub mod meeting;
pub mod oauth_connection;
pub mod oauth_token_storage;

pub use meeting_auth::oauth::token::{
    Manager as TokenManager, MemoryStorage, Storage as TokenStorage, TokenSet,
};
