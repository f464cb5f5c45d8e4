//! OAuth token management with storage and refresh capabilities.

mod manager;
mod memory;
mod storage;
mod tokens;

pub use manager::Manager;
pub use memory::MemoryStorage;
pub use storage::Storage;
pub use tokens::{RefreshResult, TokenSet};
