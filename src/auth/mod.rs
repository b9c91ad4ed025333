//! Bearer credential storage
//!
//! The access and refresh tokens are opaque strings: they are stored after
//! login, replayed on every request and cleared on logout or on a 401.

pub mod tokens;

pub use tokens::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenStore};
