//! Upstream catalog clients.
//!
//! This module provides rate-limited, retry-enabled clients for the AniList
//! GraphQL API and the MangaDex REST API. Both translate their payloads into
//! the unified item model before returning.

pub mod anilist;
pub mod error;
pub mod mangadex;
pub mod rate_limiter;
pub mod transport;
pub mod types;

pub use anilist::AniListClient;
pub use error::SourceError;
pub use mangadex::MangaDexClient;
pub use rate_limiter::RateLimiter;
