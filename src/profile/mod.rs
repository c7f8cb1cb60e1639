//! Farcaster profile resolution for custody addresses.
//!
//! - `types`: `Profile` and the raw `SocialAccount` candidates
//! - `cache`: process-lifetime `ProfileCache` (injected, never evicted)
//! - `resolver`: chunked bulk resolver with in-flight de-duplication
//! - `display`: labels for UI and API responses

pub mod cache;
pub mod display;
pub mod resolver;
pub mod types;

pub use cache::{MemoryProfileCache, ProfileCache};
pub use display::{avatar_url, display_name, shorten_address};
pub use resolver::{BulkProfileResolver, ProfileResolver, ProfileSource};
pub use types::{Profile, SocialAccount};
