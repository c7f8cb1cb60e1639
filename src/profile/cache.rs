//! Process-lifetime profile cache: canonical address → Profile.
//!
//! Unbounded and never evicted. Entries are overwritten wholesale on
//! re-resolution and never expire, so a fallback stays cached until restart.

use alloy::primitives::Address;
use dashmap::DashMap;
use std::sync::Arc;

use super::types::Profile;

/// Storage behind the resolver. Injected so each resolver (and each test)
/// can own its own instance.
pub trait ProfileCache: Send + Sync {
    fn get(&self, addr: &Address) -> Option<Profile>;

    /// Insert or overwrite unconditionally.
    fn set(&self, addr: Address, profile: Profile);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe in-memory cache.
#[derive(Clone, Default)]
pub struct MemoryProfileCache {
    entries: Arc<DashMap<Address, Profile>>,
}

impl MemoryProfileCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileCache for MemoryProfileCache {
    fn get(&self, addr: &Address) -> Option<Profile> {
        self.entries.get(addr).map(|e| e.clone())
    }

    fn set(&self, addr: Address, profile: Profile) {
        self.entries.insert(addr, profile);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
