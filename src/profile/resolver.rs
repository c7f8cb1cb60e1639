//! Bulk address → profile resolution.
//!
//! Flow for one `resolve` call:
//! 1. Drop invalid addresses, checksum and dedupe the rest.
//! 2. Serve cached entries directly.
//! 3. Claim every uncached address that no other call is already fetching;
//!    wait on the ones that are in flight elsewhere.
//! 4. Fetch claimed addresses in chunks (one source request per chunk,
//!    bounded concurrency). Every chunk address ends up cached: the first
//!    candidate account on success, a fallback profile otherwise.
//! 5. Answer from the cache.
//!
//! Fallbacks are never re-fetched. A failed lookup stays a fallback for the
//! lifetime of the cache.

use alloy::primitives::Address;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::cache::ProfileCache;
use super::types::{Profile, SocialAccount};
use crate::address;
use crate::config::ResolverConfig;

/// External bulk lookup. Keys of the returned map are the addresses the
/// source had accounts for; missing keys mean "no linked account".
#[async_trait]
pub trait ProfileSource: Send + Sync {
    type Error: std::fmt::Display + Send;

    async fn bulk_lookup(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, Vec<SocialAccount>>, Self::Error>;
}

/// Address-keyed profile resolution. Implemented once by
/// [`BulkProfileResolver`]; callers hold it as `Arc<dyn ProfileResolver>`.
#[async_trait]
pub trait ProfileResolver: Send + Sync {
    /// Resolve every valid address in `addresses`. Invalid entries are
    /// dropped; the result is keyed by typed address.
    async fn resolve(&self, addresses: &[String]) -> HashMap<Address, Profile>;

    /// Single-address convenience. `None` for an invalid address.
    async fn resolve_one(&self, address: &str) -> Option<Profile> {
        let addr = address::parse(address)?;
        self.resolve(&[address.to_string()]).await.remove(&addr)
    }
}

pub struct BulkProfileResolver<S> {
    source: S,
    cache: Arc<dyn ProfileCache>,
    /// Addresses with a fetch in progress. The receiver wakes once the
    /// owning call has written the cache (or was dropped).
    pending: Arc<DashMap<Address, watch::Receiver<()>>>,
    chunk_size: usize,
    max_concurrent_chunks: usize,
    /// Source requests issued since construction.
    requests_made: AtomicU64,
}

impl<S: ProfileSource> BulkProfileResolver<S> {
    pub fn new(source: S, cache: Arc<dyn ProfileCache>, config: &ResolverConfig) -> Self {
        Self {
            source,
            cache,
            pending: Arc::new(DashMap::new()),
            chunk_size: config.chunk_size.max(1),
            max_concurrent_chunks: config.max_concurrent_chunks.max(1),
            requests_made: AtomicU64::new(0),
        }
    }

    pub fn requests_made(&self) -> u64 {
        self.requests_made.load(Ordering::Relaxed)
    }

    pub fn cache(&self) -> &Arc<dyn ProfileCache> {
        &self.cache
    }

    /// Resolve already-parsed, de-duplicated addresses.
    pub async fn resolve_addresses(&self, addresses: &[Address]) -> HashMap<Address, Profile> {
        let mut outstanding: Vec<Address> = addresses.to_vec();

        while !outstanding.is_empty() {
            let mut claims = Vec::new();
            let mut waiting = Vec::new();

            for addr in &outstanding {
                if self.cache.get(addr).is_some() {
                    continue;
                }
                match self.pending.entry(*addr) {
                    Entry::Occupied(e) => waiting.push((*addr, e.get().clone())),
                    Entry::Vacant(e) => {
                        // The previous owner writes the cache before it
                        // releases its pending entry.
                        if self.cache.get(addr).is_some() {
                            continue;
                        }
                        let (tx, rx) = watch::channel(());
                        e.insert(rx);
                        claims.push(PendingClaim {
                            pending: Arc::clone(&self.pending),
                            addr: *addr,
                            _done: tx,
                        });
                    }
                }
            }

            if !claims.is_empty() {
                self.fetch_claims(claims).await;
            }

            for (addr, mut rx) in waiting.iter().cloned() {
                debug!(address = %addr, "waiting on in-flight profile lookup");
                // Err means the owner is gone, which also means "done".
                let _ = rx.changed().await;
            }

            // Only a cancelled owner leaves a waited-on address uncached.
            outstanding = waiting
                .into_iter()
                .map(|(addr, _)| addr)
                .filter(|addr| self.cache.get(addr).is_none())
                .collect();
        }

        addresses
            .iter()
            .map(|addr| {
                let profile = self
                    .cache
                    .get(addr)
                    .unwrap_or_else(|| Profile::fallback(addr));
                (*addr, profile)
            })
            .collect()
    }

    async fn fetch_claims(&self, claims: Vec<PendingClaim>) {
        let mut chunks = Vec::new();
        let mut iter = claims.into_iter().peekable();
        while iter.peek().is_some() {
            chunks.push(iter.by_ref().take(self.chunk_size).collect::<Vec<_>>());
        }

        debug!(
            chunks = chunks.len(),
            chunk_size = self.chunk_size,
            "fetching uncached profiles"
        );

        stream::iter(chunks)
            .map(|chunk| self.fetch_chunk(chunk))
            .buffer_unordered(self.max_concurrent_chunks)
            .collect::<Vec<()>>()
            .await;
    }

    async fn fetch_chunk(&self, chunk: Vec<PendingClaim>) {
        let addrs: Vec<Address> = chunk.iter().map(|c| c.addr).collect();
        self.requests_made.fetch_add(1, Ordering::Relaxed);

        match self.source.bulk_lookup(&addrs).await {
            Ok(mut found) => {
                let mut linked = 0usize;
                for addr in &addrs {
                    let profile = match found.remove(addr).and_then(|c| c.into_iter().next()) {
                        Some(account) => {
                            linked += 1;
                            Profile::from_account(addr, account)
                        }
                        None => Profile::fallback(addr),
                    };
                    self.cache.set(*addr, profile);
                }
                debug!(
                    addresses = addrs.len(),
                    linked = linked,
                    "profile chunk resolved"
                );
            }
            Err(e) => {
                warn!(
                    error = %e,
                    addresses = addrs.len(),
                    "profile lookup failed, caching fallbacks for chunk"
                );
                for addr in &addrs {
                    self.cache.set(*addr, Profile::fallback(addr));
                }
            }
        }

        // Cache is written; releasing the claims wakes any waiters.
        drop(chunk);
    }
}

#[async_trait]
impl<S: ProfileSource> ProfileResolver for BulkProfileResolver<S> {
    async fn resolve(&self, addresses: &[String]) -> HashMap<Address, Profile> {
        let parsed = address::parse_batch(addresses);
        if parsed.len() < addresses.len() {
            debug!(
                requested = addresses.len(),
                valid = parsed.len(),
                "dropped invalid or duplicate addresses"
            );
        }
        self.resolve_addresses(&parsed).await
    }
}

/// Ownership of an in-flight address. Dropping it clears the pending entry
/// and then closes the channel, waking waiters.
struct PendingClaim {
    pending: Arc<DashMap<Address, watch::Receiver<()>>>,
    addr: Address,
    _done: watch::Sender<()>,
}

impl Drop for PendingClaim {
    fn drop(&mut self) {
        self.pending.remove(&self.addr);
    }
}
