/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(missing_docs)]

//! A memory cache that records which resources can be served without the network.
//! Regular entries expire after their freshness lifetime, entries stored for offline use
//! (the application cache) never do. Only the outcome of a load is kept, not its body.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use navigator_traits::{CacheQuery, Error, Fallible, LoadFlags};
use parking_lot::{Mutex, MutexGuard};
use url::Url;

/// The key used to differentiate requests in the cache.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CacheKey {
    url: Url,
}

impl CacheKey {
    /// Create a key for `url`. Fragments never reach the server, so they are ignored.
    pub fn new(url: &Url) -> CacheKey {
        let mut url = url.clone();
        url.set_fragment(None);
        CacheKey { url }
    }

    /// Retrieve the URL associated with this key
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Which part of the cache an entry lives in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CachePartition {
    /// Responses cached by ordinary loads.
    Regular,
    /// Resources stored for offline use.
    Offline,
}

/// The recorded outcome of a cached load.
#[derive(Clone, Debug)]
pub struct CachedResource {
    status: u16,
    expires: Option<Instant>,
}

impl CachedResource {
    /// The HTTP status of the cached response.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the response was successful.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the entry must be revalidated before it can be used.
    pub fn needs_validation(&self, now: Instant) -> bool {
        self.expires.is_some_and(|expires| expires <= now)
    }
}

/// A memory cache with a regular and an offline partition.
#[derive(Default)]
pub struct HttpCache {
    entries: HashMap<CacheKey, CachedResource>,
    offline_entries: HashMap<CacheKey, CachedResource>,
}

impl HttpCache {
    /// Create a new, empty cache.
    pub fn new() -> HttpCache {
        HttpCache::default()
    }

    /// Record the outcome of a load of `url`. `freshness` is the lifetime of a regular
    /// entry, `None` meaning it never expires; offline entries ignore it. A response
    /// with a zero lifetime is not cacheable and is not stored. Returns whether the
    /// entry was stored.
    pub fn store(
        &mut self,
        partition: CachePartition,
        url: &Url,
        status: u16,
        freshness: Option<Duration>,
    ) -> bool {
        if partition == CachePartition::Regular && freshness == Some(Duration::ZERO) {
            debug!("Not caching {} with a zero freshness lifetime", url);
            return false;
        }
        let expires = match partition {
            // Lifetimes too long to represent never expire.
            CachePartition::Regular => {
                freshness.and_then(|lifetime| Instant::now().checked_add(lifetime))
            },
            CachePartition::Offline => None,
        };
        self.partition_mut(partition)
            .insert(CacheKey::new(url), CachedResource { status, expires });
        true
    }

    /// Look up the entry for `url`, fresh or not.
    pub fn lookup(&self, partition: CachePartition, url: &Url) -> Option<&CachedResource> {
        self.partition(partition).get(&CacheKey::new(url))
    }

    /// Remove the entry for `url`. Returns whether there was one.
    pub fn evict(&mut self, partition: CachePartition, url: &Url) -> bool {
        self.partition_mut(partition)
            .remove(&CacheKey::new(url))
            .is_some()
    }

    /// Remove every entry of both partitions.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.offline_entries.clear();
    }

    /// Whether a load of `url` with `flags` would be answered from this cache with a
    /// successful response. Stale regular entries only count when `LOAD_FROM_CACHE`
    /// allows serving them without revalidation.
    pub fn is_locally_available(&self, url: &Url, flags: LoadFlags) -> bool {
        let now = Instant::now();
        let regular_hit = self.lookup(CachePartition::Regular, url).is_some_and(|entry| {
            entry.is_success() &&
                (!entry.needs_validation(now) || flags.contains(LoadFlags::LOAD_FROM_CACHE))
        });
        if regular_hit {
            return true;
        }
        flags.contains(LoadFlags::LOAD_CHECK_OFFLINE_CACHE) &&
            self.lookup(CachePartition::Offline, url)
                .is_some_and(CachedResource::is_success)
    }

    fn partition(&self, partition: CachePartition) -> &HashMap<CacheKey, CachedResource> {
        match partition {
            CachePartition::Regular => &self.entries,
            CachePartition::Offline => &self.offline_entries,
        }
    }

    fn partition_mut(
        &mut self,
        partition: CachePartition,
    ) -> &mut HashMap<CacheKey, CachedResource> {
        match partition {
            CachePartition::Regular => &mut self.entries,
            CachePartition::Offline => &mut self.offline_entries,
        }
    }
}

/// Answers synchronous "is this available locally" queries against a shared cache.
pub struct LocalCacheQuery {
    cache: Arc<Mutex<HttpCache>>,
}

impl LocalCacheQuery {
    /// Create a query over `cache`.
    pub fn new(cache: Arc<Mutex<HttpCache>>) -> LocalCacheQuery {
        LocalCacheQuery { cache }
    }

    fn lock(&self, flags: LoadFlags) -> Option<MutexGuard<'_, HttpCache>> {
        if flags.contains(LoadFlags::LOAD_BYPASS_LOCAL_CACHE_IF_BUSY) {
            return self.cache.try_lock();
        }
        Some(self.cache.lock())
    }
}

impl CacheQuery for LocalCacheQuery {
    fn is_available(&self, url: &Url, flags: LoadFlags) -> Fallible<bool> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::BadUri);
        }
        let Some(cache) = self.lock(flags) else {
            debug!("Cache is busy, treating {} as not locally available", url);
            return Ok(false);
        };
        Ok(cache.is_locally_available(url, flags))
    }
}
