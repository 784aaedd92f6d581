//! Privilege Cache
//!
//! Resolved privilege maps are cached per user scope and requested forum set.
//! Keys look like `forum/acls/user:42/<sha256 of the sorted forum ids>`, so
//! everything cached for one user can be dropped with a single prefix delete.
//!
//! The cache owns eviction. Whoever changes privilege records or group
//! memberships must invalidate the affected prefixes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};

use super::models::{ForumId, PrivilegeMap, User, UserId};

/// Default key prefix for cached privilege maps.
pub const DEFAULT_PREFIX: &str = "forum/acls";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable")]
    Unavailable,

    #[error("Cache backend error: {0}")]
    Backend(String),
}

/// Key-value cache for resolved privilege maps.
pub trait PrivilegeCache {
    fn get(&self, key: &str) -> Result<Option<PrivilegeMap>, CacheError>;

    fn set(&self, key: &str, map: &PrivilegeMap) -> Result<(), CacheError>;

    /// Delete every key starting with `prefix`. Returns the number removed.
    fn delete_pattern(&self, prefix: &str) -> Result<usize, CacheError>;

    fn clear(&self) -> Result<(), CacheError>;
}

impl<T: PrivilegeCache + ?Sized> PrivilegeCache for &T {
    fn get(&self, key: &str) -> Result<Option<PrivilegeMap>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, map: &PrivilegeMap) -> Result<(), CacheError> {
        (**self).set(key, map)
    }

    fn delete_pattern(&self, prefix: &str) -> Result<usize, CacheError> {
        (**self).delete_pattern(prefix)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }
}

impl<T: PrivilegeCache + ?Sized> PrivilegeCache for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<PrivilegeMap>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, map: &PrivilegeMap) -> Result<(), CacheError> {
        (**self).set(key, map)
    }

    fn delete_pattern(&self, prefix: &str) -> Result<usize, CacheError> {
        (**self).delete_pattern(prefix)
    }

    fn clear(&self) -> Result<(), CacheError> {
        (**self).clear()
    }
}

/// A cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl PrivilegeCache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<PrivilegeMap>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _map: &PrivilegeMap) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete_pattern(&self, _prefix: &str) -> Result<usize, CacheError> {
        Ok(0)
    }

    fn clear(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Thread-safe in-process cache.
///
/// Can be switched offline with [`MemoryCache::set_available`], after which
/// every call fails with [`CacheError::Unavailable`].
#[derive(Debug)]
pub struct MemoryCache {
    entries: DashMap<String, PrivilegeMap>,
    available: AtomicBool,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn check_available(&self) -> Result<(), CacheError> {
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CacheError::Unavailable)
        }
    }
}

impl PrivilegeCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<PrivilegeMap>, CacheError> {
        self.check_available()?;
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, map: &PrivilegeMap) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries.insert(key.to_string(), map.clone());
        Ok(())
    }

    fn delete_pattern(&self, prefix: &str) -> Result<usize, CacheError> {
        self.check_available()?;
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    fn clear(&self) -> Result<(), CacheError> {
        self.check_available()?;
        self.entries.clear();
        Ok(())
    }
}

/// Cache scope segment for a user.
fn user_scope(user: &User) -> String {
    match user.id() {
        Some(id) => format!("user:{id}"),
        None => "anonymous".to_string(),
    }
}

/// Cache key for `user` resolving exactly the given forum set.
///
/// Order and duplicates in `forum_ids` do not change the key.
pub fn cache_key(prefix: &str, user: &User, forum_ids: &[ForumId]) -> String {
    let mut ids = forum_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut hasher = Sha256::new();
    for id in &ids {
        hasher.update(id.to_be_bytes());
    }
    let digest = hex::encode(hasher.finalize());

    format!("{prefix}/{}/{digest}", user_scope(user))
}

/// Prefix covering every cached map of one user.
pub fn user_prefix(prefix: &str, user_id: UserId) -> String {
    format!("{prefix}/user:{user_id}/")
}

/// Prefix covering every cached map of anonymous requests.
pub fn anonymous_prefix(prefix: &str) -> String {
    format!("{prefix}/anonymous/")
}

/// Drop everything cached for one user (their own records changed, or they
/// joined or left a group).
pub fn invalidate_user(
    cache: &impl PrivilegeCache,
    prefix: &str,
    user_id: UserId,
) -> Result<usize, CacheError> {
    let removed = cache.delete_pattern(&user_prefix(prefix, user_id))?;
    tracing::debug!(user_id, removed, "Invalidated cached privileges for user");
    Ok(removed)
}

/// Drop everything cached for anonymous requests.
pub fn invalidate_anonymous(cache: &impl PrivilegeCache, prefix: &str) -> Result<usize, CacheError> {
    cache.delete_pattern(&anonymous_prefix(prefix))
}

/// Drop every cached privilege map. Needed whenever a group record changes,
/// since it can affect any member.
pub fn invalidate_all(cache: &impl PrivilegeCache, prefix: &str) -> Result<usize, CacheError> {
    let removed = cache.delete_pattern(&format!("{prefix}/"))?;
    tracing::debug!(removed, "Invalidated all cached privileges");
    Ok(removed)
}
