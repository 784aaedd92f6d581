//! Privilege resolution logic.
//!
//! Computes the effective privileges of a user for a set of forums.

use std::collections::{BTreeMap, BTreeSet};

use super::cache::{cache_key, PrivilegeCache, DEFAULT_PREFIX};
use super::groups::{effective_groups, GroupRegistry};
use super::models::{
    ForumId, ForumScoped, GroupId, PrivilegeMap, PrivilegeRecord, PrivilegeSubject, User, UserId,
};
use super::privileges::ForumPrivileges;
use super::store::PrivilegeStore;

/// Positive and negative bits collected for one forum.
#[derive(Debug, Clone, Copy, Default)]
struct Grants {
    group_positive: ForumPrivileges,
    group_negative: ForumPrivileges,
    user_positive: ForumPrivileges,
    user_negative: ForumPrivileges,
    has_user_record: bool,
}

impl Grants {
    fn effective(self) -> ForumPrivileges {
        // Any user record replaces the group result for this forum entirely,
        // even one that only revokes.
        if self.has_user_record {
            self.user_positive & !self.user_negative
        } else {
            self.group_positive & !self.group_negative
        }
    }
}

/// Compute effective privileges from already fetched records.
///
/// Resolution per forum:
/// 1. OR all positive and all negative bits of records for `group_ids`
/// 2. Group result is `positive & !negative` (any revoke beats any grant)
/// 3. If `user_id` has at least one record on the forum, the user result
///    `positive & !negative` replaces the group result
///
/// Every id in `forum_ids` is present in the result. Records for forums that
/// were not requested, or for other groups and users, are ignored.
pub fn join_privileges(
    forum_ids: &[ForumId],
    records: &[PrivilegeRecord],
    group_ids: &[GroupId],
    user_id: Option<UserId>,
) -> PrivilegeMap {
    let mut grants: BTreeMap<ForumId, Grants> = forum_ids
        .iter()
        .map(|&id| (id, Grants::default()))
        .collect();

    for record in records {
        let Some(entry) = grants.get_mut(&record.forum_id) else {
            continue;
        };
        match record.subject {
            PrivilegeSubject::Group(id) if group_ids.contains(&id) => {
                entry.group_positive |= record.positive;
                entry.group_negative |= record.negative;
            }
            PrivilegeSubject::User(id) if Some(id) == user_id => {
                entry.user_positive |= record.positive;
                entry.user_negative |= record.negative;
                entry.has_user_record = true;
            }
            _ => {}
        }
    }

    grants
        .into_iter()
        .map(|(id, grants)| (id, grants.effective()))
        .collect()
}

/// Resolves effective forum privileges, consulting a cache first.
///
/// Cache failures are logged and never surface. Store errors are returned
/// unchanged.
#[derive(Debug)]
pub struct PrivilegeResolver<S, G, C> {
    store: S,
    groups: G,
    cache: C,
    prefix: String,
}

impl<S, G, C> PrivilegeResolver<S, G, C>
where
    S: PrivilegeStore,
    G: GroupRegistry,
    C: PrivilegeCache,
{
    pub fn new(store: S, groups: G, cache: C) -> Self {
        Self {
            store,
            groups,
            cache,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Use a different cache key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable store access. Cached maps are not touched; invalidate them
    /// after changing records.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub const fn cache(&self) -> &C {
        &self.cache
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Effective privileges of `user` for each of `forums`.
    ///
    /// An empty input (including `None::<&Forum>`) yields an empty map.
    /// Duplicate forums collapse into one entry.
    /// Ids are passed on to the store in ascending order.
    #[tracing::instrument(skip_all, fields(user_id = ?user.id()))]
    pub fn get_privileges<'a, I, F>(&self, user: &User, forums: I) -> Result<PrivilegeMap, S::Error>
    where
        I: IntoIterator<Item = &'a F>,
        F: ForumScoped + ?Sized + 'a,
    {
        let forum_ids: Vec<ForumId> = forums
            .into_iter()
            .map(|forum| forum.forum_id())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if forum_ids.is_empty() {
            return Ok(PrivilegeMap::new());
        }

        let key = cache_key(&self.prefix, user, &forum_ids);
        match self.cache.get(&key) {
            Ok(Some(map)) => {
                tracing::trace!(%key, "Privilege cache hit");
                return Ok(map);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Privilege cache read failed, computing directly: {}", e),
        }

        let map = self.compute(user, &forum_ids)?;

        if let Err(e) = self.cache.set(&key, &map) {
            tracing::warn!("Failed to cache resolved privileges: {}", e);
        }

        Ok(map)
    }

    /// Resolve without touching the cache.
    pub fn compute(&self, user: &User, forum_ids: &[ForumId]) -> Result<PrivilegeMap, S::Error> {
        let group_ids = effective_groups(user, &self.groups);
        let records = self.store.privileges(forum_ids, &group_ids, user.id())?;
        tracing::debug!(
            forums = forum_ids.len(),
            records = records.len(),
            "Resolving forum privileges"
        );
        Ok(join_privileges(forum_ids, &records, &group_ids, user.id()))
    }

    /// Effective privileges of `user` on a single forum.
    pub fn get_forum_privileges<F>(&self, user: &User, forum: &F) -> Result<ForumPrivileges, S::Error>
    where
        F: ForumScoped + ?Sized,
    {
        let map = self.get_privileges(user, [forum])?;
        Ok(map
            .get(&forum.forum_id())
            .copied()
            .unwrap_or(ForumPrivileges::DISALLOW_ALL))
    }

    /// Check if `user` holds any of `privilege` on a forum or on the forum of
    /// a topic.
    pub fn have_privilege<F>(
        &self,
        user: &User,
        obj: &F,
        privilege: ForumPrivileges,
    ) -> Result<bool, S::Error>
    where
        F: ForumScoped + ?Sized,
    {
        Ok(self.get_forum_privileges(user, obj)?.intersects(privilege))
    }
}
