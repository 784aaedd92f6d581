//! Reusable fixtures for forum ACL integration tests.
//!
//! Provides a small portal with a category, sub forums, groups and users,
//! plus store wrappers for counting and failing lookups.
#![allow(dead_code)]

use std::cell::Cell;
use std::io::Write;

use forum_acl::permissions::{
    Forum, ForumId, ForumPrivileges, Group, GroupId, Member, MemoryStore, PrivilegeRecord,
    PrivilegeStore, Topic, User, UserId,
};
use tempfile::NamedTempFile;

pub const ANONYMOUS: GroupId = -1;
pub const REGISTERED: GroupId = 1;
pub const TEAM: GroupId = 2;

pub const CATEGORY: ForumId = 10;
pub const FORUM: ForumId = 11;
pub const TEAM_FORUM: ForumId = 12;
pub const EMPTY_FORUM: ForumId = 13;

pub const TOPIC: i64 = 100;

pub const PLAIN_USER: UserId = 1000;
pub const TEAM_USER: UserId = 1001;
pub const RESTRICTED_USER: UserId = 1002;

pub const NONE: ForumPrivileges = ForumPrivileges::empty();

/// Portal fixture:
/// - category: read for anonymous and registered
/// - forum (child of category): vote for registered
/// - team forum: read, reply and moderate for the team group
/// - empty forum: no records at all
/// - the restricted user has create revoked on the category
pub fn portal() -> MemoryStore {
    let mut store = MemoryStore::new();

    store.add_forum(Forum::new(CATEGORY, "Ubuntu"));
    store.add_forum(Forum::new(FORUM, "Installation").with_parent(CATEGORY));
    store.add_forum(Forum::new(TEAM_FORUM, "Team"));
    store.add_forum(Forum::new(EMPTY_FORUM, "Archive"));

    store.add_topic(Topic {
        id: TOPIC,
        forum_id: TEAM_FORUM,
        title: "Moderation guidelines".to_string(),
    });

    store.add_group(Group {
        id: REGISTERED,
        name: "registered".to_string(),
    });
    store.add_group(Group {
        id: TEAM,
        name: "team".to_string(),
    });

    store.add_member(Member::new(PLAIN_USER, "plain"));
    store.add_member(Member::new(TEAM_USER, "teamer").with_groups([TEAM]));
    store.add_member(Member::new(RESTRICTED_USER, "restricted"));

    store
        .add_privilege(PrivilegeRecord::for_group(
            CATEGORY,
            ANONYMOUS,
            ForumPrivileges::READ,
            NONE,
        ))
        .unwrap();
    store
        .add_privilege(PrivilegeRecord::for_group(
            CATEGORY,
            REGISTERED,
            ForumPrivileges::READ | ForumPrivileges::CREATE,
            NONE,
        ))
        .unwrap();
    store
        .add_privilege(PrivilegeRecord::for_group(
            FORUM,
            REGISTERED,
            ForumPrivileges::VOTE,
            NONE,
        ))
        .unwrap();
    store
        .add_privilege(PrivilegeRecord::for_group(
            TEAM_FORUM,
            TEAM,
            ForumPrivileges::READ | ForumPrivileges::REPLY | ForumPrivileges::MODERATE,
            NONE,
        ))
        .unwrap();
    store
        .add_privilege(PrivilegeRecord::for_user(
            CATEGORY,
            RESTRICTED_USER,
            NONE,
            ForumPrivileges::CREATE,
        ))
        .unwrap();

    store
}

pub fn member(store: &MemoryStore, id: UserId) -> User {
    User::from(store.member(id).cloned().expect("fixture user exists"))
}

/// Write the portal fixture as a JSON snapshot file.
pub fn portal_snapshot_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp snapshot");
    let json = serde_json::to_string_pretty(portal().snapshot()).expect("serialize snapshot");
    file.write_all(json.as_bytes()).expect("write snapshot");
    file
}

/// Store wrapper counting how often records are fetched.
pub struct CountingStore {
    pub inner: MemoryStore,
    pub calls: Cell<usize>,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            calls: Cell::new(0),
        }
    }
}

impl PrivilegeStore for CountingStore {
    type Error = std::convert::Infallible;

    fn privileges(
        &self,
        forum_ids: &[ForumId],
        group_ids: &[GroupId],
        user_id: Option<UserId>,
    ) -> Result<Vec<PrivilegeRecord>, Self::Error> {
        self.calls.set(self.calls.get() + 1);
        self.inner.privileges(forum_ids, group_ids, user_id)
    }
}

/// Store whose backend is always down.
pub struct FailingStore;

impl PrivilegeStore for FailingStore {
    type Error = std::io::Error;

    fn privileges(
        &self,
        _forum_ids: &[ForumId],
        _group_ids: &[GroupId],
        _user_id: Option<UserId>,
    ) -> Result<Vec<PrivilegeRecord>, Self::Error> {
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "database unavailable",
        ))
    }
}
