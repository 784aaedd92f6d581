//! Privilege record storage.
//!
//! The resolver reads privilege rows through [`PrivilegeStore`]. Production
//! code backs it with the portal database. [`MemoryStore`] keeps everything in
//! memory and can be loaded from a JSON snapshot for tooling and tests.

use std::collections::HashSet;
use std::convert::Infallible;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AclError, Result};

use super::models::{
    Forum, ForumId, Group, GroupId, Member, PrivilegeRecord, PrivilegeSubject, Topic, TopicId,
    UserId,
};

/// Source of privilege records.
pub trait PrivilegeStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All records on one of `forum_ids` that target a group in `group_ids`
    /// or the user `user_id`.
    fn privileges(
        &self,
        forum_ids: &[ForumId],
        group_ids: &[GroupId],
        user_id: Option<UserId>,
    ) -> Result<Vec<PrivilegeRecord>, Self::Error>;
}

impl<T: PrivilegeStore + ?Sized> PrivilegeStore for &T {
    type Error = T::Error;

    fn privileges(
        &self,
        forum_ids: &[ForumId],
        group_ids: &[GroupId],
        user_id: Option<UserId>,
    ) -> Result<Vec<PrivilegeRecord>, Self::Error> {
        (**self).privileges(forum_ids, group_ids, user_id)
    }
}

/// Serialized form of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub forums: Vec<Forum>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub users: Vec<Member>,
    #[serde(default)]
    pub privileges: Vec<PrivilegeRecord>,
}

/// In-memory privilege store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a snapshot, rejecting records on unknown forums.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        let known: HashSet<ForumId> = snapshot.forums.iter().map(|f| f.id).collect();
        for record in &snapshot.privileges {
            validate_record(record, |id| known.contains(&id))?;
        }
        Ok(Self { snapshot })
    }

    /// Parse a JSON snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    /// Load a JSON snapshot file.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let store = Self::from_json(&json)?;
        tracing::debug!(
            forums = store.snapshot.forums.len(),
            privileges = store.snapshot.privileges.len(),
            "Loaded privilege snapshot"
        );
        Ok(store)
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn forums(&self) -> &[Forum] {
        &self.snapshot.forums
    }

    pub fn groups(&self) -> &[Group] {
        &self.snapshot.groups
    }

    pub fn records(&self) -> &[PrivilegeRecord] {
        &self.snapshot.privileges
    }

    pub fn forum(&self, id: ForumId) -> Option<&Forum> {
        self.snapshot.forums.iter().find(|f| f.id == id)
    }

    pub fn topic(&self, id: TopicId) -> Option<&Topic> {
        self.snapshot.topics.iter().find(|t| t.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.snapshot.groups.iter().find(|g| g.id == id)
    }

    pub fn member(&self, id: UserId) -> Option<&Member> {
        self.snapshot.users.iter().find(|u| u.id == id)
    }

    pub fn add_forum(&mut self, forum: Forum) {
        self.snapshot.forums.push(forum);
    }

    pub fn add_topic(&mut self, topic: Topic) {
        self.snapshot.topics.push(topic);
    }

    pub fn add_group(&mut self, group: Group) {
        self.snapshot.groups.push(group);
    }

    pub fn add_member(&mut self, member: Member) {
        self.snapshot.users.push(member);
    }

    /// Add a record. Like [`MemoryStore::from_snapshot`], records on forums
    /// the store does not know are rejected.
    pub fn add_privilege(&mut self, record: PrivilegeRecord) -> Result<()> {
        validate_record(&record, |id| self.forum(id).is_some())?;
        self.snapshot.privileges.push(record);
        Ok(())
    }

    /// Drop every record targeting `subject`. Returns how many were removed.
    pub fn remove_privileges(&mut self, subject: PrivilegeSubject) -> usize {
        let before = self.snapshot.privileges.len();
        self.snapshot.privileges.retain(|r| r.subject != subject);
        before - self.snapshot.privileges.len()
    }
}

impl PrivilegeStore for MemoryStore {
    type Error = Infallible;

    fn privileges(
        &self,
        forum_ids: &[ForumId],
        group_ids: &[GroupId],
        user_id: Option<UserId>,
    ) -> Result<Vec<PrivilegeRecord>, Infallible> {
        let forum_ids: HashSet<ForumId> = forum_ids.iter().copied().collect();
        let records = self
            .snapshot
            .privileges
            .iter()
            .filter(|r| forum_ids.contains(&r.forum_id))
            .filter(|r| match r.subject {
                PrivilegeSubject::Group(id) => group_ids.contains(&id),
                PrivilegeSubject::User(id) => Some(id) == user_id,
            })
            .cloned()
            .collect();
        Ok(records)
    }
}

/// Records must sit on a known forum. Contradictory records are accepted,
/// the revoked bits win during resolution.
fn validate_record(record: &PrivilegeRecord, is_known: impl Fn(ForumId) -> bool) -> Result<()> {
    if !is_known(record.forum_id) {
        return Err(AclError::UnknownForum(record.forum_id));
    }
    if record.is_contradictory() {
        tracing::warn!(
            forum_id = record.forum_id,
            subject = ?record.subject,
            "Privilege record grants and revokes the same bit"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::privileges::ForumPrivileges;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_forum(Forum::new(1, "Support"));
        store.add_forum(Forum::new(2, "Offtopic"));
        store
            .add_privilege(PrivilegeRecord::for_group(
                1,
                1,
                ForumPrivileges::READ,
                ForumPrivileges::empty(),
            ))
            .unwrap();
        store
            .add_privilege(PrivilegeRecord::for_group(
                2,
                7,
                ForumPrivileges::VOTE,
                ForumPrivileges::empty(),
            ))
            .unwrap();
        store
            .add_privilege(PrivilegeRecord::for_user(
                1,
                42,
                ForumPrivileges::empty(),
                ForumPrivileges::CREATE,
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_filters_by_forum() {
        let rows = store().privileges(&[2], &[1, 7], Some(42)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].forum_id, 2);
    }

    #[test]
    fn test_filters_by_group_or_user() {
        let rows = store().privileges(&[1, 2], &[1], Some(42)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.forum_id == 1));

        let rows = store().privileges(&[1, 2], &[1], None).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_user_level());
    }

    #[test]
    fn test_empty_forum_list_returns_nothing() {
        assert!(store().privileges(&[], &[1, 7], Some(42)).unwrap().is_empty());
    }

    #[test]
    fn test_remove_privileges() {
        let mut store = store();
        assert_eq!(store.remove_privileges(PrivilegeSubject::User(42)), 1);
        assert_eq!(store.records().len(), 2);
        assert_eq!(store.remove_privileges(PrivilegeSubject::User(42)), 0);
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "forums": [{"id": 1, "name": "Support"}],
            "groups": [{"id": 1, "name": "registered"}],
            "users": [{"id": 3, "username": "kim", "groups": [1]}],
            "privileges": [{"forum_id": 1, "group_id": 1, "positive": 2}]
        }"#;
        let store = MemoryStore::from_json(json).unwrap();
        assert_eq!(store.forum(1).map(|f| f.name.as_str()), Some("Support"));
        assert_eq!(store.member(3).map(|m| m.groups.clone()), Some(vec![1]));
        assert_eq!(store.group(1).map(|g| g.name.as_str()), Some("registered"));
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn test_from_json_rejects_unknown_forum() {
        let json = r#"{"privileges": [{"forum_id": 9, "group_id": 1, "positive": 2}]}"#;
        let err = MemoryStore::from_json(json).unwrap_err();
        assert!(matches!(err, AclError::UnknownForum(9)));
    }

    #[test]
    fn test_add_privilege_rejects_unknown_forum() {
        let mut store = store();
        let err = store
            .add_privilege(PrivilegeRecord::for_group(
                9,
                1,
                ForumPrivileges::READ,
                ForumPrivileges::empty(),
            ))
            .unwrap_err();
        assert!(matches!(err, AclError::UnknownForum(9)));
        assert_eq!(store.records().len(), 3);

        // Same rule as loading a snapshot
        let snapshot = Snapshot {
            privileges: vec![PrivilegeRecord::for_group(
                9,
                1,
                ForumPrivileges::READ,
                ForumPrivileges::empty(),
            )],
            ..Snapshot::default()
        };
        assert!(matches!(
            MemoryStore::from_snapshot(snapshot),
            Err(AclError::UnknownForum(9))
        ));
    }

    #[test]
    fn test_add_privilege_accepts_contradictory_record() {
        let mut store = store();
        store
            .add_privilege(PrivilegeRecord::for_group(
                2,
                1,
                ForumPrivileges::READ,
                ForumPrivileges::READ,
            ))
            .unwrap();
        assert_eq!(store.records().len(), 4);
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = MemoryStore::from_json("{not json").unwrap_err();
        assert!(matches!(err, AclError::Json(_)));
    }

    #[test]
    fn test_reference_store() {
        fn count<S: PrivilegeStore<Error = Infallible>>(store: S) -> usize {
            store.privileges(&[1], &[1], None).unwrap().len()
        }

        let store = store();
        assert_eq!(count(&store), 1);
    }
}
