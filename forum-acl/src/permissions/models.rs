//! Records consumed by the privilege resolver.
//!
//! All of these are owned by the persistence layer. The resolver only reads
//! them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::AclError;

use super::privileges::ForumPrivileges;

pub type ForumId = i64;
pub type TopicId = i64;
pub type GroupId = i64;
pub type UserId = i64;
pub type PrivilegeId = i64;

/// Effective privileges per requested forum.
pub type PrivilegeMap = BTreeMap<ForumId, ForumPrivileges>;

/// Anything that lives in exactly one forum.
pub trait ForumScoped {
    fn forum_id(&self) -> ForumId;
}

/// Forum record.
///
/// Forums form a tree through `parent_id`, but privileges are never inherited
/// along it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    pub id: ForumId,
    #[serde(default)]
    pub parent_id: Option<ForumId>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Forum {
    pub fn new(id: ForumId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            parent_id: None,
            slug: name.to_lowercase().replace(' ', "-"),
            name,
        }
    }

    /// Attach this forum below `parent_id`.
    #[must_use]
    pub fn with_parent(mut self, parent_id: ForumId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Categories are top-level forums.
    pub const fn is_category(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl ForumScoped for Forum {
    fn forum_id(&self) -> ForumId {
        self.id
    }
}

impl ForumScoped for ForumId {
    fn forum_id(&self) -> ForumId {
        *self
    }
}

/// Topic record, scoped to its forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub forum_id: ForumId,
    pub title: String,
}

impl ForumScoped for Topic {
    fn forum_id(&self) -> ForumId {
        self.forum_id
    }
}

/// User group record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
}

/// An authenticated user and the groups they explicitly joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: UserId,
    pub username: String,
    /// Explicit memberships. The registered default group is implied.
    #[serde(default)]
    pub groups: Vec<GroupId>,
}

impl Member {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_groups(mut self, groups: impl IntoIterator<Item = GroupId>) -> Self {
        self.groups.extend(groups);
        self
    }
}

/// The requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum User {
    /// Unauthenticated request.
    Anonymous,
    Authenticated(Member),
}

impl User {
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// User id, `None` for anonymous requests.
    pub const fn id(&self) -> Option<UserId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(member) => Some(member.id),
        }
    }

    /// Explicitly joined groups (empty for anonymous requests).
    pub fn groups(&self) -> &[GroupId] {
        match self {
            Self::Anonymous => &[],
            Self::Authenticated(member) => &member.groups,
        }
    }
}

impl From<Member> for User {
    fn from(member: Member) -> Self {
        Self::Authenticated(member)
    }
}

/// Who a privilege record applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegeSubject {
    Group(GroupId),
    User(UserId),
}

/// A persisted grant on one forum for one group or one user.
///
/// `positive` bits are granted and `negative` bits revoked. A bit set in both
/// is not rejected. The resolver lets the negative bit win.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPrivilegeRecord", into = "RawPrivilegeRecord")]
pub struct PrivilegeRecord {
    pub id: Option<PrivilegeId>,
    pub forum_id: ForumId,
    pub subject: PrivilegeSubject,
    pub positive: ForumPrivileges,
    pub negative: ForumPrivileges,
}

impl PrivilegeRecord {
    pub const fn for_group(
        forum_id: ForumId,
        group_id: GroupId,
        positive: ForumPrivileges,
        negative: ForumPrivileges,
    ) -> Self {
        Self {
            id: None,
            forum_id,
            subject: PrivilegeSubject::Group(group_id),
            positive,
            negative,
        }
    }

    pub const fn for_user(
        forum_id: ForumId,
        user_id: UserId,
        positive: ForumPrivileges,
        negative: ForumPrivileges,
    ) -> Self {
        Self {
            id: None,
            forum_id,
            subject: PrivilegeSubject::User(user_id),
            positive,
            negative,
        }
    }

    pub const fn is_user_level(&self) -> bool {
        matches!(self.subject, PrivilegeSubject::User(_))
    }

    pub const fn group_id(&self) -> Option<GroupId> {
        match self.subject {
            PrivilegeSubject::Group(id) => Some(id),
            PrivilegeSubject::User(_) => None,
        }
    }

    pub const fn user_id(&self) -> Option<UserId> {
        match self.subject {
            PrivilegeSubject::User(id) => Some(id),
            PrivilegeSubject::Group(_) => None,
        }
    }

    /// Whether some bit is both granted and revoked.
    pub const fn is_contradictory(&self) -> bool {
        self.positive.intersects(self.negative)
    }
}

/// Flat storage shape: one nullable column each for group and user.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPrivilegeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<PrivilegeId>,
    forum_id: ForumId,
    #[serde(default)]
    group_id: Option<GroupId>,
    #[serde(default)]
    user_id: Option<UserId>,
    #[serde(default)]
    positive: i64,
    #[serde(default)]
    negative: i64,
}

impl TryFrom<RawPrivilegeRecord> for PrivilegeRecord {
    type Error = AclError;

    fn try_from(raw: RawPrivilegeRecord) -> Result<Self, Self::Error> {
        let subject = match (raw.group_id, raw.user_id) {
            (Some(group_id), None) => PrivilegeSubject::Group(group_id),
            (None, Some(user_id)) => PrivilegeSubject::User(user_id),
            _ => {
                return Err(AclError::InvalidRecord {
                    id: raw.id,
                    forum_id: raw.forum_id,
                })
            }
        };

        Ok(Self {
            id: raw.id,
            forum_id: raw.forum_id,
            subject,
            positive: ForumPrivileges::from_db(raw.positive),
            negative: ForumPrivileges::from_db(raw.negative),
        })
    }
}

impl From<PrivilegeRecord> for RawPrivilegeRecord {
    fn from(record: PrivilegeRecord) -> Self {
        Self {
            id: record.id,
            forum_id: record.forum_id,
            group_id: record.group_id(),
            user_id: record.user_id(),
            positive: record.positive.to_db(),
            negative: record.negative.to_db(),
        }
    }
}
