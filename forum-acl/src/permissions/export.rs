//! Group permission export.
//!
//! Dumps, per forum, the plain grants (records without revoked bits) of every
//! group as a map of permission codenames to booleans. Used when migrating
//! forum privileges to codename-based permission systems.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::models::{ForumId, GroupId, PrivilegeSubject};
use super::privileges::ForumPrivileges;
use super::store::MemoryStore;

/// Permission codenames and the privilege each one maps to.
pub const PERMISSION_CODENAMES: [(&str, ForumPrivileges); 8] = [
    ("forum.view_forum", ForumPrivileges::READ),
    ("forum.vote_forum", ForumPrivileges::VOTE),
    ("forum.add_topic_forum", ForumPrivileges::CREATE),
    ("forum.add_reply_forum", ForumPrivileges::REPLY),
    ("forum.upload_forum", ForumPrivileges::UPLOAD),
    ("forum.poll_forum", ForumPrivileges::CREATE_POLL),
    ("forum.sticky_forum", ForumPrivileges::STICKY),
    ("forum.moderate_forum", ForumPrivileges::MODERATE),
];

/// Exported permissions of one group on one forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermissionExport {
    pub id: GroupId,
    pub name: Option<String>,
    pub permissions: BTreeMap<String, bool>,
}

/// Exported permissions of one forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumPermissionExport {
    pub id: ForumId,
    pub name: String,
    pub groups: Vec<GroupPermissionExport>,
}

fn codename_map(mask: ForumPrivileges) -> BTreeMap<String, bool> {
    PERMISSION_CODENAMES
        .iter()
        .map(|(codename, privilege)| ((*codename).to_string(), mask.contains(*privilege)))
        .collect()
}

/// Export the group grants of every forum in `store`.
///
/// Each positive-only group record becomes one group entry, in record order.
/// A group with several such records on a forum appears once per record.
/// Records with any negative bit and user records are skipped.
pub fn export_group_permissions(store: &MemoryStore) -> Vec<ForumPermissionExport> {
    store
        .forums()
        .iter()
        .map(|forum| {
            let groups = store
                .records()
                .iter()
                .filter(|record| record.forum_id == forum.id && record.negative.is_empty())
                .filter_map(|record| match record.subject {
                    PrivilegeSubject::Group(id) => Some(GroupPermissionExport {
                        id,
                        name: store.group(id).map(|g| g.name.clone()),
                        permissions: codename_map(record.positive),
                    }),
                    PrivilegeSubject::User(_) => None,
                })
                .collect();

            ForumPermissionExport {
                id: forum.id,
                name: forum.name.clone(),
                groups,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::models::{Forum, Group, PrivilegeRecord};

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.add_forum(Forum::new(1, "Support"));
        store.add_forum(Forum::new(2, "Empty"));
        store.add_group(Group {
            id: 1,
            name: "registered".to_string(),
        });
        store
            .add_privilege(PrivilegeRecord::for_group(
                1,
                1,
                ForumPrivileges::READ | ForumPrivileges::REPLY,
                ForumPrivileges::empty(),
            ))
            .unwrap();
        store
            .add_privilege(PrivilegeRecord::for_group(
                1,
                1,
                ForumPrivileges::VOTE,
                ForumPrivileges::empty(),
            ))
            .unwrap();
        // Skipped: has negative bits
        store
            .add_privilege(PrivilegeRecord::for_group(
                1,
                7,
                ForumPrivileges::MODERATE,
                ForumPrivileges::READ,
            ))
            .unwrap();
        // Skipped: user record
        store
            .add_privilege(PrivilegeRecord::for_user(
                1,
                3,
                ForumPrivileges::STICKY,
                ForumPrivileges::empty(),
            ))
            .unwrap();
        store
    }

    #[test]
    fn test_codenames_follow_privilege_order() {
        for (idx, (_, privilege)) in PERMISSION_CODENAMES.iter().enumerate() {
            assert_eq!(privilege.bits(), 1 << (idx + 1));
        }
    }

    #[test]
    fn test_export_one_entry_per_group_record() {
        let export = export_group_permissions(&store());
        assert_eq!(export.len(), 2);

        let support = &export[0];
        assert_eq!(support.name, "Support");
        assert_eq!(support.groups.len(), 2);
        assert!(support.groups.iter().all(|g| g.id == 1));

        let first = &support.groups[0];
        assert_eq!(first.name.as_deref(), Some("registered"));
        assert_eq!(first.permissions.len(), 8);
        assert!(first.permissions["forum.view_forum"]);
        assert!(first.permissions["forum.add_reply_forum"]);
        assert!(!first.permissions["forum.vote_forum"]);
        assert!(!first.permissions["forum.add_topic_forum"]);

        let second = &support.groups[1];
        assert!(second.permissions["forum.vote_forum"]);
        assert!(!second.permissions["forum.view_forum"]);
        assert!(!second.permissions["forum.moderate_forum"]);
        assert!(!second.permissions["forum.sticky_forum"]);
    }

    #[test]
    fn test_export_forum_without_grants() {
        let export = export_group_permissions(&store());
        assert_eq!(export[1].id, 2);
        assert!(export[1].groups.is_empty());
    }

    #[test]
    fn test_export_serializes_to_json() {
        let export = export_group_permissions(&store());
        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(json[0]["groups"][0]["permissions"]["forum.view_forum"], true);
        assert_eq!(json[1]["groups"], serde_json::json!([]));
    }
}
