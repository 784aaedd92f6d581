//! Forum privilege types and resolution.
//!
//! Privileges are granted per forum to groups or single users:
//! - Group records are joined, any revoke beats any grant
//! - User records, when present on a forum, replace the group result

pub mod cache;
pub mod export;
pub mod filter;
pub mod flags;
pub mod groups;
pub mod models;
pub mod privileges;
pub mod resolver;
pub mod store;

pub use cache::{CacheError, MemoryCache, NoCache, PrivilegeCache};
pub use export::{export_group_permissions, ForumPermissionExport, GroupPermissionExport};
pub use filter::{
    check_named_privilege, check_privilege, filter_forums, filter_invisible, filter_visible,
    Visibility,
};
pub use flags::{join_flags, split_bits, split_negative_positive, Flag};
pub use groups::{effective_groups, DefaultGroups, GroupRegistry};
pub use models::*;
pub use privileges::*;
pub use resolver::{join_privileges, PrivilegeResolver};
pub use store::{MemoryStore, PrivilegeStore, Snapshot};
