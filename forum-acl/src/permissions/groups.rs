//! Default group registry.
//!
//! Every request belongs to one system-wide default group: anonymous requests
//! to the anonymous group, authenticated users to the registered group. Both
//! are provisioned once at bootstrap and only looked up here.

use super::models::{GroupId, User};

/// Lookup of the pre-provisioned default groups.
pub trait GroupRegistry {
    fn anonymous_group(&self) -> GroupId;
    fn registered_group(&self) -> GroupId;
}

/// Fixed default group ids, usually taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultGroups {
    pub anonymous: GroupId,
    pub registered: GroupId,
}

impl DefaultGroups {
    pub const fn new(anonymous: GroupId, registered: GroupId) -> Self {
        Self {
            anonymous,
            registered,
        }
    }
}

impl Default for DefaultGroups {
    fn default() -> Self {
        Self::new(-1, 1)
    }
}

impl GroupRegistry for DefaultGroups {
    fn anonymous_group(&self) -> GroupId {
        self.anonymous
    }

    fn registered_group(&self) -> GroupId {
        self.registered
    }
}

/// Groups whose privilege records apply to `user`.
///
/// Anonymous requests get exactly the anonymous group. Authenticated users
/// get the registered group first, then their explicit groups without
/// duplicates.
pub fn effective_groups(user: &User, registry: &impl GroupRegistry) -> Vec<GroupId> {
    if user.is_anonymous() {
        return vec![registry.anonymous_group()];
    }

    let mut groups = Vec::with_capacity(user.groups().len() + 1);
    groups.push(registry.registered_group());
    for &group in user.groups() {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::models::Member;

    #[test]
    fn test_anonymous_gets_only_anonymous_group() {
        let registry = DefaultGroups::new(-1, 1);
        assert_eq!(effective_groups(&User::Anonymous, &registry), [-1]);
    }

    #[test]
    fn test_registered_group_comes_first() {
        let registry = DefaultGroups::new(-1, 1);
        let user = User::from(Member::new(10, "kim").with_groups([5, 6]));
        assert_eq!(effective_groups(&user, &registry), [1, 5, 6]);
    }

    #[test]
    fn test_duplicate_memberships_collapse() {
        let registry = DefaultGroups::new(-1, 1);
        let user = User::from(Member::new(10, "kim").with_groups([1, 5, 5]));
        assert_eq!(effective_groups(&user, &registry), [1, 5]);
    }

    #[test]
    fn test_authenticated_never_gets_anonymous_group() {
        let registry = DefaultGroups::new(-1, 1);
        let user = User::from(Member::new(10, "kim"));
        assert!(!effective_groups(&user, &registry).contains(&-1));
    }

    #[test]
    fn test_default_ids() {
        let registry = DefaultGroups::default();
        assert_eq!(registry.anonymous_group(), -1);
        assert_eq!(registry.registered_group(), 1);
    }
}
