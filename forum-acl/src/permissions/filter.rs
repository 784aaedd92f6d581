//! Privilege checks against an already resolved [`PrivilegeMap`].
//!
//! None of these touch the store, so prefer them over repeated
//! `have_privilege` calls when a map is at hand.

use crate::error::{AclError, Result};

use super::models::{ForumScoped, PrivilegeMap};
use super::privileges::ForumPrivileges;

/// Which side of a privilege check to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Forums where the privilege is present.
    Visible,
    /// Forums where the privilege is missing.
    Invisible,
}

/// Check whether `mask` carries any bit of `privilege`.
pub const fn check_privilege(mask: ForumPrivileges, privilege: ForumPrivileges) -> bool {
    mask.intersects(privilege)
}

/// [`check_privilege`] with a privilege name such as `"read"`.
pub fn check_named_privilege(mask: ForumPrivileges, name: &str) -> Result<bool> {
    let privilege =
        ForumPrivileges::by_name(name).ok_or_else(|| AclError::UnknownPrivilege(name.to_string()))?;
    Ok(check_privilege(mask, privilege))
}

/// Keep the forums on the requested side of `privilege`.
///
/// Forums missing from `privileges` count as having nothing.
pub fn filter_forums<'a, I, F>(
    forums: I,
    privileges: &PrivilegeMap,
    privilege: ForumPrivileges,
    visibility: Visibility,
) -> Vec<&'a F>
where
    I: IntoIterator<Item = &'a F>,
    F: ForumScoped + ?Sized + 'a,
{
    forums
        .into_iter()
        .filter(|forum| {
            let mask = privileges
                .get(&forum.forum_id())
                .copied()
                .unwrap_or(ForumPrivileges::DISALLOW_ALL);
            let granted = check_privilege(mask, privilege);
            match visibility {
                Visibility::Visible => granted,
                Visibility::Invisible => !granted,
            }
        })
        .collect()
}

/// Forums where the user holds `privilege` (usually `READ`).
pub fn filter_visible<'a, I, F>(
    forums: I,
    privileges: &PrivilegeMap,
    privilege: ForumPrivileges,
) -> Vec<&'a F>
where
    I: IntoIterator<Item = &'a F>,
    F: ForumScoped + ?Sized + 'a,
{
    filter_forums(forums, privileges, privilege, Visibility::Visible)
}

/// Forums where the user lacks `privilege`.
pub fn filter_invisible<'a, I, F>(
    forums: I,
    privileges: &PrivilegeMap,
    privilege: ForumPrivileges,
) -> Vec<&'a F>
where
    I: IntoIterator<Item = &'a F>,
    F: ForumScoped + ?Sized + 'a,
{
    filter_forums(forums, privileges, privilege, Visibility::Invisible)
}
