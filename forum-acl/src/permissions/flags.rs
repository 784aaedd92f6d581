//! Bit utilities for building and taking apart privilege masks.

use crate::error::{AclError, Result};

use super::privileges::{ForumPrivileges, DISALLOW_ALL, PRIVILEGE_DETAILS};

/// A single argument to [`join_flags`]: a privilege name or raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag<'a> {
    Name(&'a str),
    Bits(u32),
}

impl<'a> From<&'a str> for Flag<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl From<u32> for Flag<'_> {
    fn from(bits: u32) -> Self {
        Self::Bits(bits)
    }
}

impl From<ForumPrivileges> for Flag<'_> {
    fn from(privileges: ForumPrivileges) -> Self {
        Self::Bits(privileges.bits())
    }
}

/// Join privilege names and/or raw bits into one mask.
///
/// An empty list yields [`DISALLOW_ALL`]. As soon as a `0` is seen the whole
/// result is `0`, no matter what else was passed.
///
/// # Examples
///
/// ```
/// use forum_acl::permissions::{join_flags, Flag, DISALLOW_ALL};
///
/// assert_eq!(join_flags(["read", "create", "reply"]).unwrap().bits(), 26);
/// let denied = join_flags([Flag::from("read"), Flag::Bits(DISALLOW_ALL)]).unwrap();
/// assert!(denied.is_empty());
/// ```
pub fn join_flags<'a, I, F>(flags: I) -> Result<ForumPrivileges>
where
    I: IntoIterator<Item = F>,
    F: Into<Flag<'a>>,
{
    let mut result = DISALLOW_ALL;
    for flag in flags {
        let bits = match flag.into() {
            Flag::Name(name) => ForumPrivileges::by_name(name)
                .ok_or_else(|| AclError::UnknownPrivilege(name.to_string()))?
                .bits(),
            Flag::Bits(bits) => bits,
        };
        if bits == DISALLOW_ALL {
            return Ok(ForumPrivileges::DISALLOW_ALL);
        }
        result |= bits;
    }
    Ok(ForumPrivileges::from_bits_retain(result))
}

/// Iterator over the privilege bits set in a mask, smallest first.
#[derive(Debug, Clone)]
pub struct SplitBits {
    mask: u32,
    next: usize,
}

impl Iterator for SplitBits {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        while self.next < PRIVILEGE_DETAILS.len() {
            let bits = PRIVILEGE_DETAILS[self.next].2.bits();
            self.next += 1;
            if self.mask & bits != 0 {
                return Some(bits);
            }
        }
        None
    }
}

/// Split `mask` into its single privilege bits in ascending order.
///
/// `None` and `0` yield nothing. Bits that are not privileges are skipped.
pub fn split_bits(mask: impl Into<Option<u32>>) -> SplitBits {
    SplitBits {
        mask: mask.into().unwrap_or(DISALLOW_ALL),
        next: 0,
    }
}

/// Parse a comma-separated list like `"-2,-8,8"` into `(negative, positive)`.
///
/// A leading `-` revokes, no sign grants. Tokens that are not integers are
/// ignored.
pub fn split_negative_positive(value: &str) -> (u32, u32) {
    let mut negative = 0;
    let mut positive = 0;

    for token in value.split(',') {
        let Ok(bit) = token.trim().parse::<i64>() else {
            continue;
        };
        let Ok(magnitude) = u32::try_from(bit.unsigned_abs()) else {
            tracing::debug!(token, "Ignoring out of range privilege value");
            continue;
        };
        if bit > 0 {
            positive |= magnitude;
        } else {
            negative |= magnitude;
        }
    }

    (negative, positive)
}
