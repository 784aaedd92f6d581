//! Forum privileges using bitflags.
//!
//! Each privilege occupies a single bit, starting at bit 1:
//! - read (2), vote (4), create (8), reply (16)
//! - upload (32), create_poll (64), sticky (128), moderate (256)
//!
//! Bit 0 is never assigned. The empty mask is [`DISALLOW_ALL`].

use bitflags::bitflags;

bitflags! {
    /// Forum privileges represented as a 32-bit bitfield.
    ///
    /// Stored as an integer column next to each privilege record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
    #[serde(transparent)]
    pub struct ForumPrivileges: u32 {
        /// Permission to read topics in the forum
        const READ        = 1 << 1;
        /// Permission to vote in polls
        const VOTE        = 1 << 2;
        /// Permission to create new topics
        const CREATE      = 1 << 3;
        /// Permission to reply to existing topics
        const REPLY       = 1 << 4;
        /// Permission to attach files to posts
        const UPLOAD      = 1 << 5;
        /// Permission to attach polls to topics
        const CREATE_POLL = 1 << 6;
        /// Permission to pin topics
        const STICKY      = 1 << 7;
        /// Permission to moderate the forum
        const MODERATE    = 1 << 8;
    }
}

/// The "deny everything" mask.
pub const DISALLOW_ALL: u32 = 0;

pub const CAN_READ: u32 = ForumPrivileges::READ.bits();
pub const CAN_VOTE: u32 = ForumPrivileges::VOTE.bits();
pub const CAN_CREATE: u32 = ForumPrivileges::CREATE.bits();
pub const CAN_REPLY: u32 = ForumPrivileges::REPLY.bits();
pub const CAN_UPLOAD: u32 = ForumPrivileges::UPLOAD.bits();
pub const CAN_CREATE_POLL: u32 = ForumPrivileges::CREATE_POLL.bits();
pub const CAN_STICKY: u32 = ForumPrivileges::STICKY.bits();
pub const CAN_MODERATE: u32 = ForumPrivileges::MODERATE.bits();

/// Privilege names, descriptions and bits in their fixed order.
pub const PRIVILEGE_DETAILS: [(&str, &str, ForumPrivileges); 8] = [
    ("read", "can read", ForumPrivileges::READ),
    ("vote", "can vote", ForumPrivileges::VOTE),
    ("create", "can create topics", ForumPrivileges::CREATE),
    ("reply", "can reply", ForumPrivileges::REPLY),
    ("upload", "can upload attachments", ForumPrivileges::UPLOAD),
    ("create_poll", "can create polls", ForumPrivileges::CREATE_POLL),
    ("sticky", "can make topics sticky", ForumPrivileges::STICKY),
    ("moderate", "can moderate", ForumPrivileges::MODERATE),
];

/// Privilege names in their fixed order.
pub const PRIVILEGES: [&str; 8] = [
    "read",
    "vote",
    "create",
    "reply",
    "upload",
    "create_poll",
    "sticky",
    "moderate",
];

impl ForumPrivileges {
    /// Alias for the empty mask.
    pub const DISALLOW_ALL: Self = Self::empty();

    /// Look up a single privilege by its name (e.g. `"create_poll"`).
    #[must_use]
    pub fn by_name(name: &str) -> Option<Self> {
        PRIVILEGE_DETAILS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, _, bits)| *bits)
    }

    /// Names of all privileges present in this mask, in table order.
    pub fn privilege_names(self) -> impl Iterator<Item = &'static str> {
        PRIVILEGE_DETAILS
            .into_iter()
            .filter(move |(_, _, bits)| self.contains(*bits))
            .map(|(name, _, _)| name)
    }

    // === Database Conversion ===

    /// Create privileges from a stored integer value.
    ///
    /// Unknown bits (including bit 0) are dropped. Values outside the `u32`
    /// range, negative ones included, yield no privileges at all.
    #[must_use]
    pub fn from_db(value: i64) -> Self {
        u32::try_from(value).map_or(Self::empty(), Self::from_bits_truncate)
    }

    /// Convert privileges to the stored integer value.
    #[must_use]
    pub const fn to_db(self) -> i64 {
        self.bits() as i64
    }

    // === Privilege Checking ===

    /// Check if this mask includes all of the given privilege(s).
    ///
    /// # Examples
    ///
    /// ```
    /// use forum_acl::permissions::ForumPrivileges;
    ///
    /// let perms = ForumPrivileges::READ | ForumPrivileges::REPLY;
    /// assert!(perms.has(ForumPrivileges::READ));
    /// assert!(!perms.has(ForumPrivileges::MODERATE));
    /// ```
    #[must_use]
    pub const fn has(self, privilege: Self) -> bool {
        self.contains(privilege)
    }
}

impl Default for ForumPrivileges {
    fn default() -> Self {
        Self::empty()
    }
}
