//! ACL Configuration
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::permissions::cache::DEFAULT_PREFIX;
use crate::permissions::groups::DefaultGroups;
use crate::permissions::models::GroupId;

/// ACL configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON snapshot with forums, groups, users and privilege records
    pub snapshot_path: Option<PathBuf>,

    /// Id of the group every anonymous request belongs to (default: -1)
    pub anonymous_group_id: GroupId,

    /// Id of the group every authenticated user belongs to (default: 1)
    pub registered_group_id: GroupId,

    /// Whether resolved privileges are cached (default: true)
    pub cache_enabled: bool,

    /// Prefix for cache keys (default: "forum/acls")
    pub cache_prefix: String,

    /// Emit logs as JSON lines (default: false)
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACL_SNAPSHOT_PATH`: Path to the JSON snapshot
    /// - `ACL_ANONYMOUS_GROUP_ID`: Anonymous default group id
    /// - `ACL_REGISTERED_GROUP_ID`: Registered default group id
    /// - `ACL_CACHE_ENABLED`: Enable/disable the privilege cache
    /// - `ACL_CACHE_PREFIX`: Cache key prefix
    /// - `ACL_LOG_JSON`: Log as JSON
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            snapshot_path: env::var("ACL_SNAPSHOT_PATH").ok().map(PathBuf::from),
            anonymous_group_id: parse_group_id("ACL_ANONYMOUS_GROUP_ID", -1)?,
            registered_group_id: parse_group_id("ACL_REGISTERED_GROUP_ID", 1)?,
            cache_enabled: env::var("ACL_CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            cache_prefix: env::var("ACL_CACHE_PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.into()),
            log_json: env::var("ACL_LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        })
    }

    /// Default group ids as a registry for the resolver.
    #[must_use]
    pub const fn default_groups(&self) -> DefaultGroups {
        DefaultGroups::new(self.anonymous_group_id, self.registered_group_id)
    }

    /// Snapshot path, or an error naming the missing variable.
    pub fn require_snapshot_path(&self) -> Result<&PathBuf> {
        self.snapshot_path
            .as_ref()
            .context("ACL_SNAPSHOT_PATH must be set")
    }

    /// Create a default configuration for testing.
    #[must_use]
    pub fn default_for_test() -> Self {
        Self {
            snapshot_path: None,
            anonymous_group_id: -1,
            registered_group_id: 1,
            cache_enabled: true,
            cache_prefix: DEFAULT_PREFIX.into(),
            log_json: false,
        }
    }
}

/// Parse a group id variable. Unlike the boolean flags, a set but invalid
/// value is an error.
fn parse_group_id(var: &str, default: GroupId) -> Result<GroupId> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{var} must be an integer, got {value:?}")),
        Err(_) => Ok(default),
    }
}
