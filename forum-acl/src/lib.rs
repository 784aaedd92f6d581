//! Inyoka Forum ACL
//!
//! Resolves the effective per-forum privilege bitmask for a user from group
//! and user grants. Persistence and caching are supplied by the caller through
//! the [`permissions::PrivilegeStore`] and [`permissions::PrivilegeCache`]
//! traits.

pub mod cli;
pub mod config;
pub mod error;
pub mod permissions;

pub use error::{AclError, Result};
