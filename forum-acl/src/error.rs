//! ACL Error Types

use crate::permissions::models::{ForumId, PrivilegeId};

/// Convenience alias for results carrying an [`AclError`].
pub type Result<T, E = AclError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("Unknown privilege: {0}")]
    UnknownPrivilege(String),

    #[error("Privilege record {id:?} on forum {forum_id} must target exactly one of group or user")]
    InvalidRecord {
        id: Option<PrivilegeId>,
        forum_id: ForumId,
    },

    #[error("Privilege record on forum {0} references an unknown forum")]
    UnknownForum(ForumId),

    #[error("Failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let unknown = AclError::UnknownPrivilege("fly".to_string());
        assert_eq!(unknown.to_string(), "Unknown privilege: fly");

        let invalid = AclError::InvalidRecord {
            id: Some(7),
            forum_id: 3,
        };
        assert!(invalid.to_string().contains("exactly one of group or user"));
        assert!(invalid.to_string().contains("forum 3"));

        let forum = AclError::UnknownForum(42);
        assert!(forum.to_string().contains("42"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AclError = io.into();
        assert!(matches!(err, AclError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
