//! Error types for blocktrack-core.

use thiserror::Error;

/// Result type alias for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;

/// Errors raised while reading a project snapshot.
///
/// All variants describe a malformed `project.json`; none of them are
/// recoverable locally. Callers must abort the surrounding diff-and-commit
/// operation without partial mutation.
#[derive(Error, Debug)]
pub enum DiffError {
    /// The document has no `targets` array.
    #[error("project has no targets list")]
    MissingTargets,

    /// A target is missing a required field or the field has the wrong shape.
    #[error("target {index}: missing or invalid `{field}` field")]
    MalformedTarget {
        /// Position of the target in the document.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A costume carries neither an `md5ext` nor an `assetId`/`dataFormat`
    /// pair, so no identity path can be derived for it.
    #[error("sprite `{sprite}`: costume without identity fields")]
    MissingAssetIdentity {
        /// Name of the owning sprite.
        sprite: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiffError::MalformedTarget {
            index: 3,
            field: "blocks",
        };
        assert!(err.to_string().contains("target 3"));
        assert!(err.to_string().contains("blocks"));

        let err = DiffError::MissingAssetIdentity {
            sprite: "Sprite1".to_string(),
        };
        assert!(err.to_string().contains("Sprite1"));
    }
}
