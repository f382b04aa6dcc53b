//! Read-only view over one parsed project snapshot.
//!
//! A [`Snapshot`] wraps a deserialized `project.json` and exposes the two
//! observations the differ needs: per-sprite block counts and per-sprite
//! costume lists. It never mutates the underlying document, and it holds no
//! state across calls — every accessor is a pure function of the wrapped
//! value.

use serde_json::Value;

use crate::differ::changes::CostumeChange;
use crate::error::{DiffError, Result};

/// Resolve the content-addressable identity path of a costume.
///
/// Uses the costume's `md5ext` field when it carries a non-empty string;
/// otherwise synthesizes `"{assetId}.{dataFormat}"`. Two costumes with the
/// same bytes and format collapse to the same identity even when their
/// display names differ, which is what makes rename detection possible.
///
/// Returns `None` when neither form of identity is present.
pub fn costume_path(costume: &Value) -> Option<String> {
    match costume.get("md5ext").and_then(Value::as_str) {
        Some(md5ext) if !md5ext.is_empty() => Some(md5ext.to_string()),
        _ => {
            let asset_id = costume.get("assetId").and_then(Value::as_str)?;
            let data_format = costume.get("dataFormat").and_then(Value::as_str)?;
            Some(format!("{}.{}", asset_id, data_format))
        }
    }
}

/// One immutable parsed project version at a point in time.
#[derive(Clone, Debug)]
pub struct Snapshot {
    data: Value,
}

impl Snapshot {
    /// Wrap an already-parsed `project.json` document.
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// The document's target list, in document order.
    fn targets(&self) -> Result<&[Value]> {
        self.data
            .get("targets")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .ok_or(DiffError::MissingTargets)
    }

    fn target_name(target: &Value, index: usize) -> Result<&str> {
        target
            .get("name")
            .and_then(Value::as_str)
            .ok_or(DiffError::MalformedTarget {
                index,
                field: "name",
            })
    }

    /// Number of entries in each sprite's block graph, in document order.
    pub fn block_counts(&self) -> Result<Vec<(String, usize)>> {
        self.targets()?
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let name = Self::target_name(target, index)?;
                let blocks = target.get("blocks").and_then(Value::as_object).ok_or(
                    DiffError::MalformedTarget {
                        index,
                        field: "blocks",
                    },
                )?;
                Ok((name.to_string(), blocks.len()))
            })
            .collect()
    }

    /// Every costume in use, grouped per sprite, in document order.
    ///
    /// Each costume is resolved to its `(identity path, display name)` pair
    /// via [`costume_path`].
    pub fn costumes(&self) -> Result<Vec<(String, Vec<CostumeChange>)>> {
        self.targets()?
            .iter()
            .enumerate()
            .map(|(index, target)| {
                let sprite = Self::target_name(target, index)?;
                let costumes = target.get("costumes").and_then(Value::as_array).ok_or(
                    DiffError::MalformedTarget {
                        index,
                        field: "costumes",
                    },
                )?;

                let resolved = costumes
                    .iter()
                    .map(|costume| {
                        let path = costume_path(costume).ok_or_else(|| {
                            DiffError::MissingAssetIdentity {
                                sprite: sprite.to_string(),
                            }
                        })?;
                        let name = costume.get("name").and_then(Value::as_str).ok_or(
                            DiffError::MalformedTarget {
                                index,
                                field: "costumes",
                            },
                        )?;
                        Ok(CostumeChange::new(sprite, &path, name))
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok((sprite.to_string(), resolved))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_costume_path_prefers_md5ext() {
        let costume = json!({
            "md5ext": "abc123.svg",
            "assetId": "abc123",
            "dataFormat": "png"
        });
        assert_eq!(costume_path(&costume), Some("abc123.svg".to_string()));
    }

    #[test]
    fn test_costume_path_synthesized_from_asset_id() {
        let costume = json!({"assetId": "abc123", "dataFormat": "png"});
        assert_eq!(costume_path(&costume), Some("abc123.png".to_string()));
    }

    #[test]
    fn test_costume_path_empty_md5ext_falls_through() {
        let costume = json!({"md5ext": "", "assetId": "abc123", "dataFormat": "svg"});
        assert_eq!(costume_path(&costume), Some("abc123.svg".to_string()));
    }

    #[test]
    fn test_costume_path_no_identity() {
        let costume = json!({"name": "cat"});
        assert_eq!(costume_path(&costume), None);
    }

    #[test]
    fn test_block_counts_in_document_order() {
        let snapshot = Snapshot::new(json!({
            "targets": [
                {"name": "Stage", "blocks": {"a": {}, "b": {}}, "costumes": []},
                {"name": "Sprite1", "blocks": {"c": {}}, "costumes": []}
            ]
        }));

        let counts = snapshot.block_counts().unwrap();
        assert_eq!(
            counts,
            vec![("Stage".to_string(), 2), ("Sprite1".to_string(), 1)]
        );
    }

    #[test]
    fn test_costumes_resolved() {
        let snapshot = Snapshot::new(json!({
            "targets": [{
                "name": "Sprite1",
                "blocks": {},
                "costumes": [
                    {"md5ext": "a1.svg", "name": "cat"},
                    {"assetId": "b2", "dataFormat": "png", "name": "dog"}
                ]
            }]
        }));

        let costumes = snapshot.costumes().unwrap();
        assert_eq!(costumes.len(), 1);
        let (sprite, list) = &costumes[0];
        assert_eq!(sprite, "Sprite1");
        assert_eq!(list[0], CostumeChange::new("Sprite1", "a1.svg", "cat"));
        assert_eq!(list[1], CostumeChange::new("Sprite1", "b2.png", "dog"));
    }

    #[test]
    fn test_missing_targets_errors() {
        let snapshot = Snapshot::new(json!({"monitors": []}));
        assert!(matches!(
            snapshot.block_counts(),
            Err(DiffError::MissingTargets)
        ));
        assert!(matches!(snapshot.costumes(), Err(DiffError::MissingTargets)));
    }

    #[test]
    fn test_missing_blocks_errors() {
        let snapshot = Snapshot::new(json!({
            "targets": [{"name": "Stage", "costumes": []}]
        }));
        assert!(matches!(
            snapshot.block_counts(),
            Err(DiffError::MalformedTarget {
                index: 0,
                field: "blocks"
            })
        ));
    }

    #[test]
    fn test_missing_costumes_errors() {
        let snapshot = Snapshot::new(json!({
            "targets": [{"name": "Stage", "blocks": {}}]
        }));
        assert!(matches!(
            snapshot.costumes(),
            Err(DiffError::MalformedTarget {
                index: 0,
                field: "costumes"
            })
        ));
    }

    #[test]
    fn test_costume_without_identity_errors() {
        let snapshot = Snapshot::new(json!({
            "targets": [{
                "name": "Sprite1",
                "blocks": {},
                "costumes": [{"name": "cat"}]
            }]
        }));
        assert!(matches!(
            snapshot.costumes(),
            Err(DiffError::MissingAssetIdentity { .. })
        ));
    }
}
