//! Label manifest loading.
//!
//! The manifest is a JSON file holding the ordered label set the model was
//! trained on. Two historical formats exist and both are accepted: a plain
//! array `["burglary", ...]` and an index-keyed object `{"0": "burglary",
//! ...}`. Keys in the object form must be contiguous from zero.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::error::{ClassifierError, ClassifierResult};

/// Ordered label set loaded once at startup.
#[derive(Debug, Clone)]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Load the manifest from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ClassifierResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|_| ClassifierError::ManifestNotFound(path.to_path_buf()))?;
        Self::from_json(&raw)
    }

    /// Parse manifest content from a JSON string.
    pub fn from_json(raw: &str) -> ClassifierResult<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ClassifierError::ManifestParse(e.to_string()))?;

        let labels = match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(ClassifierError::ManifestParse(format!(
                        "Expected string label, got {other}"
                    ))),
                })
                .collect::<ClassifierResult<Vec<_>>>()?,
            Value::Object(map) => {
                let mut by_index = BTreeMap::new();
                for (key, item) in map {
                    let index: usize = key.parse().map_err(|_| {
                        ClassifierError::ManifestParse(format!("Non-numeric label key: {key}"))
                    })?;
                    let label = match item {
                        Value::String(s) => s,
                        other => {
                            return Err(ClassifierError::ManifestParse(format!(
                                "Expected string label, got {other}"
                            )))
                        }
                    };
                    by_index.insert(index, label);
                }

                // BTreeMap iterates in key order; reject gaps.
                let mut labels = Vec::with_capacity(by_index.len());
                for (expected, (index, label)) in by_index.into_iter().enumerate() {
                    if index != expected {
                        return Err(ClassifierError::ManifestParse(format!(
                            "Label keys are not contiguous: missing index {expected}"
                        )));
                    }
                    labels.push(label);
                }
                labels
            }
            other => {
                return Err(ClassifierError::ManifestParse(format!(
                    "Expected array or object manifest, got {other}"
                )))
            }
        };

        if labels.is_empty() {
            return Err(ClassifierError::EmptyManifest);
        }

        Ok(Self { labels })
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at a class index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Iterate labels in class order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX_CLASSES: [&str; 6] = [
        "burglary",
        "normal",
        "robbery",
        "shoplifting",
        "stealing",
        "violence",
    ];

    #[test]
    fn test_array_form() {
        let raw = serde_json::to_string(&SIX_CLASSES).unwrap();
        let labels = LabelSet::from_json(&raw).unwrap();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels.get(0), Some("burglary"));
        assert_eq!(labels.get(5), Some("violence"));
    }

    #[test]
    fn test_object_form_matches_array_form() {
        let array = serde_json::to_string(&SIX_CLASSES).unwrap();
        // Deliberately out of key order to exercise sorting.
        let object = r#"{"3": "shoplifting", "0": "burglary", "1": "normal",
                         "5": "violence", "2": "robbery", "4": "stealing"}"#;

        let a = LabelSet::from_json(&array).unwrap();
        let b = LabelSet::from_json(object).unwrap();
        assert_eq!(a.iter().collect::<Vec<_>>(), b.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_non_contiguous_keys_rejected() {
        let raw = r#"{"0": "burglary", "2": "violence"}"#;
        assert!(matches!(
            LabelSet::from_json(raw),
            Err(ClassifierError::ManifestParse(_))
        ));
    }

    #[test]
    fn test_empty_manifest_rejected() {
        assert!(matches!(
            LabelSet::from_json("[]"),
            Err(ClassifierError::EmptyManifest)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            LabelSet::load("/nonexistent/classes.json"),
            Err(ClassifierError::ManifestNotFound(_))
        ));
    }
}
