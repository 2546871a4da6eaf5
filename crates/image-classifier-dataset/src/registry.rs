use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::DatasetError;

/// Bidirectional mapping between label names and class ids.
///
/// Class ids are dense and follow the order of the labels given at construction, so a model
/// trained against one registry is only meaningful with a registry built from the same labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelRegistry {
    labels: Vec<String>,
    ids: HashMap<String, usize>,
}

impl LabelRegistry {
    /// Create a registry where each label gets its position as class id.
    ///
    /// The labels are expected to be sorted and free of duplicates, use
    /// [try_new](LabelRegistry::try_new) for labels from an untrusted source.
    pub fn new(labels: Vec<String>) -> Self {
        debug_assert!(is_sorted_and_unique(&labels), "Labels should be sorted and unique");

        let ids = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        Self { labels, ids }
    }

    /// Create a registry, failing if the labels are not sorted or contain duplicates.
    pub fn try_new(labels: Vec<String>) -> Result<Self, DatasetError> {
        if !is_sorted_and_unique(&labels) {
            return Err(DatasetError::InvalidLabels(labels));
        }

        Ok(Self::new(labels))
    }

    /// Class id of the given label.
    pub fn id_of(&self, label: &str) -> Result<usize, DatasetError> {
        self.ids
            .get(label)
            .copied()
            .ok_or_else(|| DatasetError::UnknownLabel(label.to_string()))
    }

    /// Label name of the given class id.
    pub fn label_of(&self, id: usize) -> Result<&str, DatasetError> {
        self.labels
            .get(id)
            .map(String::as_str)
            .ok_or(DatasetError::IndexOutOfRange {
                index: id,
                len: self.labels.len(),
            })
    }

    /// All labels, indexed by class id.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Checks if no label is registered.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn is_sorted_and_unique(labels: &[String]) -> bool {
    labels.windows(2).all(|pair| pair[0] < pair[1])
}

impl TryFrom<Vec<String>> for LabelRegistry {
    type Error = DatasetError;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::try_new(labels)
    }
}

impl From<LabelRegistry> for Vec<String> {
    fn from(registry: LabelRegistry) -> Self {
        registry.labels
    }
}
