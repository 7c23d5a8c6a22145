//! Class vocabulary
//!
//! Maps normalized behavior names to integer class IDs. IDs are assigned in
//! alphabetical order of the name set, never in encounter order, so the same
//! annotations always produce the same IDs regardless of file order.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Name of the reserved background class in single-label datasets
pub const OTHER_CLASS: &str = "other";

/// How the vocabulary was built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyKind {
    /// ID 0 is "other", behaviors get 1..=N
    SingleLabel,
    /// Behaviors get 0..K, no reserved entry
    Multilabel,
    /// Class directories get 1..=N, ID 0 unused
    Folder,
}

/// Ordered name → ID mapping used for one conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ClassVocabulary {
    kind: VocabularyKind,
    ids: BTreeMap<String, u32>,
    names: BTreeMap<u32, String>,
}

impl ClassVocabulary {
    /// Single-label vocabulary over the union of behavior names.
    ///
    /// An annotated behavior literally named "other" folds into the reserved
    /// class 0 instead of taking a separate ID.
    pub fn single_label<I, S>(behaviors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::empty(VocabularyKind::SingleLabel);
        vocab.insert(OTHER_CLASS.to_string(), 0);
        let sorted = sorted_union(behaviors);
        for (idx, name) in sorted.into_iter().filter(|n| n != OTHER_CLASS).enumerate() {
            vocab.insert(name, idx as u32 + 1);
        }
        vocab
    }

    /// Multilabel vocabulary: IDs 0..K in alphabetical order
    pub fn multilabel<I, S>(behaviors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::empty(VocabularyKind::Multilabel);
        for (idx, name) in sorted_union(behaviors).into_iter().enumerate() {
            vocab.insert(name, idx as u32);
        }
        vocab
    }

    /// Folder vocabulary: directory names (case-sensitive) get IDs 1..=N
    pub fn from_folders<I, S>(directories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::empty(VocabularyKind::Folder);
        for (idx, name) in sorted_union(directories).into_iter().enumerate() {
            vocab.insert(name, idx as u32 + 1);
        }
        vocab
    }

    fn empty(kind: VocabularyKind) -> Self {
        Self {
            kind,
            ids: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    fn insert(&mut self, name: String, id: u32) {
        self.names.insert(id, name.clone());
        self.ids.insert(name, id);
    }

    pub fn kind(&self) -> VocabularyKind {
        self.kind
    }

    /// Class ID for a normalized name
    pub fn id(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Class name for an ID
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(&id).map(|s| s.as_str())
    }

    /// Number of entries, including a reserved "other"
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of classes that annotations can activate
    pub fn behavior_count(&self) -> usize {
        match self.kind {
            VocabularyKind::SingleLabel => self.len().saturating_sub(1),
            VocabularyKind::Multilabel | VocabularyKind::Folder => self.len(),
        }
    }

    /// ID → name table in ID order
    pub fn class_names(&self) -> BTreeMap<u32, String> {
        self.names.clone()
    }
}

fn sorted_union<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_label_reserves_other() {
        let vocab = ClassVocabulary::single_label(["walk", "rest", "groom", "rest"]);
        assert_eq!(vocab.id("other"), Some(0));
        assert_eq!(vocab.id("groom"), Some(1));
        assert_eq!(vocab.id("rest"), Some(2));
        assert_eq!(vocab.id("walk"), Some(3));
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.behavior_count(), 3);
    }

    #[test]
    fn test_multilabel_starts_at_zero() {
        let vocab = ClassVocabulary::multilabel(["vocalize", "groom"]);
        assert_eq!(vocab.id("groom"), Some(0));
        assert_eq!(vocab.id("vocalize"), Some(1));
        assert_eq!(vocab.id("other"), None);
        assert_eq!(vocab.behavior_count(), 2);
    }

    #[test]
    fn test_folder_ids_are_alphabetical_from_one() {
        let vocab = ClassVocabulary::from_folders(["rest", "walk", "feed"]);
        assert_eq!(vocab.id("feed"), Some(1));
        assert_eq!(vocab.id("rest"), Some(2));
        assert_eq!(vocab.id("walk"), Some(3));
        assert_eq!(vocab.name(0), None);
        assert_eq!(vocab.kind(), VocabularyKind::Folder);
    }

    #[test]
    fn test_folder_names_are_case_sensitive() {
        let vocab = ClassVocabulary::from_folders(["Rest", "rest"]);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.id("Rest"), Some(1));
        assert_eq!(vocab.id("rest"), Some(2));
    }

    #[test]
    fn test_order_independent() {
        let a = ClassVocabulary::single_label(["b", "c", "a"]);
        let b = ClassVocabulary::single_label(["c", "a", "b", "a"]);
        assert_eq!(a.class_names(), b.class_names());
    }

    #[test]
    fn test_annotated_other_folds_into_reserved_id() {
        let vocab = ClassVocabulary::single_label(["other", "sleep"]);
        assert_eq!(vocab.id("other"), Some(0));
        assert_eq!(vocab.id("sleep"), Some(1));
        assert_eq!(vocab.len(), 2);
    }
}
