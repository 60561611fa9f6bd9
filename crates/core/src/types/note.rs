//! Scent note types.
//!
//! Every fragrance lists its notes in three pyramid tiers. Product cards and
//! detail pages only ever show a handful of them, so selection works per
//! category.

use serde::{Deserialize, Serialize};

use super::id::NoteId;

/// A single scent note (e.g. "Bergamot").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScentNote {
    /// Backend note ID.
    pub id: NoteId,
    /// Display name.
    pub name: String,
    /// Optional illustration URL.
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Position of a note in the fragrance pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteCategory {
    Top,
    Middle,
    Base,
}

impl NoteCategory {
    /// All categories in pyramid order.
    pub const ALL: [Self; 3] = [Self::Top, Self::Middle, Self::Base];
}

/// The full note pyramid of a fragrance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScentNotes {
    #[serde(default)]
    pub top_notes: Vec<ScentNote>,
    #[serde(default)]
    pub middle_notes: Vec<ScentNote>,
    #[serde(default)]
    pub base_notes: Vec<ScentNote>,
}

impl ScentNotes {
    /// Notes in one category.
    #[must_use]
    pub fn category(&self, category: NoteCategory) -> &[ScentNote] {
        match category {
            NoteCategory::Top => &self.top_notes,
            NoteCategory::Middle => &self.middle_notes,
            NoteCategory::Base => &self.base_notes,
        }
    }

    /// Number of categories holding at least one note.
    #[must_use]
    pub fn nonempty_categories(&self) -> usize {
        NoteCategory::ALL
            .iter()
            .filter(|c| !self.category(**c).is_empty())
            .count()
    }

    /// True when no category has any notes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nonempty_categories() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_missing_categories_default_empty() {
        let notes: ScentNotes = serde_json::from_str(
            r#"{"topNotes":[{"id":"n1","name":"Bergamot"}]}"#,
        )
        .unwrap();
        assert_eq!(notes.top_notes.len(), 1);
        assert!(notes.middle_notes.is_empty());
        assert_eq!(notes.nonempty_categories(), 1);
        assert!(!notes.is_empty());
    }

    #[test]
    fn test_category_lookup() {
        let note = ScentNote {
            id: NoteId::new("n2"),
            name: "Oud".to_string(),
            image_url: None,
        };
        let notes = ScentNotes {
            base_notes: vec![note.clone()],
            ..ScentNotes::default()
        };
        assert_eq!(notes.category(NoteCategory::Base), &[note]);
        assert!(notes.category(NoteCategory::Top).is_empty());
    }
}
