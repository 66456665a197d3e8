//! In-memory [`NotesProvider`]: notes are seeded by folder id and returned
//! in insertion order; folder suggestion is a crude keyword match.

use dashmap::DashMap;
use kiln_domain::ports::{FolderSuggestion, NotesProvider};
use kiln_domain::Result;

/// In-memory notes store keyed by folder id.
#[derive(Default)]
pub struct InMemoryNotesProvider {
    notes: DashMap<String, Vec<String>>,
}

impl InMemoryNotesProvider {
    /// Create an empty notes provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `folder_id` with `notes`, appended to whatever is already there.
    pub fn seed(&self, folder_id: impl Into<String>, notes: impl IntoIterator<Item = String>) {
        self.notes.entry(folder_id.into()).or_default().extend(notes);
    }
}

#[async_trait::async_trait]
impl NotesProvider for InMemoryNotesProvider {
    async fn get_notes_by_folder(&self, folder_id: &str) -> Result<Vec<String>> {
        Ok(self.notes.get(folder_id).map(|entry| entry.value().clone()).unwrap_or_default())
    }

    async fn suggest_folder(&self, content: &str) -> Result<FolderSuggestion> {
        let lowered = content.to_ascii_lowercase();
        let mut scored: Vec<(String, usize)> = self
            .notes
            .iter()
            .map(|entry| {
                let overlap = entry
                    .value()
                    .iter()
                    .filter(|note| {
                        let prefix: String = note.to_ascii_lowercase().chars().take(12).collect();
                        !prefix.is_empty() && lowered.contains(&prefix)
                    })
                    .count();
                (entry.key().clone(), overlap)
            })
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let Some((best_folder, best_score)) = scored.first().cloned() else {
            return Ok(FolderSuggestion {
                suggested_folder: "unsorted".into(),
                confidence: 0.0,
                alternatives: Vec::new(),
            });
        };

        let confidence = if best_score == 0 { 0.1 } else { (best_score as f64 / 4.0).min(0.95) };
        let alternatives = scored.into_iter().skip(1).take(2).map(|(folder, _)| folder).collect();

        Ok(FolderSuggestion {
            suggested_folder: best_folder,
            confidence,
            alternatives,
        })
    }
}
