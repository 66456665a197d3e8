//! In-memory [`ContextProvider`]: assembles context by concatenating notes
//! with whatever `options` carries, and caches the result under a
//! caller-supplied `context_id` so repeat calls can be served `from_cache`.

use dashmap::DashMap;
use kiln_domain::ports::{ContextBundle, ContextOptions, ContextProvider};
use kiln_domain::Result;

/// In-memory context assembler with an opaque cache keyed by the
/// `context_id` field of `options`, when present.
#[derive(Default)]
pub struct InMemoryContextProvider {
    cache: DashMap<String, ContextBundle>,
}

impl InMemoryContextProvider {
    /// Create an empty context provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ContextProvider for InMemoryContextProvider {
    async fn build_context(&self, notes: &str, options: &ContextOptions) -> Result<ContextBundle> {
        let context_id = options.get("context_id").and_then(|v| v.as_str());

        if let Some(id) = context_id {
            if let Some(cached) = self.cache.get(id) {
                let mut bundle = cached.value().clone();
                bundle.from_cache = true;
                return Ok(bundle);
            }
        }

        let assembled_context = if notes.is_empty() {
            "(no notes provided)".to_owned()
        } else {
            notes.to_owned()
        };

        let bundle = ContextBundle {
            assembled_context,
            sources: options.clone(),
            from_cache: false,
        };

        if let Some(id) = context_id {
            self.cache.insert(id.to_owned(), bundle.clone());
        }

        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn repeat_calls_with_same_context_id_hit_cache() {
        let provider = InMemoryContextProvider::new();
        let options = serde_json::json!({"context_id": "ctx-1"});

        let first = provider.build_context("meeting notes", &options).await.unwrap();
        assert!(!first.from_cache);

        let second = provider.build_context("different notes", &options).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.assembled_context, "meeting notes");
    }

    #[tokio::test]
    async fn calls_without_context_id_are_never_cached() {
        let provider = InMemoryContextProvider::new();
        let options = serde_json::json!({});

        let first = provider.build_context("notes", &options).await.unwrap();
        let second = provider.build_context("notes", &options).await.unwrap();
        assert!(!first.from_cache);
        assert!(!second.from_cache);
    }
}
