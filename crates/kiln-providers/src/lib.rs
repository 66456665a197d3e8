//! Deterministic in-memory implementations of the orchestrator's outbound
//! ports ([`kiln_domain::ports`]): a scriptable model backend, a notes
//! store, a context assembler, a mermaid-to-HTML wrapper, and a heuristic
//! quality judge.
//!
//! None of this talks to a real model or a real notes system — it exists
//! so `kiln-application`'s use cases and the `kiln` composition root can be
//! exercised end to end without an external dependency. A production
//! deployment swaps these for adapters to an actual inference backend and
//! notes system while keeping the same port traits.

mod context_provider;
mod html_generator;
mod model_backend;
mod notes_provider;
mod quality_judge;

pub use context_provider::InMemoryContextProvider;
pub use html_generator::MermaidHtmlGenerator;
pub use model_backend::{InMemoryModelBackend, ScriptedResponse};
pub use notes_provider::InMemoryNotesProvider;
pub use quality_judge::HeuristicQualityJudge;
