//! External provider port interfaces (§6 "External Interfaces").
//!
//! Every trait here names a boundary the core delegates across: model
//! backends, context assembly, and the durable stores owned by the
//! infrastructure layer. `kiln-application` depends only on these traits;
//! `kiln-infrastructure` and `kiln-providers` supply implementations.

mod backend;
mod events;
mod feedback;
mod pool;
mod training_stores;
mod versions;

pub use backend::{
    ContextBundle, ContextOptions, ContextProvider, FolderSuggestion, GenerateParams, GenerateResult,
    HtmlGenerator, ModelBackend, NotesProvider, QualityJudge, StreamToken,
};
pub use events::{EventBus, EventStream};
pub use feedback::FeedbackStorePort;
pub use pool::FinetuningPoolPort;
pub use training_stores::{HardNegativeStorePort, HyperparameterStorePort, PerformanceStorePort};
pub use versions::VersionStorePort;
