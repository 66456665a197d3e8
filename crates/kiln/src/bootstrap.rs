//! Composition root: wires every disk-backed store, the in-process event
//! bus, and the in-memory providers into one [`Kiln`] facade.
//!
//! No dependency-injection framework — collaborators are built bottom-up as
//! plain `Arc<dyn Trait>`s and threaded into each use case's constructor,
//! the same way `kiln-application`'s use cases already expect them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_application::config::KilnConfig;
use kiln_application::use_cases::{ArtifactService, FeedbackService, GenerationOrchestrator, JobTable, PoolService, VersionService};
use kiln_domain::ports::{
    ContextProvider, EventBus, FeedbackStorePort, FinetuningPoolPort, HardNegativeStorePort, HtmlGenerator,
    HyperparameterStorePort, ModelBackend, NotesProvider, PerformanceStorePort, QualityJudge, VersionStorePort,
};
use kiln_infrastructure::events::InProcessEventBus;
use kiln_infrastructure::feedback::FileFeedbackStore;
use kiln_infrastructure::hard_negatives::FileHardNegativeStore;
use kiln_infrastructure::hyperparams::FileHyperparameterStore;
use kiln_infrastructure::performance::FilePerformanceStore;
use kiln_infrastructure::pool::FilePool;
use kiln_infrastructure::versions::FileVersionStore;
use kiln_providers::{HeuristicQualityJudge, InMemoryContextProvider, InMemoryModelBackend, InMemoryNotesProvider, MermaidHtmlGenerator};

/// Install the global `tracing` subscriber. Safe to call more than once —
/// later calls are no-ops, logged at `warn`.
pub fn init_tracing() {
    kiln_infrastructure::logging::init();
}

/// Every collaborator the composition root hands to the use cases, before
/// they're assembled into a [`Kiln`]. Exposed so callers who want a
/// non-default provider (a real model backend, say) can override one field
/// and pass the rest through to [`Kiln::from_parts`].
pub struct Collaborators {
    /// Model generation backend.
    pub backend: Arc<dyn ModelBackend>,
    /// Context assembler.
    pub context_provider: Arc<dyn ContextProvider>,
    /// Meeting-notes resolver.
    pub notes_provider: Arc<dyn NotesProvider>,
    /// Optional mermaid-to-HTML renderer.
    pub html_generator: Option<Arc<dyn HtmlGenerator>>,
    /// Optional LLM-as-judge collaborator.
    pub quality_judge: Option<Arc<dyn QualityJudge>>,
    /// Per-job event bus.
    pub event_bus: Arc<dyn EventBus>,
    /// Version Store.
    pub versions: Arc<dyn VersionStorePort>,
    /// Finetuning Pool.
    pub pool: Arc<dyn FinetuningPoolPort>,
    /// Feedback Store.
    pub feedback_store: Arc<dyn FeedbackStorePort>,
    /// Hard-Negative Store.
    pub hard_negatives: Arc<dyn HardNegativeStorePort>,
    /// Performance Tracker store.
    pub performance: Arc<dyn PerformanceStorePort>,
    /// Hyperparameter Store.
    pub hyperparameters: Arc<dyn HyperparameterStorePort>,
}

impl Collaborators {
    /// Build the default set of disk-backed stores (rooted at `data_dir`)
    /// and in-memory providers, per `config`.
    #[must_use]
    pub fn defaults(data_dir: impl Into<PathBuf>, config: &KilnConfig) -> Self {
        let data_dir = data_dir.into();
        Self {
            backend: Arc::new(InMemoryModelBackend::new()),
            context_provider: Arc::new(InMemoryContextProvider::new()),
            notes_provider: Arc::new(InMemoryNotesProvider::new()),
            html_generator: Some(Arc::new(MermaidHtmlGenerator::new())),
            quality_judge: Some(Arc::new(HeuristicQualityJudge::new())),
            event_bus: Arc::new(InProcessEventBus::new(config.event_bus.buffer_size)),
            versions: Arc::new(FileVersionStore::new(&data_dir, config.versions.max_versions_per_id)),
            pool: Arc::new(FilePool::new(&data_dir, config.thresholds.pool_admission_floor)),
            feedback_store: Arc::new(FileFeedbackStore::new(&data_dir)),
            hard_negatives: Arc::new(FileHardNegativeStore::new(&data_dir)),
            performance: Arc::new(FilePerformanceStore::new(&data_dir)),
            hyperparameters: Arc::new(FileHyperparameterStore::new(&data_dir)),
        }
    }
}

/// The assembled set of use cases a caller drives the orchestrator through.
pub struct Kiln {
    /// Generation/job lifecycle use case.
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Artifact lifecycle use case.
    pub artifacts: ArtifactService,
    /// Version history use case.
    pub versions: VersionService,
    /// Feedback recording and training-trigger use case.
    pub feedback: FeedbackService,
    /// Finetuning pool inspection/management use case.
    pub pool: PoolService,
    /// Performance tracker store, exposed directly (no dedicated use case —
    /// §6's `RecordPerformance`/`GetPerformanceTrend`/`GetBestModel` are
    /// thin enough to call straight through the port).
    pub performance: Arc<dyn PerformanceStorePort>,
    /// The resolved configuration this instance was built from.
    pub config: Arc<KilnConfig>,
}

impl Kiln {
    /// Load configuration from `config_path` (falling back to defaults if
    /// absent) and wire a `Kiln` over disk-backed stores rooted at
    /// `data_dir`, using the default in-memory providers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but fails to parse.
    pub fn bootstrap(data_dir: impl AsRef<Path>, config_path: Option<&Path>) -> kiln_domain::Result<Self> {
        let config = match config_path {
            Some(path) => kiln_infrastructure::config::load(path)?,
            None => kiln_infrastructure::config::load_defaults()?,
        };
        let config = Arc::new(config);
        let collaborators = Collaborators::defaults(data_dir.as_ref(), &config);
        Ok(Self::from_parts(collaborators, config))
    }

    /// Wire a `Kiln` from an explicit set of collaborators and a resolved
    /// configuration. Use this when one or more providers need to be
    /// swapped for a real backend.
    #[must_use]
    pub fn from_parts(collaborators: Collaborators, config: Arc<KilnConfig>) -> Self {
        let jobs: Arc<JobTable> = Arc::new(JobTable::new(config.jobs.max_jobs, config.jobs.retention_secs));

        let orchestrator = Arc::new(GenerationOrchestrator::new(
            Arc::clone(&collaborators.backend),
            Arc::clone(&collaborators.context_provider),
            Arc::clone(&collaborators.notes_provider),
            collaborators.html_generator.clone(),
            collaborators.quality_judge.clone(),
            Arc::clone(&collaborators.event_bus),
            Arc::clone(&collaborators.versions),
            Arc::clone(&collaborators.pool),
            Arc::clone(&collaborators.hard_negatives),
            Arc::clone(&jobs),
            Arc::clone(&config),
        ));

        let artifacts = ArtifactService::new(Arc::clone(&collaborators.versions), Arc::clone(&orchestrator));
        let versions = VersionService::new(Arc::clone(&collaborators.versions));
        let feedback = FeedbackService::new(
            Arc::clone(&collaborators.feedback_store),
            Arc::clone(&collaborators.pool),
            Arc::clone(&collaborators.hard_negatives),
            Arc::clone(&collaborators.hyperparameters),
            Arc::clone(&config),
        );
        let pool = PoolService::new(
            Arc::clone(&collaborators.pool),
            Arc::clone(&collaborators.hard_negatives),
            Arc::clone(&collaborators.hyperparameters),
            Arc::clone(&config),
        );

        Self {
            orchestrator,
            artifacts,
            versions,
            feedback,
            pool,
            performance: collaborators.performance,
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_over_a_fresh_data_dir_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let kiln = Kiln::bootstrap(dir.path(), None).unwrap();
        assert_eq!(kiln.config.thresholds.acceptance, 80);
    }
}
