//! Shared test helpers for in-memory sync integration tests.

use async_trait::async_trait;
use mockable::DefaultClock;
use rstest::fixture;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use taskmirror::sync::adapters::memory::InMemorySyncStore;
use taskmirror::sync::domain::{SourceTask, TaskSource, UserId};
use taskmirror::sync::ports::{CompletionOutcome, SnapshotSource, SourceError, SourceResult};
use taskmirror::sync::services::SyncOrchestrator;
use tokio::runtime::Runtime;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Orchestrator wired to the in-memory store and a scripted source.
pub type TestOrchestrator = SyncOrchestrator<InMemorySyncStore, ScriptedSource, DefaultClock>;

/// Snapshot source answering from queued results.
///
/// An empty snapshot queue yields empty snapshots; an empty completion
/// queue confirms completions.
#[derive(Default)]
pub struct ScriptedSource {
    snapshots: Mutex<VecDeque<SourceResult<Vec<SourceTask>>>>,
    completions: Mutex<VecDeque<CompletionOutcome>>,
}

impl ScriptedSource {
    /// Queues a snapshot for the next fetch.
    pub fn queue_snapshot(&self, entries: Vec<SourceTask>) {
        lock(&self.snapshots).push_back(Ok(entries));
    }

    /// Queues a fetch failure.
    pub fn queue_fetch_error(&self, err: SourceError) {
        lock(&self.snapshots).push_back(Err(err));
    }

    /// Queues the outcome of the next completion request.
    pub fn queue_completion(&self, outcome: CompletionOutcome) {
        lock(&self.completions).push_back(outcome);
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    fn source(&self) -> TaskSource {
        TaskSource::Ticktick
    }

    fn auth_hint(&self) -> Option<String> {
        None
    }

    async fn fetch_snapshot(&self) -> SourceResult<Vec<SourceTask>> {
        lock(&self.snapshots)
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn complete_task(&self, _project_id: &str, _external_id: &str) -> CompletionOutcome {
        lock(&self.completions)
            .pop_front()
            .unwrap_or_else(CompletionOutcome::confirmed)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Store, scripted source, and orchestrator wired together for one test.
pub struct TestService {
    pub store: Arc<InMemorySyncStore>,
    pub source: Arc<ScriptedSource>,
    pub orchestrator: TestOrchestrator,
}

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a fresh store and orchestrator for each test.
#[fixture]
pub fn service() -> TestService {
    let store = Arc::new(InMemorySyncStore::new());
    let source = Arc::new(ScriptedSource::default());
    let orchestrator = SyncOrchestrator::new(
        Arc::clone(&store),
        Arc::clone(&source),
        Arc::new(DefaultClock),
    );
    TestService {
        store,
        source,
        orchestrator,
    }
}

/// Creates an account for the handle and returns its identifier.
///
/// # Errors
///
/// Returns an error if the account cannot be stored.
pub fn create_user(rt: &Runtime, service: &TestService, handle: &str) -> Result<UserId, BoxError> {
    Ok(rt.block_on(service.orchestrator.ensure_user(handle))?)
}

/// Builds a snapshot entry without a project.
#[must_use]
pub fn entry(external_id: &str, title: &str) -> SourceTask {
    SourceTask::new(external_id, title).expect("valid snapshot entry")
}

/// Builds a snapshot entry linked to a named project.
#[must_use]
pub fn project_entry(external_id: &str, title: &str, project: &str) -> SourceTask {
    entry(external_id, title)
        .with_project_id(format!("proj-{project}"))
        .with_project_name(project)
}
