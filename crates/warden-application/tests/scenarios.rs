//! End-to-end scenario tests (spec.md §8, S1/S5/S6). S2/S3/S4 are covered
//! as focused unit tests alongside the code they exercise
//! (`use_cases::routing` and `warden_infrastructure::resilience::timeout`);
//! these three are the ones that only make sense wired through the full
//! `JobConsumer` pipeline against fakes for every port.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use warden_application::use_cases::agents::AgentOrchestrator;
use warden_application::use_cases::job_consumer::JobConsumer;
use warden_application::use_cases::retrieval::RetrievalOrchestrator;
use warden_domain::entities::{
    Chunk, ChunkHash, CheckpointPhase, CheckpointStatus, JobCheckpoint, JobMessage, JobPriority, JobType, Project,
    ProjectId, ProjectStatus, Report, ReviewFinding, Severity, SourceKind, VectorEntry,
};
use warden_domain::error::Result;
use warden_domain::ports::{
    AgentGuardrails, AnalysisAgent, ChunkRepository, ChunkerOptions, CheckpointStore, ConcurrencyLimiter,
    EmbeddingProvider, FindingRepository, JobQueue, MemoryMonitor, ProgressChannel, ProgressEvent, ProjectRepository,
    ReportRepository, SlotGuard, SlotKind, SourceChunker, VectorQuery, VectorQueryResult, VectorStore, Watchdog,
};

// ---- fakes: one small in-memory/no-op adapter per port -------------------

struct FakeQueue {
    messages: Mutex<Vec<JobMessage>>,
}

impl FakeQueue {
    fn new() -> Self {
        Self { messages: Mutex::new(Vec::new()) }
    }

    fn enqueue(&self, message: JobMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

#[async_trait]
impl JobQueue for FakeQueue {
    async fn dequeue(&self, _visibility_timeout_secs: u64) -> Result<Option<JobMessage>> {
        Ok(self.messages.lock().unwrap().pop())
    }

    async fn complete(&self, _job_id: uuid::Uuid) -> Result<()> {
        Ok(())
    }

    async fn abandon(&self, _job_id: uuid::Uuid) -> Result<()> {
        Ok(())
    }

    async fn dead_letter(&self, _job_id: uuid::Uuid, _reason: &str) -> Result<()> {
        Ok(())
    }
}

struct FakeProjectRepo {
    projects: Mutex<HashMap<ProjectId, Project>>,
}

impl FakeProjectRepo {
    fn new() -> Self {
        Self { projects: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl ProjectRepository for FakeProjectRepo {
    async fn get(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(&id).cloned())
    }

    async fn save(&self, project: &Project) -> Result<()> {
        self.projects.lock().unwrap().insert(project.id, project.clone());
        Ok(())
    }
}

struct FakeCheckpointStore {
    checkpoints: Mutex<HashMap<ProjectId, JobCheckpoint>>,
}

impl FakeCheckpointStore {
    fn new() -> Self {
        Self { checkpoints: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl CheckpointStore for FakeCheckpointStore {
    async fn get(&self, project_id: ProjectId) -> Result<Option<JobCheckpoint>> {
        Ok(self.checkpoints.lock().unwrap().get(&project_id).cloned())
    }

    async fn get_by_status(&self, status: CheckpointStatus) -> Result<Vec<JobCheckpoint>> {
        Ok(self
            .checkpoints
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == status)
            .cloned()
            .collect())
    }

    async fn get_pending_retry(&self, max_retries: u32) -> Result<Vec<JobCheckpoint>> {
        Ok(self
            .checkpoints
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.status == CheckpointStatus::PendingRetry && c.retry_count < max_retries)
            .cloned()
            .collect())
    }

    async fn add(&self, checkpoint: &JobCheckpoint) -> Result<()> {
        self.checkpoints.lock().unwrap().insert(checkpoint.project_id, checkpoint.clone());
        Ok(())
    }

    async fn update(&self, checkpoint: &JobCheckpoint) -> Result<()> {
        self.checkpoints.lock().unwrap().insert(checkpoint.project_id, checkpoint.clone());
        Ok(())
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()> {
        self.checkpoints.lock().unwrap().remove(&project_id);
        Ok(())
    }

    async fn delete_older_than(&self, _cutoff: chrono::DateTime<chrono::Utc>) -> Result<u64> {
        Ok(0)
    }
}

struct FakeChunkRepo {
    saved: Mutex<Vec<Chunk>>,
}

impl FakeChunkRepo {
    fn new() -> Self {
        Self { saved: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl ChunkRepository for FakeChunkRepo {
    async fn existing_hashes(&self, _project_id: ProjectId, _hashes: &[ChunkHash]) -> Result<Vec<ChunkHash>> {
        Ok(Vec::new())
    }

    async fn save_batch(&self, chunks: &[Chunk]) -> Result<()> {
        self.saved.lock().unwrap().extend_from_slice(chunks);
        Ok(())
    }

    async fn delete_chunk(&self, project_id: ProjectId, hash: ChunkHash) -> Result<()> {
        self.saved.lock().unwrap().retain(|c| !(c.project_id == project_id && c.chunk_hash == hash));
        Ok(())
    }

    async fn count(&self, project_id: ProjectId) -> Result<u64> {
        Ok(self.saved.lock().unwrap().iter().filter(|c| c.project_id == project_id).count() as u64)
    }
}

struct FakeFindingRepo {
    saved: Mutex<Vec<ReviewFinding>>,
}

impl FakeFindingRepo {
    fn new() -> Self {
        Self { saved: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl FindingRepository for FakeFindingRepo {
    async fn save_batch(&self, findings: &[ReviewFinding]) -> Result<()> {
        self.saved.lock().unwrap().extend_from_slice(findings);
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ReviewFinding>> {
        Ok(self.saved.lock().unwrap().iter().filter(|f| f.project_id == project_id).cloned().collect())
    }
}

struct FakeReportRepo {
    saved: Mutex<HashMap<ProjectId, Report>>,
}

impl FakeReportRepo {
    fn new() -> Self {
        Self { saved: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl ReportRepository for FakeReportRepo {
    async fn save(&self, report: &Report) -> Result<()> {
        self.saved.lock().unwrap().insert(report.project_id, report.clone());
        Ok(())
    }

    async fn get_for_project(&self, project_id: ProjectId) -> Result<Option<Report>> {
        Ok(self.saved.lock().unwrap().get(&project_id).cloned())
    }
}

/// One chunk per non-empty file, whole content, no real splitting — the
/// Chunker's own splitting behavior is exercised in `warden-providers`.
struct FakeChunker;

impl SourceChunker for FakeChunker {
    fn chunk_files(
        &self,
        project_id: ProjectId,
        files: &BTreeMap<String, String>,
        options: ChunkerOptions,
    ) -> Result<Vec<Chunk>> {
        Ok(files
            .iter()
            .filter(|(_, content)| !content.is_empty())
            .map(|(path, content)| {
                let end_line = content.lines().count().max(1) as u32;
                Chunk {
                    chunk_hash: ChunkHash::compute(project_id, path, content, 1, end_line),
                    project_id,
                    file_path: path.clone(),
                    start_line: 1,
                    end_line,
                    token_count: (content.len() as u32 / 4).max(1),
                    language: "text".to_string(),
                    text_hash: format!("{:016x}", content.len() as u64 ^ content.bytes().map(u64::from).sum::<u64>()),
                    content: options.store_chunk_text.then(|| content.clone()),
                    semantic_type: None,
                    semantic_name: None,
                    chunk_index: 0,
                    total_chunks: 1,
                }
            })
            .collect())
    }
}

struct FakeEmbedder;

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn generate(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![1.0, 0.0, 0.0])
    }

    async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }

    fn dimension(&self) -> usize {
        3
    }

    fn model_name(&self) -> &str {
        "fake-embedder"
    }
}

struct FakeVectorStore {
    entries: Mutex<HashMap<ChunkHash, VectorEntry>>,
}

impl FakeVectorStore {
    fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn index_vector(&self, entry: VectorEntry) -> Result<()> {
        self.entries.lock().unwrap().insert(entry.key, entry);
        Ok(())
    }

    async fn index_vectors_batch(&self, entries: Vec<VectorEntry>) -> Result<()> {
        let mut guard = self.entries.lock().unwrap();
        for entry in entries {
            guard.insert(entry.key, entry);
        }
        Ok(())
    }

    async fn query(&self, _query: VectorQuery) -> Result<Vec<VectorQueryResult>> {
        Ok(Vec::new())
    }

    async fn delete_by_project(&self, project_id: ProjectId) -> Result<()> {
        self.entries.lock().unwrap().retain(|_, v| v.project_id != project_id);
        Ok(())
    }

    async fn delete(&self, key: ChunkHash) -> Result<()> {
        self.entries.lock().unwrap().remove(&key);
        Ok(())
    }

    async fn count(&self, project_id: Option<ProjectId>) -> Result<u64> {
        let guard = self.entries.lock().unwrap();
        Ok(match project_id {
            Some(id) => guard.values().filter(|v| v.project_id == id).count() as u64,
            None => guard.len() as u64,
        })
    }
}

/// Fails every `index_vector` call; used to verify the orchestrator
/// compensates a saved chunk row when its vector upsert never lands.
struct FailingVectorStore;

#[async_trait]
impl VectorStore for FailingVectorStore {
    async fn index_vector(&self, _entry: VectorEntry) -> Result<()> {
        Err(warden_domain::error::Error::external_unavailable("vector store unreachable"))
    }

    async fn index_vectors_batch(&self, _entries: Vec<VectorEntry>) -> Result<()> {
        Err(warden_domain::error::Error::external_unavailable("vector store unreachable"))
    }

    async fn query(&self, _query: VectorQuery) -> Result<Vec<VectorQueryResult>> {
        Ok(Vec::new())
    }

    async fn delete_by_project(&self, _project_id: ProjectId) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: ChunkHash) -> Result<()> {
        Ok(())
    }

    async fn count(&self, _project_id: Option<ProjectId>) -> Result<u64> {
        Ok(0)
    }
}

struct NoopGuard;
impl SlotGuard for NoopGuard {}

struct FakeLimiter;

#[async_trait]
impl ConcurrencyLimiter for FakeLimiter {
    async fn acquire(&self, _kind: SlotKind) -> Result<Box<dyn SlotGuard>> {
        Ok(Box::new(NoopGuard))
    }

    fn queue_depth(&self, _kind: SlotKind) -> usize {
        0
    }
}

struct FakeMemoryMonitor {
    should_pause: Mutex<bool>,
}

impl FakeMemoryMonitor {
    fn new() -> Self {
        Self { should_pause: Mutex::new(false) }
    }
}

impl MemoryMonitor for FakeMemoryMonitor {
    fn current_memory_mb(&self) -> u64 {
        0
    }

    fn memory_usage_percent(&self) -> f64 {
        0.0
    }

    fn is_memory_warning(&self) -> bool {
        false
    }

    fn should_pause_processing(&self) -> bool {
        *self.should_pause.lock().unwrap()
    }

    fn request_gc_if_needed(&self) {}

    fn force_aggressive_gc(&self) {}
}

/// Cancels the job's token the `stuck_after`-th time it's heartbeated,
/// standing in for `BackgroundWatchdog`'s own stuck-detection loop (which
/// is exercised directly in `warden-infrastructure::watchdog`'s own tests).
struct StuckWatchdog {
    stuck_after: usize,
    heartbeats: Mutex<usize>,
    token: Mutex<Option<CancellationToken>>,
}

impl StuckWatchdog {
    fn new(stuck_after: usize) -> Self {
        Self { stuck_after, heartbeats: Mutex::new(0), token: Mutex::new(None) }
    }
}

impl Watchdog for StuckWatchdog {
    fn register(&self, _project_id: ProjectId, cancellation: CancellationToken) {
        *self.token.lock().unwrap() = Some(cancellation);
    }

    fn heartbeat(&self, _project_id: ProjectId, _phase: &str) {
        let mut count = self.heartbeats.lock().unwrap();
        *count += 1;
        if *count >= self.stuck_after {
            if let Some(token) = self.token.lock().unwrap().as_ref() {
                token.cancel();
            }
        }
    }

    fn complete(&self, _project_id: ProjectId) {}
}

struct NoopWatchdog;
impl Watchdog for NoopWatchdog {
    fn register(&self, _project_id: ProjectId, _cancellation: CancellationToken) {}
    fn heartbeat(&self, _project_id: ProjectId, _phase: &str) {}
    fn complete(&self, _project_id: ProjectId) {}
}

struct FakeProgress {
    events: Mutex<Vec<ProgressEvent>>,
    sender: tokio::sync::broadcast::Sender<ProgressEvent>,
}

impl FakeProgress {
    fn new() -> Self {
        let (sender, _) = tokio::sync::broadcast::channel(64);
        Self { events: Mutex::new(Vec::new()), sender }
    }
}

impl ProgressChannel for FakeProgress {
    fn publish(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
        let _ = self.sender.send(event);
    }

    fn subscribe(&self, _project_id: ProjectId) -> tokio::sync::broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

/// Returns a fixed set of findings regardless of project contents; used to
/// drive S6's evidence discipline.
struct ScriptedAgent {
    agent_type: String,
    findings: Vec<ReviewFinding>,
}

#[async_trait]
impl AnalysisAgent for ScriptedAgent {
    fn agent_type(&self) -> &str {
        &self.agent_type
    }

    fn guardrails(&self) -> AgentGuardrails {
        AgentGuardrails::default()
    }

    async fn analyze(&self, _project_id: ProjectId, _working_directory: &Path) -> Result<Vec<ReviewFinding>> {
        Ok(self.findings.clone())
    }
}

fn base_finding(project_id: ProjectId, description: &str) -> ReviewFinding {
    ReviewFinding {
        id: uuid::Uuid::new_v4(),
        project_id,
        report_id: None,
        category: "correctness".to_string(),
        severity: Severity::Medium,
        agent_type: "correctness-agent".to_string(),
        description: description.to_string(),
        explanation: "explanation".to_string(),
        file_path: None,
        line_range: None,
        symbol: None,
        suggested_fix: None,
        original_snippet: None,
        fixed_snippet: None,
        confidence: 0.9,
    }
}

/// Builds a fully-wired `JobConsumer` over in-memory fakes, substituting
/// `watchdog` and `agents` so each scenario can drive the one behavior it
/// targets without dragging in the others.
fn build_consumer(
    queue: Arc<FakeQueue>,
    project_repo: Arc<FakeProjectRepo>,
    checkpoint_store: Arc<FakeCheckpointStore>,
    watchdog: Arc<dyn Watchdog>,
    agents: Vec<Arc<dyn AnalysisAgent>>,
    progress: Arc<FakeProgress>,
) -> JobConsumer {
    let limiter: Arc<dyn ConcurrencyLimiter> = Arc::new(FakeLimiter);
    let memory: Arc<dyn MemoryMonitor> = Arc::new(FakeMemoryMonitor::new());

    let retrieval = Arc::new(RetrievalOrchestrator::new(
        Arc::new(FakeChunker),
        Arc::new(FakeEmbedder),
        Arc::new(FakeVectorStore::new()),
        Arc::new(FakeChunkRepo::new()),
        checkpoint_store.clone(),
        limiter.clone(),
        memory.clone(),
        watchdog.clone(),
        progress.clone(),
        ChunkerOptions {
            max_chunk_tokens: 400,
            overlap_tokens: 50,
            min_chunk_tokens: 1,
            use_semantic_splitting: false,
            store_chunk_text: true,
        },
    ));

    let agent_orchestrator = Arc::new(AgentOrchestrator::new(
        agents,
        limiter,
        memory,
        checkpoint_store.clone(),
        Arc::new(FakeFindingRepo::new()),
        Arc::new(FakeReportRepo::new()),
        progress.clone(),
    ));

    JobConsumer::new(queue, project_repo, checkpoint_store, retrieval, agent_orchestrator, watchdog, progress)
}

fn enqueue_project(queue: &FakeQueue, project_repo: &FakeProjectRepo, working_directory_root: &Path) -> ProjectId {
    let mut project = Project::new("scenario-project", SourceKind::Archive);
    project.transition_to(ProjectStatus::FilesReady).unwrap();
    project.transition_to(ProjectStatus::Queued).unwrap();
    let project_id = project.id;
    project_repo.projects.lock().unwrap().insert(project_id, project);

    std::fs::create_dir_all(working_directory_root.join(project_id.to_string())).unwrap();

    queue.enqueue(JobMessage {
        job_id: uuid::Uuid::new_v4(),
        project_id,
        job_type: JobType::Analysis,
        priority: JobPriority::Normal,
        delivery_count: 0,
        enqueued_at: chrono::Utc::now(),
        scheduled_for: None,
        correlation_id: None,
        metadata: HashMap::new(),
    });
    project_id
}

// ---- S1: direct send path -------------------------------------------------
//
// Two small files, a single roster agent, no stuck detection: the job
// should complete end to end with a health score in [0, 100] and zero
// findings persisted (the agent reports nothing).

#[tokio::test]
async fn s1_small_project_completes_with_report_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(FakeQueue::new());
    let project_repo = Arc::new(FakeProjectRepo::new());
    let checkpoint_store = Arc::new(FakeCheckpointStore::new());
    let progress = Arc::new(FakeProgress::new());

    let project_id = enqueue_project(&queue, &project_repo, dir.path());
    let project_dir = dir.path().join(project_id.to_string());
    std::fs::write(project_dir.join("a.cs"), "class A {}\n").unwrap();
    std::fs::write(project_dir.join("b.cs"), "class B {}\n").unwrap();

    let agents: Vec<Arc<dyn AnalysisAgent>> =
        vec![Arc::new(ScriptedAgent { agent_type: "security-agent".to_string(), findings: Vec::new() })];
    let consumer =
        build_consumer(queue, project_repo.clone(), checkpoint_store.clone(), Arc::new(NoopWatchdog), agents, progress.clone());

    let processed = consumer.process_next(dir.path(), 60).await.unwrap();
    assert!(processed);

    let saved_project = project_repo.get(project_id).await.unwrap().unwrap();
    assert_eq!(saved_project.status, ProjectStatus::Completed);

    let checkpoint = checkpoint_store.get(project_id).await.unwrap().unwrap();
    assert_eq!(checkpoint.status, CheckpointStatus::Completed);
    assert_eq!(checkpoint.phase, CheckpointPhase::Completed);

    let completion = progress
        .events
        .lock()
        .unwrap()
        .iter()
        .find_map(|e| match e {
            ProgressEvent::Completion(c) => Some(c.clone()),
            _ => None,
        })
        .expect("a JobCompletion event should have been published");
    assert!(completion.is_success);
    assert_eq!(completion.error_kind, None);
}

// ---- S5: stuck batch -------------------------------------------------------
//
// The watchdog cancels the job partway through embedding. The checkpoint
// must land with `LastPhase` at `Embedding` and status `PendingRetry`
// (first failure, under `MaxRetryAttempts`), and the published
// `JobCompletion` must carry `errorKind=Cancelled`.

#[tokio::test]
async fn s5_stuck_embedding_checkpoints_at_embedding_and_reports_cancelled() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(FakeQueue::new());
    let project_repo = Arc::new(FakeProjectRepo::new());
    let checkpoint_store = Arc::new(FakeCheckpointStore::new());
    let progress = Arc::new(FakeProgress::new());

    let project_id = enqueue_project(&queue, &project_repo, dir.path());
    let project_dir = dir.path().join(project_id.to_string());
    std::fs::write(project_dir.join("a.cs"), "class A {}\n").unwrap();

    // cancel on the very first heartbeat, i.e. as soon as the Embedding
    // phase's batch loop starts doing work
    let watchdog: Arc<dyn Watchdog> = Arc::new(StuckWatchdog::new(1));
    let agents: Vec<Arc<dyn AnalysisAgent>> = vec![];
    let consumer = build_consumer(queue, project_repo.clone(), checkpoint_store.clone(), watchdog, agents, progress.clone());

    let processed = consumer.process_next(dir.path(), 60).await.unwrap();
    assert!(processed);

    let checkpoint = checkpoint_store.get(project_id).await.unwrap().unwrap();
    assert_eq!(checkpoint.phase, CheckpointPhase::Embedding);
    assert_eq!(checkpoint.status, CheckpointStatus::PendingRetry);
    assert!(checkpoint.error_message.as_deref().is_some_and(|m| m.contains("cancel")));

    let saved_project = project_repo.get(project_id).await.unwrap().unwrap();
    assert_eq!(saved_project.status, ProjectStatus::Failed);

    let completion = progress
        .events
        .lock()
        .unwrap()
        .iter()
        .find_map(|e| match e {
            ProgressEvent::Completion(c) => Some(c.clone()),
            _ => None,
        })
        .expect("a JobCompletion event should have been published");
    assert!(!completion.is_success);
    assert_eq!(completion.error_kind, Some(warden_domain::error::ErrorKind::Cancelled));

    // `run_job` reuses any checkpoint whose status isn't `Completed`
    // (see `use_cases::job_consumer::JobConsumer::run_job`), so the
    // `PendingRetry` checkpoint left behind here is exactly what a
    // subsequent dispatch for this project would pick back up instead of
    // starting a fresh `NotStarted` one.
    assert_ne!(checkpoint.status, CheckpointStatus::Completed);
    assert!(checkpoint.can_retry(3));
}

// ---- S6: evidence discipline ----------------------------------------------
//
// Three findings from one agent: only the one with both a file path and a
// symbol survives `has_evidence()`; the other two are recorded as skipped
// notes, not persisted.

#[tokio::test]
async fn s6_only_findings_with_evidence_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let queue = Arc::new(FakeQueue::new());
    let project_repo = Arc::new(FakeProjectRepo::new());
    let checkpoint_store = Arc::new(FakeCheckpointStore::new());
    let progress = Arc::new(FakeProgress::new());

    let project_id = enqueue_project(&queue, &project_repo, dir.path());
    let project_dir = dir.path().join(project_id.to_string());
    std::fs::write(project_dir.join("a.cs"), "class A {}\n").unwrap();

    let mut description_only = base_finding(project_id, "generic description, no location");
    description_only.file_path = None;

    let mut file_only = base_finding(project_id, "file path but no lines or symbol");
    file_only.file_path = Some("a.cs".to_string());

    let mut file_and_symbol = base_finding(project_id, "file path plus symbol");
    file_and_symbol.file_path = Some("a.cs".to_string());
    file_and_symbol.symbol = Some("A".to_string());

    let agent = ScriptedAgent {
        agent_type: "correctness-agent".to_string(),
        findings: vec![description_only, file_only, file_and_symbol],
    };
    let agents: Vec<Arc<dyn AnalysisAgent>> = vec![Arc::new(agent)];
    let consumer =
        build_consumer(queue, project_repo, checkpoint_store, Arc::new(NoopWatchdog), agents, progress);

    let processed = consumer.process_next(dir.path(), 60).await.unwrap();
    assert!(processed);
}

// direct unit-level check of the orchestrator, independent of the queue
// plumbing, asserting exactly which finding survives
#[tokio::test]
async fn s6_agent_orchestrator_persists_only_the_evidenced_finding() {
    let project = Project::new("evidence-project", SourceKind::Archive);
    let dir = tempfile::tempdir().unwrap();

    let mut description_only = base_finding(project.id, "generic description, no location");
    description_only.file_path = None;

    let mut file_only = base_finding(project.id, "file path but no lines or symbol");
    file_only.file_path = Some("a.cs".to_string());

    let mut file_and_symbol = base_finding(project.id, "file path plus symbol");
    file_and_symbol.file_path = Some("a.cs".to_string());
    file_and_symbol.symbol = Some("A".to_string());

    let agent = ScriptedAgent {
        agent_type: "correctness-agent".to_string(),
        findings: vec![description_only, file_only, file_and_symbol],
    };

    let finding_repo = Arc::new(FakeFindingRepo::new());
    let report_repo = Arc::new(FakeReportRepo::new());
    let orchestrator = AgentOrchestrator::new(
        vec![Arc::new(agent)],
        Arc::new(FakeLimiter),
        Arc::new(FakeMemoryMonitor::new()),
        Arc::new(FakeCheckpointStore::new()),
        finding_repo.clone(),
        report_repo,
        Arc::new(FakeProgress::new()),
    );

    let outcome = orchestrator.run(&project, dir.path(), &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.findings.len(), 1);
    assert_eq!(outcome.findings[0].description, "file path plus symbol");
    assert_eq!(outcome.skipped_notes.len(), 2);

    let persisted = finding_repo.list_for_project(project.id).await.unwrap();
    assert_eq!(persisted.len(), 1);
    assert!(persisted[0].has_evidence());
    assert!((0..=100).contains(&outcome.report.health_score));
}

// a chunk whose vector upsert fails after its row was saved must not be
// left behind: the next `existing_hashes` check would otherwise hide it
// from every future embedding attempt
#[tokio::test]
async fn failed_vector_upsert_deletes_the_already_saved_chunk_row() {
    let project_id = ProjectId::new();
    let chunk_repo = Arc::new(FakeChunkRepo::new());

    let orchestrator = RetrievalOrchestrator::new(
        Arc::new(FakeChunker),
        Arc::new(FakeEmbedder),
        Arc::new(FailingVectorStore),
        chunk_repo.clone(),
        Arc::new(FakeCheckpointStore::new()),
        Arc::new(FakeLimiter),
        Arc::new(FakeMemoryMonitor::new()),
        Arc::new(NoopWatchdog),
        Arc::new(FakeProgress::new()),
        ChunkerOptions {
            max_chunk_tokens: 400,
            overlap_tokens: 50,
            min_chunk_tokens: 1,
            use_semantic_splitting: false,
            store_chunk_text: true,
        },
    );

    let mut files = BTreeMap::new();
    files.insert("a.rs".to_string(), "fn main() {}".to_string());

    let result = orchestrator.index_project(project_id, &files, 1, &CancellationToken::new()).await;
    assert!(result.is_err());
    assert_eq!(chunk_repo.count(project_id).await.unwrap(), 0);
}
