//! Entity and value-object definitions (§3 of the data model).

mod checkpoint;
mod chunk;
mod finding;
mod job;
mod plan;
mod project;
mod report;
mod upload_session;
mod vector_entry;

pub use checkpoint::{CheckpointPhase, CheckpointStatus, JobCheckpoint};
pub use chunk::{Chunk, ChunkHash, SemanticType};
pub use finding::{ReviewFinding, Severity};
pub use job::{JobMessage, JobPriority, JobType};
pub use plan::{AnalysisPlan, DecisionReason, FileDecision, FileRouteDecision, PlanRollups};
pub use project::{Project, ProjectId, ProjectStatus, SourceKind};
pub use report::Report;
pub use upload_session::UploadSession;
pub use vector_entry::VectorEntry;
