use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Opaque project identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectId(pub Uuid);

impl ProjectId {
    /// Generates a new random project id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a project's source content came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    /// Uploaded archive, finalized via an `UploadSession`.
    Archive,
    /// A remote repository URL to be cloned.
    RemoteUrl(String),
}

/// Lifecycle status of a project. Transitions form a DAG:
/// `Created -> FilesReady -> Queued -> Analyzing -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Project record exists; source not yet materialized.
    Created,
    /// Source files are available on durable storage.
    FilesReady,
    /// A job message has been enqueued for analysis.
    Queued,
    /// The analysis orchestrator is actively working this project.
    Analyzing,
    /// Terminal: analysis completed successfully.
    Completed,
    /// Terminal: analysis failed (see `Project::error_message`).
    Failed,
}

impl ProjectStatus {
    /// Whether this status is one of the two terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn allows_transition_to(self, next: Self) -> bool {
        use ProjectStatus::{Analyzing, Completed, Created, Failed, FilesReady, Queued};
        matches!(
            (self, next),
            (Created, FilesReady)
                | (FilesReady, Queued)
                | (Queued, Analyzing)
                | (Analyzing, Completed)
                | (Analyzing, Failed)
                | (Queued, Failed)
                // a stuck project may be reset back to FilesReady
                | (Analyzing, FilesReady)
                | (Queued, FilesReady)
        )
    }
}

/// Addressable analysis target: a repository snapshot to be chunked,
/// embedded, and analyzed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: ProjectId,
    /// Human-facing name.
    pub name: String,
    /// How the project's source was obtained.
    pub source_kind: SourceKind,
    /// Opaque reference into blob storage for the materialized source.
    pub storage_path: Option<String>,
    /// Current lifecycle status.
    pub status: ProjectStatus,
    /// Populated when `status == Failed`.
    pub error_message: Option<String>,
    /// Set when transitioning into `Analyzing`.
    pub started_at: Option<DateTime<Utc>>,
    /// Set when transitioning into a terminal status.
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of files counted during routing.
    pub file_count: u64,
    /// Total lines of code counted across routed files.
    pub lines_of_code: u64,
}

impl Project {
    /// Creates a new project in the `Created` status.
    #[must_use]
    pub fn new(name: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            id: ProjectId::new(),
            name: name.into(),
            source_kind,
            storage_path: None,
            status: ProjectStatus::Created,
            error_message: None,
            started_at: None,
            completed_at: None,
            file_count: 0,
            lines_of_code: 0,
        }
    }

    /// Attempts a status transition, enforcing the DAG invariant and
    /// stamping `started_at`/`completed_at` as appropriate.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `next` is not reachable from the
    /// current status.
    pub fn transition_to(&mut self, next: ProjectStatus) -> Result<()> {
        if !self.status.allows_transition_to(next) {
            return Err(Error::InvalidInput(format!(
                "illegal project status transition: {:?} -> {:?}",
                self.status, next
            )));
        }
        if matches!(next, ProjectStatus::Analyzing) {
            self.started_at = Some(Utc::now());
        }
        if next.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        // a reset back to FilesReady clears timing and error state
        if matches!(next, ProjectStatus::FilesReady)
            && matches!(self.status, ProjectStatus::Analyzing | ProjectStatus::Queued)
        {
            self.started_at = None;
            self.completed_at = None;
            self.error_message = None;
        }
        self.status = next;
        Ok(())
    }

    /// Resets a stuck project (in `Analyzing` or `Queued`) back to
    /// `FilesReady`, clearing timestamps and the error message.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if the project is not currently
    /// `Analyzing` or `Queued`.
    pub fn reset_stuck(&mut self) -> Result<()> {
        if !matches!(self.status, ProjectStatus::Analyzing | ProjectStatus::Queued) {
            return Err(Error::InvalidInput(
                "reset_stuck requires status Analyzing or Queued".into(),
            ));
        }
        self.transition_to(ProjectStatus::FilesReady)
    }

    /// Marks the project `Failed` with the given message.
    ///
    /// # Errors
    /// Returns [`Error::InvalidInput`] if `Failed` is unreachable from the
    /// current status.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        self.error_message = Some(message.into());
        self.transition_to(ProjectStatus::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut p = Project::new("demo", SourceKind::Archive);
        assert_eq!(p.status, ProjectStatus::Created);
        p.transition_to(ProjectStatus::FilesReady).unwrap();
        p.transition_to(ProjectStatus::Queued).unwrap();
        p.transition_to(ProjectStatus::Analyzing).unwrap();
        assert!(p.started_at.is_some());
        p.transition_to(ProjectStatus::Completed).unwrap();
        assert!(p.completed_at.is_some());
        assert!(p.status.is_terminal());
    }

    #[test]
    fn illegal_transition_rejected() {
        let mut p = Project::new("demo", SourceKind::Archive);
        assert!(p.transition_to(ProjectStatus::Analyzing).is_err());
    }

    #[test]
    fn terminal_reached_once() {
        let mut p = Project::new("demo", SourceKind::Archive);
        p.transition_to(ProjectStatus::FilesReady).unwrap();
        p.transition_to(ProjectStatus::Queued).unwrap();
        p.transition_to(ProjectStatus::Analyzing).unwrap();
        p.transition_to(ProjectStatus::Failed).unwrap();
        assert!(p.transition_to(ProjectStatus::Completed).is_err());
    }

    #[test]
    fn reset_clears_state() {
        let mut p = Project::new("demo", SourceKind::Archive);
        p.transition_to(ProjectStatus::FilesReady).unwrap();
        p.transition_to(ProjectStatus::Queued).unwrap();
        p.transition_to(ProjectStatus::Analyzing).unwrap();
        p.error_message = Some("transient".into());
        p.reset_stuck().unwrap();
        assert_eq!(p.status, ProjectStatus::FilesReady);
        assert!(p.started_at.is_none());
        assert!(p.error_message.is_none());
    }
}
