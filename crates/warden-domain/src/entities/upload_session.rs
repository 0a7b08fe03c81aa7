use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket for a multi-part upload. The core only observes the terminal
/// "finalized" state; session-part assembly is an external collaborator's
/// responsibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSession {
    /// Unique identifier.
    pub id: Uuid,
    /// Set once all parts have been assembled and verified.
    finalized_storage_path: Option<String>,
}

impl UploadSession {
    /// Constructs a session that has already reached its finalized state,
    /// for callers that only need the observed contract.
    #[must_use]
    pub fn finalized(id: Uuid, storage_path: impl Into<String>) -> Self {
        Self {
            id,
            finalized_storage_path: Some(storage_path.into()),
        }
    }

    /// The opaque storage reference, once finalized; `None` while parts
    /// are still being assembled.
    #[must_use]
    pub fn storage_path(&self) -> Option<&str> {
        self.finalized_storage_path.as_deref()
    }
}
