use super::record::RecordKind;

/// Error type for record store operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(RecordKind),

    #[error("Failed to load {kind} fixture: {message}")]
    Fixture { kind: RecordKind, message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
