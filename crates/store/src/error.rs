use thiserror::Error;

/// Failures surfaced by catalog store backends. The in-memory engine never
/// produces these; fallible backends (and test doubles standing in for
/// them) do, and callers propagate them unmodified.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl StoreError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}
