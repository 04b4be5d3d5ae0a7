use crate::artifacts::checkout::conflict::ConflictReport;
use std::path::PathBuf;

/// Failures a caller of checkout may want to tell apart
///
/// Travels inside `anyhow::Error`; recover it with `downcast_ref`.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// Nothing was written: the working tree and index are untouched
    #[error("{0}\nAborting")]
    Conflicts(ConflictReport),
    /// Cleanup failed partway, earlier deletions stay applied
    #[error("Cannot delete {}", path.display())]
    CannotDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CheckoutError {
    pub fn conflicts(&self) -> Option<&ConflictReport> {
        match self {
            CheckoutError::Conflicts(report) => Some(report),
            CheckoutError::CannotDelete { .. } => None,
        }
    }
}
