use thiserror::Error;

/// Failures of the ledger and goal operations. None of them leave partial
/// state behind: an operation either returns its full result or this error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(LedgerError::IndexOutOfRange { index, len })
    }
}
