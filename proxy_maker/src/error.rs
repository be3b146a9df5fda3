//! Error types for proxy_maker
//!
//! Slot-local failures (`CatalogError`, `SelectionError`) never escalate past
//! their slot. `ExportError` is the only deck-level failure.

use thiserror::Error;

/// Failure reaching or reading the card-data source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing matched the name or identity
    #[error("Not found on card source: {0}")]
    NotFound(String),
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP error status code other than 404
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),
    /// Body was not the expected JSON shape
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Why a slot's printings could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The identity has no printings (empty or malformed result)
    #[error("No printings found for {0}")]
    NotFound(String),
    /// Transient failure, the user may resubmit
    #[error("Card source unavailable: {0}")]
    SourceUnavailable(String),
}

impl CatalogError {
    /// Classify a source failure for the given identity
    pub fn from_source(identity: &str, err: SourceError) -> Self {
        match err {
            SourceError::NotFound(_) | SourceError::Malformed(_) => {
                CatalogError::NotFound(identity.to_string())
            }
            SourceError::Network(e) => CatalogError::SourceUnavailable(e.to_string()),
            SourceError::HttpStatus(status) => {
                CatalogError::SourceUnavailable(format!("HTTP {}", status))
            }
        }
    }
}

/// Rejected user transition on a slot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Slot {0} has no printings loaded")]
    NotReady(usize),
    #[error("Set {0:?} has no printing of this card")]
    UnknownSet(String),
    #[error("No slot at index {0}")]
    SlotOutOfRange(usize),
}

/// Deck-level export failure
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Export backend unavailable: {0}")]
    Unavailable(String),
    #[error("No card in the deck has a selected printing")]
    NothingToExport,
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Unavailable(err.to_string())
    }
}

/// Unified error type for the command line and web entry points
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Export(#[from] ExportError),
    /// A `--pick` argument that is not `SLOT:SET[:LANG]`
    #[error("Invalid pick {0:?}, expected SLOT:SET[:LANG]")]
    InvalidPick(String),
}

/// Result alias for proxy_maker operations
pub type Result<T> = std::result::Result<T, ProxyError>;
