use thiserror::Error;

/// Ways a search request can fail to produce a result.
///
/// The display string is what the user sees in the error panel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("invalid search response: {0}")]
    Parse(String),

    /// Superseded by a newer request. Never shown to the user.
    #[error("request canceled")]
    Canceled,
}

impl SearchError {
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }
}
