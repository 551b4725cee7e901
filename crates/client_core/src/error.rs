use thiserror::Error;

/// Failures surfaced in the search results area. Session expiry is never
/// represented here; the session guard handles it without a visible error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    SearchFailed(String),
    #[error("details fetch failed: {0}")]
    DetailsFetchFailed(String),
}

/// Failures surfaced in the match result view.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("select at least one favorite before requesting a match")]
    NoFavoritesSelected,
    #[error("match request failed: {0}")]
    MatchRequestFailed(String),
    #[error("matched details fetch failed: {0}")]
    DetailsFetchFailed(String),
    /// The match endpoint accepted the favorites but the returned id could
    /// not be resolved to a record. Not retried automatically.
    #[error("matched dog details could not be retrieved")]
    MatchDetailsUnavailable,
}

/// Breed directory failures keep their own slot; they never block search.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("breed directory fetch failed: {0}")]
pub struct BreedsFetchFailed(pub String);

/// Login failures carry the server-provided message when one parses,
/// otherwise a generic `Login failed (<status>)`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct LoginFailed {
    pub message: String,
}
