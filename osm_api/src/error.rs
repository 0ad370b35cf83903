use osm_model::osm::NodeID;
use thiserror::Error;

/// Protocol-level failures, surfaced as values all the way up to the UI
/// boundary. A match finding nothing and a stale query result are NOT errors;
/// the first is an empty result, the second is silently dropped.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, or a non-2xx response with no more specific meaning.
    #[error("request failed: {0}")]
    Transport(String),

    /// The object's version no longer matches the server's: somebody edited it
    /// concurrently. Re-fetch before retrying; there's no automatic merge.
    #[error("edit conflict: {0}")]
    Conflict(String),

    /// An edit was attempted with no changeset open.
    #[error("no changeset is open")]
    NoChangeset,

    /// A way referenced a node this session hasn't created or fetched, so the
    /// reference can't possibly resolve on the server.
    #[error("{0} hasn't been created or fetched in this session")]
    UnknownNode(NodeID),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> ApiError {
        ApiError::Transport(err.to_string())
    }
}
