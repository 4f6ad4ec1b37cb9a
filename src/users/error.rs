//! Error taxonomy for the user directory.

use thiserror::Error;

/// Failure talking to the remote user source.
///
/// Carries rendered messages rather than the transport error itself so it can
/// be cloned to every caller waiting on a shared fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
  /// Connection, TLS or timeout failure.
  #[error("request failed: {0}")]
  Transport(String),

  /// The server answered with a non-success status.
  #[error("{url} returned HTTP {status}")]
  Status { status: u16, url: String },

  /// The response body was not the expected JSON.
  #[error("invalid response body: {0}")]
  Decode(String),
}

/// Loading the user collection failed. The cache stays uninitialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  #[error("failed to load users: {0}")]
  Source(#[from] SourceError),

  /// The fetch task was aborted before it finished.
  #[error("loading users was cancelled")]
  Cancelled,
}

/// The remote source rejected or failed a confirmed update. The cached record
/// is left as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to update user {id}: {source}")]
pub struct UpdateError {
  pub id: u64,
  #[source]
  pub source: SourceError,
}
