//! Error types shared by the CMS client, the feed reader and the sync driver.

use thiserror::Error;

/// Errors returned by a [`crate::contract::CmsClient`].
#[derive(Debug, Error)]
pub enum CmsError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The CMS answered with something other than 200
    #[error("invalid status_code: {status} (body: {body})")]
    Status { status: u16, body: String },
    /// The response body did not match the expected schema
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors that can occur while fetching or parsing the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Response body exceeded the 10MB size limit
    #[error("response too large")]
    ResponseTooLarge,
    /// Content could not be parsed as RSS, Atom or JSON Feed
    #[error("parse error: {0}")]
    Parse(String),
}

/// Run-aborting failures. Either one means the run cannot see the collection
/// or the feed as they are, so nothing is written.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to fetch existing collection items")]
    ExistingItems(#[source] CmsError),
    #[error("failed to read feed")]
    Feed(#[source] FeedError),
}
