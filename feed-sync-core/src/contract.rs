//! # contract: interfaces to the two services a sync run talks to
//!
//! This module defines the [`CmsClient`] and [`FeedSource`] traits and the
//! plain data types that flow through them.
//!
//! ## Interface & Extensibility
//! - Implement [`CmsClient`] for a concrete CMS backend (the CLI crate ships a
//!   reqwest client for the Webflow v1 API).
//! - Implement [`FeedSource`] for anything that yields feed entries; the
//!   HTTP implementation is [`crate::feed::HttpFeedSource`].
//! - All methods are async and return typed errors from [`crate::error`].
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`, so `MockCmsClient` and
//!   `MockFeedSource` exist under `cfg(test)` and the `test-export-mocks`
//!   feature.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{CmsError, FeedError};

/// An attachment on a feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
}

/// One syndication item, as read from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub guid: String,
    pub link: String,
    pub title: String,
    /// May contain markup; passed through untouched.
    pub description: String,
    pub published: Option<DateTime<FixedOffset>>,
    /// In document order.
    pub enclosures: Vec<Enclosure>,
}

/// An item already present in the CMS collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedItem {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub slug: String,
}

/// Image reference; the CMS downloads the URL and stores the image itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
}

/// Field mapping for a new collection item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFields {
    pub link: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "preview-image-url")]
    pub preview_image_url: String,
    #[serde(rename = "preview-image")]
    pub preview_image: ImageRef,
    pub time: String,
    #[serde(rename = "_archived")]
    pub archived: bool,
    #[serde(rename = "_draft")]
    pub draft: bool,
}

/// What the CMS hands back after a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedItem {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_cid", default)]
    pub collection_id: Option<String>,
}

/// Read and write access to one CMS collection.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CmsClient: Send + Sync {
    /// List every item currently in the collection.
    async fn list_items(&self) -> Result<Vec<PublishedItem>, CmsError>;

    /// Create and publish a single item.
    async fn create_item(&self, fields: ItemFields) -> Result<CreatedItem, CmsError>;
}

/// Yields the entries of one feed, in document order.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>, FeedError>;
}
