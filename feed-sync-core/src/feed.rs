//! Feed reader: fetches a feed over HTTP and maps it onto [`FeedEntry`] values.

use async_trait::async_trait;
use feed_rs::model::Entry;
use feed_rs::parser;
use tracing::{debug, error, info};

use crate::contract::{Enclosure, FeedEntry, FeedSource};
use crate::error::FeedError;

pub const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Parses RSS, Atom or JSON Feed bytes into entries, keeping document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;
    Ok(feed.entries.into_iter().map(entry_from_model).collect())
}

fn entry_from_model(entry: Entry) -> FeedEntry {
    let link = entry
        .links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| entry.links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default();

    let mut enclosures: Vec<Enclosure> = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|c| {
            let url = c.url.as_ref()?;
            Some(Enclosure {
                url: url.to_string(),
                // Declared type as-is, parameters included.
                mime_type: c
                    .content_type
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_default(),
            })
        })
        .collect();

    // Atom carries enclosures as links.
    enclosures.extend(
        entry
            .links
            .iter()
            .filter(|l| l.rel.as_deref() == Some("enclosure"))
            .map(|l| Enclosure {
                url: l.href.clone(),
                mime_type: l.media_type.clone().unwrap_or_default(),
            }),
    );

    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    FeedEntry {
        guid: entry.id,
        link,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        description,
        published: entry.published.or(entry.updated).map(|dt| dt.fixed_offset()),
        enclosures,
    }
}

/// Reads the body chunk by chunk, giving up as soon as it grows past `limit`.
async fn read_limited_bytes(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FeedError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FeedError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Reads a feed from a URL with a shared reqwest client.
pub struct HttpFeedSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFeedSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        HttpFeedSource {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self) -> Result<Vec<FeedEntry>, FeedError> {
        info!(url = %self.url, "Fetching feed");
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            error!(url = %self.url, error = ?e, "Feed request failed");
            FeedError::Network(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %self.url, status = status.as_u16(), "Feed returned non-success status");
            return Err(FeedError::HttpStatus(status.as_u16()));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_FEED_SIZE as u64)
        {
            return Err(FeedError::ResponseTooLarge);
        }

        let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await.map_err(|e| {
            error!(url = %self.url, error = %e, "Failed to read feed body");
            e
        })?;
        debug!(url = %self.url, size = bytes.len(), "Feed body received");

        let entries = parse_feed(&bytes).map_err(|e| {
            error!(url = %self.url, error = %e, "Feed could not be parsed");
            e
        })?;
        info!(url = %self.url, entries = entries.len(), "Parsed feed");
        Ok(entries)
    }
}
