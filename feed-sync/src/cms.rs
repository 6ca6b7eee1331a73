#![doc = "Webflow v1 CMS client: the reqwest-backed `CmsClient` used by the CLI."]
//
//! # CMS Integration (CLI <-> Core)
//!
//! Wires the [`CmsClient`] trait from `feed-sync-core` to the Webflow v1
//! collection-items API.
//!
//! - `GET  <base>/collections/<id>/items` lists the collection.
//! - `POST <base>/collections/<id>/items?live=true` creates and publishes an item.
//!
//! Both send `Accept-Version: 1.0.0` and a bearer token. Anything but a 200 is
//! returned as [`CmsError::Status`] carrying the raw body; a 200 whose body does
//! not match the expected shape is [`CmsError::Malformed`].

use async_trait::async_trait;
use feed_sync_core::config::CmsConfig;
use feed_sync_core::contract::{CmsClient, CreatedItem, ItemFields, PublishedItem};
use feed_sync_core::error::CmsError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const ACCEPT_VERSION: &str = "1.0.0";

#[derive(Deserialize)]
struct ListItemsResponse {
    items: Vec<PublishedItem>,
}

#[derive(Serialize)]
struct CreateItemRequest<'a> {
    fields: &'a ItemFields,
}

pub struct WebflowClient {
    http: reqwest::Client,
    items_url: String,
    api_key: String,
}

impl WebflowClient {
    pub fn new(http: reqwest::Client, config: &CmsConfig) -> Self {
        tracing::info!(
            items_url = %config.items_url(),
            api_key_set = !config.api_key.is_empty(),
            "Initialized WebflowClient"
        );
        WebflowClient {
            http,
            items_url: config.items_url(),
            api_key: config.api_key.clone(),
        }
    }

    fn authorised(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Accept-Version", ACCEPT_VERSION)
            .bearer_auth(&self.api_key)
    }
}

/// Turns a response into `T`, or into the error the contract promises.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CmsError> {
    let status = response.status();
    let body = response.text().await?;
    if status != StatusCode::OK {
        return Err(CmsError::Status {
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(|e| CmsError::Malformed(e.to_string()))
}

#[async_trait]
impl CmsClient for WebflowClient {
    async fn list_items(&self) -> Result<Vec<PublishedItem>, CmsError> {
        tracing::info!(url = %self.items_url, "Listing collection items");
        let response = self
            .authorised(self.http.get(&self.items_url))
            .send()
            .await?;

        match decode::<ListItemsResponse>(response).await {
            Ok(list) => {
                tracing::info!(count = list.items.len(), "Fetched collection items");
                Ok(list.items)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to list collection items");
                Err(e)
            }
        }
    }

    async fn create_item(&self, fields: ItemFields) -> Result<CreatedItem, CmsError> {
        tracing::info!(slug = %fields.slug, link = %fields.link, "Creating collection item");
        let response = self
            .authorised(self.http.post(&self.items_url))
            .query(&[("live", "true")])
            .json(&CreateItemRequest { fields: &fields })
            .send()
            .await?;

        let created = decode::<CreatedItem>(response).await?;
        tracing::info!(item_id = %created.id, slug = %fields.slug, "Successfully created collection item");
        Ok(created)
    }
}
