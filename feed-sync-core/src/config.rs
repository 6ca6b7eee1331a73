use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_BASE: &str = "https://api.webflow.com";

/// Pause after every create call; keeps us under the CMS's rate limit.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(15);

/// Everything one synchronisation run needs, built once at process entry.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub feed_url: String,
    pub cms: CmsConfig,
    pub delay: Duration,
}

/// Where and how to reach the CMS collection.
#[derive(Clone)]
pub struct CmsConfig {
    pub api_base: String,
    pub api_key: String,
    pub collection_id: String,
}

impl CmsConfig {
    /// `<base>/collections/<collection-id>/items`
    pub fn items_url(&self) -> String {
        format!(
            "{}/collections/{}/items",
            self.api_base.trim_end_matches('/'),
            self.collection_id
        )
    }
}

// Keep the API key out of logs.
impl std::fmt::Debug for CmsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("collection_id", &self.collection_id)
            .finish()
    }
}

impl SyncConfig {
    /// Logs the loaded settings; the API key never appears.
    pub fn trace_loaded(&self) {
        info!(
            feed_url = %self.feed_url,
            api_base = %self.cms.api_base,
            collection_id = %self.cms.collection_id,
            delay_secs = self.delay.as_secs(),
            "Loaded SyncConfig"
        );
        debug!(?self, "SyncConfig loaded (full debug)");
    }
}
