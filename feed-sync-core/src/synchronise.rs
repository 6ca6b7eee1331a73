//! High-level pipeline: existing items → feed → create the new ones.
//!
//! This module provides the orchestration for one synchronisation run:
//!   - Lists the collection's current items and collects their slugs
//!   - Reads the feed through a [`FeedSource`]
//!   - Plans every entry (slug, image, timestamp) and creates the unseen ones
//!     through a [`CmsClient`], pausing after every create call
//!   - Returns a [`SynchroniseReport`] with one line per feed entry
//!
//! # Error Handling
//! Failing to list existing items or to read the feed aborts the run before any
//! write ([`SyncError`]). A failed create is logged and recorded in the report;
//! the run carries on with the next entry and a later run will try it again.
//!
//! # Navigation
//! - Main entrypoint: [`synchronise`]
//! - Per-entry policy: [`plan_entry`]

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use tracing::{debug, error, info, warn};

use crate::contract::{CmsClient, Enclosure, FeedEntry, FeedSource, ImageRef, ItemFields};
use crate::error::SyncError;
use crate::slug::guid_to_slug;

/// The only enclosure type we publish.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

/// `YYYY-MM-DDTHH:MM:SS±HHMM`, the timestamp grammar the CMS accepts.
const CMS_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Pause after each create call.
    pub delay: Duration,
    /// Plan and log only; no create calls, no pauses.
    pub dry_run: bool,
}

#[derive(Debug, Default)]
pub struct SynchroniseReport {
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Clone)]
pub struct EntryReport {
    pub guid: String,
    pub link: String,
    pub slug: String,
    pub outcome: EntryOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntryOutcome {
    Created { item_id: String },
    WouldCreate,
    AlreadyPublished,
    NoImage,
    NoTimestamp,
    Failed { error: String },
}

impl SynchroniseReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Created { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, EntryOutcome::Failed { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| {
            matches!(
                o,
                EntryOutcome::AlreadyPublished | EntryOutcome::NoImage | EntryOutcome::NoTimestamp
            )
        })
    }

    fn count(&self, pred: impl Fn(&EntryOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

/// What to do with a single feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Skip(EntryOutcome),
    Create(ItemFields),
}

/// Last `image/jpeg` enclosure wins.
pub fn select_image(enclosures: &[Enclosure]) -> Option<&str> {
    enclosures
        .iter()
        .rev()
        .find(|e| e.mime_type == IMAGE_MIME_TYPE)
        .map(|e| e.url.as_str())
}

pub fn format_timestamp(ts: &DateTime<FixedOffset>) -> String {
    ts.format(CMS_TIME_FORMAT).to_string()
}

/// Applies the publishing policy to one entry: image first, then
/// deduplication, then the timestamp.
pub fn plan_entry(entry: &FeedEntry, slug: &str, existing: &HashSet<String>) -> Plan {
    let Some(image) = select_image(&entry.enclosures) else {
        return Plan::Skip(EntryOutcome::NoImage);
    };
    if existing.contains(slug) {
        return Plan::Skip(EntryOutcome::AlreadyPublished);
    }
    let Some(published) = entry.published.as_ref() else {
        return Plan::Skip(EntryOutcome::NoTimestamp);
    };

    Plan::Create(ItemFields {
        link: entry.link.clone(),
        name: entry.title.clone(),
        slug: slug.to_string(),
        description: entry.description.clone(),
        preview_image_url: image.to_string(),
        preview_image: ImageRef {
            url: image.to_string(),
        },
        time: format_timestamp(published),
        archived: false,
        draft: false,
    })
}

/// Lists the collection and returns the set of slugs already taken.
pub async fn fetch_existing_slugs<C>(cms: &C) -> Result<HashSet<String>, SyncError>
where
    C: CmsClient + ?Sized,
{
    let items = cms.list_items().await.map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Failed to list existing collection items");
        SyncError::ExistingItems(e)
    })?;
    let slugs: HashSet<String> = items.into_iter().map(|item| item.slug).collect();
    info!(existing = slugs.len(), "[SYNC] Collected existing slugs");
    Ok(slugs)
}

pub async fn synchronise<C, F>(
    cms: &C,
    feed: &F,
    options: &SyncOptions,
) -> Result<SynchroniseReport, SyncError>
where
    C: CmsClient + ?Sized,
    F: FeedSource + ?Sized,
{
    info!(dry_run = options.dry_run, "[SYNC] Starting synchronisation");

    let existing = fetch_existing_slugs(cms).await?;

    let entries = feed.fetch_entries().await.map_err(|e| {
        error!(error = %e, "[SYNC][ERROR] Failed to read feed");
        SyncError::Feed(e)
    })?;
    info!(entries = entries.len(), "[SYNC] Feed read");

    let mut report = SynchroniseReport::default();

    for entry in &entries {
        let slug = guid_to_slug(&entry.guid);
        let outcome = match plan_entry(entry, &slug, &existing) {
            Plan::Skip(reason) => {
                match reason {
                    EntryOutcome::NoTimestamp => {
                        warn!(link = %entry.link, guid = %entry.guid, "[SYNC][SKIP] No publication timestamp")
                    }
                    _ => debug!(link = %entry.link, ?reason, "[SYNC][SKIP] Skipping entry"),
                }
                reason
            }
            Plan::Create(fields) if options.dry_run => {
                info!(link = %entry.link, title = %fields.name, slug = %slug, "[SYNC][DRY-RUN] Would create item");
                EntryOutcome::WouldCreate
            }
            Plan::Create(fields) => {
                info!(link = %entry.link, title = %fields.name, slug = %slug, "[SYNC][CREATE] Creating item");
                let outcome = match cms.create_item(fields).await {
                    Ok(created) => {
                        info!(link = %entry.link, item_id = %created.id, "[SYNC][CREATE] Item created");
                        EntryOutcome::Created {
                            item_id: created.id,
                        }
                    }
                    Err(e) => {
                        error!(link = %entry.link, slug = %slug, error = %e, "[SYNC][ERROR][CREATE] Create item failed");
                        EntryOutcome::Failed {
                            error: e.to_string(),
                        }
                    }
                };
                tokio::time::sleep(options.delay).await;
                outcome
            }
        };

        report.entries.push(EntryReport {
            guid: entry.guid.clone(),
            link: entry.link.clone(),
            slug,
            outcome,
        });
    }

    info!(
        created = report.created(),
        failed = report.failed(),
        skipped = report.skipped(),
        "[SYNC] Synchronisation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(url: &str) -> Enclosure {
        Enclosure {
            url: url.to_string(),
            mime_type: IMAGE_MIME_TYPE.to_string(),
        }
    }

    fn entry(guid: &str, enclosures: Vec<Enclosure>) -> FeedEntry {
        FeedEntry {
            guid: guid.to_string(),
            link: format!("https://example.com/{guid}"),
            title: format!("Title {guid}"),
            description: "<p>body</p>".to_string(),
            published: Some(DateTime::parse_from_rfc3339("2023-05-01T08:30:00+00:00").unwrap()),
            enclosures,
        }
    }

    #[test]
    fn select_image_takes_last_jpeg() {
        let enclosures = vec![
            jpeg("https://example.com/1.jpg"),
            Enclosure {
                url: "https://example.com/2.png".into(),
                mime_type: "image/png".into(),
            },
            jpeg("https://example.com/3.jpg"),
            Enclosure {
                url: "https://example.com/4.mp3".into(),
                mime_type: "audio/mpeg".into(),
            },
        ];
        assert_eq!(select_image(&enclosures), Some("https://example.com/3.jpg"));
    }

    #[test]
    fn select_image_ignores_other_image_types() {
        let enclosures = vec![
            Enclosure {
                url: "https://example.com/a.png".into(),
                mime_type: "image/png".into(),
            },
            Enclosure {
                url: "https://example.com/a.webp".into(),
                mime_type: "image/webp".into(),
            },
        ];
        assert_eq!(select_image(&enclosures), None);
    }

    #[test]
    fn select_image_requires_exact_type() {
        let enclosures = vec![
            Enclosure {
                url: "https://example.com/a.jpg".into(),
                mime_type: "image/jpeg; charset=binary".into(),
            },
            Enclosure {
                url: "https://example.com/b.jpg".into(),
                mime_type: "IMAGE/JPEG".into(),
            },
        ];
        assert_eq!(select_image(&enclosures), None);
    }

    #[test]
    fn timestamp_is_reemitted_in_cms_format() {
        let utc = DateTime::parse_from_rfc3339("2023-05-01T08:30:00+00:00").unwrap();
        assert_eq!(format_timestamp(&utc), "2023-05-01T08:30:00+0000");

        let offset = DateTime::parse_from_rfc3339("2023-12-31T23:59:59-07:00").unwrap();
        assert_eq!(format_timestamp(&offset), "2023-12-31T23:59:59-0700");
    }

    #[test]
    fn plan_skips_entry_without_jpeg_even_when_new() {
        let e = entry("def", vec![]);
        let slug = guid_to_slug(&e.guid);
        assert_eq!(
            plan_entry(&e, &slug, &HashSet::new()),
            Plan::Skip(EntryOutcome::NoImage)
        );
    }

    #[test]
    fn plan_skips_known_slug() {
        let e = entry("abc", vec![jpeg("https://example.com/abc.jpg")]);
        let slug = guid_to_slug(&e.guid);
        let existing = HashSet::from([slug.clone()]);
        assert_eq!(
            plan_entry(&e, &slug, &existing),
            Plan::Skip(EntryOutcome::AlreadyPublished)
        );
    }

    #[test]
    fn plan_skips_entry_without_timestamp() {
        let mut e = entry("abc", vec![jpeg("https://example.com/abc.jpg")]);
        e.published = None;
        let slug = guid_to_slug(&e.guid);
        assert_eq!(
            plan_entry(&e, &slug, &HashSet::new()),
            Plan::Skip(EntryOutcome::NoTimestamp)
        );
    }

    #[test]
    fn plan_builds_all_fields_for_new_entry() {
        let e = entry("abc", vec![jpeg("https://example.com/abc.jpg")]);
        let slug = guid_to_slug(&e.guid);
        let Plan::Create(fields) = plan_entry(&e, &slug, &HashSet::new()) else {
            panic!("expected a create plan");
        };
        assert_eq!(fields.slug, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert_eq!(fields.link, "https://example.com/abc");
        assert_eq!(fields.name, "Title abc");
        assert_eq!(fields.description, "<p>body</p>");
        assert_eq!(fields.preview_image_url, "https://example.com/abc.jpg");
        assert_eq!(fields.preview_image.url, "https://example.com/abc.jpg");
        assert_eq!(fields.time, "2023-05-01T08:30:00+0000");
        assert!(!fields.archived);
        assert!(!fields.draft);
    }

    #[test]
    fn report_counts_by_outcome() {
        let line = |outcome| EntryReport {
            guid: String::new(),
            link: String::new(),
            slug: String::new(),
            outcome,
        };
        let report = SynchroniseReport {
            entries: vec![
                line(EntryOutcome::Created { item_id: "1".into() }),
                line(EntryOutcome::Failed { error: "boom".into() }),
                line(EntryOutcome::NoImage),
                line(EntryOutcome::AlreadyPublished),
                line(EntryOutcome::WouldCreate),
            ],
        };
        assert_eq!(report.created(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 2);
    }
}
