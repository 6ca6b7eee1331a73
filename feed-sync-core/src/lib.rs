#![doc = "feed-sync-core: core logic library for feed-sync."]

//! This crate contains the synchronisation pipeline, data models and client
//! contracts for feed-sync. The concrete CMS HTTP client and the CLI live in the
//! `feed-sync` crate.
//!
//! # Usage
//! Build a [`config::SyncConfig`], provide a [`contract::CmsClient`] and a
//! [`contract::FeedSource`], then call [`synchronise::synchronise`].

pub mod config;
pub mod contract;
pub mod error;
pub mod feed;
pub mod slug;
pub mod synchronise;
