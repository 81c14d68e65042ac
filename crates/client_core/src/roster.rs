//! Roster acquisition: one-shot remote fetch backed by a durable snapshot.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{domain::Roster, error::PickerError};
use storage::Storage;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Name of the durable slot holding the serialized roster.
pub const ROSTER_SLOT: &str = "participants";

pub const DEFAULT_ROSTER_ENDPOINT: &str =
    "https://putnam-storage.s3.eu-west-2.amazonaws.com/members.json";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("roster request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("roster endpoint answered with status {0}")]
    Status(StatusCode),
    #[error("roster payload is not a list of named participants: {0}")]
    Decode(#[source] serde_json::Error),
}

impl From<FetchError> for PickerError {
    fn from(value: FetchError) -> Self {
        PickerError::FetchFailure(value.to_string())
    }
}

#[async_trait]
pub trait RosterFetcher: Send + Sync {
    async fn fetch(&self) -> Result<Roster, FetchError>;
}

pub struct HttpRosterFetcher {
    http: Client,
    endpoint: String,
}

impl HttpRosterFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build roster http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RosterFetcher for HttpRosterFetcher {
    async fn fetch(&self) -> Result<Roster, FetchError> {
        let response = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        serde_json::from_slice::<Roster>(&body).map_err(FetchError::Decode)
    }
}

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn read_snapshot(&self, slot: &str) -> Result<Option<String>>;
    async fn write_snapshot(&self, slot: &str, payload: &str) -> Result<()>;
    async fn clear_snapshot(&self, slot: &str) -> Result<bool>;
}

#[async_trait]
impl SnapshotStore for Storage {
    async fn read_snapshot(&self, slot: &str) -> Result<Option<String>> {
        Ok(self.load_slot(slot).await?.map(|stored| stored.payload))
    }

    async fn write_snapshot(&self, slot: &str, payload: &str) -> Result<()> {
        self.save_slot(slot, payload).await
    }

    async fn clear_snapshot(&self, slot: &str) -> Result<bool> {
        self.clear_slot(slot).await
    }
}

/// Loads the roster from the durable snapshot, falling back to a remote fetch
/// on cold start. Never fails: the worst case is an empty roster.
#[derive(Clone)]
pub struct RosterCache {
    store: Arc<dyn SnapshotStore>,
    fetcher: Arc<dyn RosterFetcher>,
}

impl RosterCache {
    pub fn new(store: Arc<dyn SnapshotStore>, fetcher: Arc<dyn RosterFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub async fn load(&self) -> Roster {
        if let Some(roster) = self.cached().await {
            info!(participants = roster.len(), "roster restored from cache");
            return roster;
        }

        match self.fetch_and_store().await {
            Ok(roster) => roster,
            Err(err) => {
                error!(error = %err, "roster unavailable; continuing with an empty pool");
                Roster::new()
            }
        }
    }

    /// Re-fetches and overwrites the snapshot. On failure the existing
    /// snapshot is left untouched.
    pub async fn refresh(&self) -> Result<Roster, PickerError> {
        self.fetch_and_store().await
    }

    /// Drops the snapshot so the next `load` is a cold start.
    pub async fn invalidate(&self) -> Result<bool> {
        let removed = self.store.clear_snapshot(ROSTER_SLOT).await?;
        info!(removed, "roster snapshot invalidated");
        Ok(removed)
    }

    /// The stored snapshot, if there is a readable one.
    pub async fn cached(&self) -> Option<Roster> {
        let payload = match self.store.read_snapshot(ROSTER_SLOT).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("no cached roster snapshot");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "failed to read roster snapshot; treating cache as empty");
                return None;
            }
        };

        match serde_json::from_str::<Roster>(&payload) {
            Ok(roster) => Some(roster),
            Err(err) => {
                warn!(error = %err, "cached roster snapshot is unreadable; ignoring it");
                None
            }
        }
    }

    async fn fetch_and_store(&self) -> Result<Roster, PickerError> {
        let roster = self.fetcher.fetch().await?;
        info!(participants = roster.len(), "roster fetched from endpoint");

        match serde_json::to_string(&roster) {
            Ok(payload) => {
                if let Err(err) = self.store.write_snapshot(ROSTER_SLOT, &payload).await {
                    warn!(error = %err, "failed to cache roster snapshot");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize roster snapshot"),
        }

        Ok(roster)
    }
}

#[cfg(test)]
#[path = "tests/roster_tests.rs"]
mod tests;
