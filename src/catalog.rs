//! Catalog service: the app collection behind a read-through cache.
//!
//! One snapshot cache, process-wide, 30 second TTL. Reads short-circuit
//! on a fresh snapshot; every mutation invalidates it. When a refresh
//! read fails and an older snapshot exists, the stale snapshot is
//! served instead of an error — availability over freshness on the
//! public read path.
//!
//! The cache cell has no coordination beyond its mutex: concurrent
//! refreshes may race, but each one replaces the whole snapshot, so the
//! worst case is a redundant store read.

use crate::storage::{AppStore, StoreError};
use crate::types::{AppDraft, AppPatch, AppRecord};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Cache TTL: 30 seconds.
const CACHE_TTL: Duration = Duration::from_secs(30);

/// Direction for single-step reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

struct CacheEntry {
    apps: Vec<AppRecord>,
    fetched_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < CACHE_TTL
    }
}

/// App collection service, constructed once at startup.
pub struct Catalog {
    store: Arc<dyn AppStore>,
    cache: Mutex<Option<CacheEntry>>,
}

impl Catalog {
    pub fn new(store: Arc<dyn AppStore>) -> Self {
        Self {
            store,
            cache: Mutex::new(None),
        }
    }

    /// List all apps in display order.
    ///
    /// A fresh cached snapshot is returned without touching the store
    /// unless `force_refresh` is set. A failed refresh falls back to
    /// the previous snapshot when one exists; with no snapshot at all,
    /// the store error propagates.
    pub async fn list(&self, force_refresh: bool) -> Result<Vec<AppRecord>, StoreError> {
        if !force_refresh {
            let cache = self.cache.lock();
            if let Some(entry) = cache.as_ref() {
                if entry.is_fresh() {
                    debug!("Serving {} apps from cache", entry.apps.len());
                    return Ok(entry.apps.clone());
                }
            }
        }

        match self.store.list_ordered().await {
            Ok(apps) => {
                debug!("Fetched {} apps from store", apps.len());
                *self.cache.lock() = Some(CacheEntry {
                    apps: apps.clone(),
                    fetched_at: Instant::now(),
                });
                Ok(apps)
            }
            Err(e) => {
                let cache = self.cache.lock();
                if let Some(entry) = cache.as_ref() {
                    warn!("Store read failed, serving stale snapshot: {}", e);
                    return Ok(entry.apps.clone());
                }
                Err(e)
            }
        }
    }

    /// Fetch one record by id, straight from the store.
    pub async fn get(&self, id: &str) -> Result<Option<AppRecord>, StoreError> {
        self.store.get(id).await
    }

    /// Discard the cached snapshot unconditionally.
    pub fn invalidate(&self) {
        *self.cache.lock() = None;
        debug!("Catalog cache invalidated");
    }

    /// Add a new app at the end of the display order.
    pub async fn add(&self, draft: AppDraft) -> Result<String, StoreError> {
        let apps = self.store.list_ordered().await?;
        let next_order = apps.iter().map(|a| a.order).max().map_or(0, |m| m + 1);

        let now = Utc::now();
        let record = AppRecord {
            id: String::new(),
            name: draft.name,
            url: draft.url,
            icon_url: draft.icon_url,
            zone: draft.zone,
            color: draft.color,
            order: next_order,
            is_enabled: draft.is_enabled,
            created_at: now,
            updated_at: now,
        };

        let id = self.store.insert(record).await?;
        self.invalidate();
        info!("Added app {} at order {}", id, next_order);
        Ok(id)
    }

    /// Apply a partial update to one app.
    pub async fn update(&self, id: &str, mut patch: AppPatch) -> Result<(), StoreError> {
        patch.updated_at = Some(Utc::now());
        self.store.update_fields(id, &patch).await?;
        self.invalidate();
        info!("Updated app {}", id);
        Ok(())
    }

    /// Delete an app. Releasing its externally hosted icon is the
    /// caller's job, not the catalog's.
    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id).await?;
        self.invalidate();
        info!("Deleted app {}", id);
        Ok(())
    }

    /// Move an app one step up or down in display order by swapping its
    /// `order` value with its neighbor's, as one atomic batch. Already
    /// at the edge in the requested direction is a no-op, not an error.
    pub async fn move_app(&self, id: &str, direction: Direction) -> Result<(), StoreError> {
        let apps = self.store.list_ordered().await?;
        let current_idx = apps
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let target_idx = match direction {
            Direction::Up => current_idx.checked_sub(1),
            Direction::Down => {
                let next = current_idx + 1;
                (next < apps.len()).then_some(next)
            }
        };
        let Some(target_idx) = target_idx else {
            debug!("App {} already at the {:?} edge, nothing to move", id, direction);
            return Ok(());
        };

        let current = &apps[current_idx];
        let target = &apps[target_idx];
        let now = Utc::now();

        self.store
            .batch_update(&[
                (
                    current.id.clone(),
                    AppPatch {
                        order: Some(target.order),
                        updated_at: Some(now),
                        ..Default::default()
                    },
                ),
                (
                    target.id.clone(),
                    AppPatch {
                        order: Some(current.order),
                        updated_at: Some(now),
                        ..Default::default()
                    },
                ),
            ])
            .await?;

        self.invalidate();
        info!("Moved app {} {:?}", id, direction);
        Ok(())
    }

    /// Rewrite every `order` to its zero-based listing position,
    /// skipping records already numbered correctly. Maintenance repair
    /// for gaps left by deletes; best-effort, never fails the caller.
    pub async fn normalize_orders(&self) {
        let apps = match self.store.list_ordered().await {
            Ok(apps) => apps,
            Err(e) => {
                warn!("Order normalization skipped, store read failed: {}", e);
                return;
            }
        };

        let updates: Vec<(String, AppPatch)> = apps
            .iter()
            .enumerate()
            .filter(|(idx, app)| app.order != *idx as i64)
            .map(|(idx, app)| {
                (
                    app.id.clone(),
                    AppPatch {
                        order: Some(idx as i64),
                        ..Default::default()
                    },
                )
            })
            .collect();

        if updates.is_empty() {
            return;
        }

        match self.store.batch_update(&updates).await {
            Ok(()) => {
                self.invalidate();
                info!("Normalized order on {} apps", updates.len());
            }
            Err(e) => warn!("Order normalization failed: {}", e),
        }
    }
}
