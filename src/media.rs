//! TTL-bounded cache for staged media references.
//!
//! The `/attach` quick command collects file ids from a replied-to message
//! before the target task is known; the callback that finishes the edit
//! only carries a short generated key. Entries expire so an abandoned
//! command cannot grow the map without bound.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;
use uuid::Uuid;

struct StagedMedia {
    refs: Vec<String>,
    staged_at: Instant,
}

/// In-memory key → file-reference-list cache with TTL expiry.
#[derive(Clone)]
pub struct MediaCache {
    inner: Arc<Mutex<HashMap<String, StagedMedia>>>,
    ttl: Duration,
}

impl MediaCache {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Stage a list of file references, returning the generated key.
    pub async fn stage(&self, refs: Vec<String>) -> String {
        let key = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock().await;
        inner.insert(
            key.clone(),
            StagedMedia {
                refs,
                staged_at: Instant::now(),
            },
        );
        key
    }

    /// Take the staged references for a key, removing the entry.
    ///
    /// Returns `None` for unknown or already-consumed keys (including
    /// entries lost to TTL expiry — the caller renders that as "expired,
    /// re-run the command").
    pub async fn take(&self, key: &str) -> Option<Vec<String>> {
        let mut inner = self.inner.lock().await;
        inner.remove(key).map(|staged| staged.refs)
    }

    /// Drop entries older than the TTL. Returns the number swept.
    pub async fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock().await;
        let before = inner.len();
        inner.retain(|_, staged| staged.staged_at.elapsed() < self.ttl);
        before - inner.len()
    }

    /// Spawn the background sweeper; runs until cancelled.
    #[must_use]
    pub fn spawn_sweeper(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let cache = self.clone();
        let period = cache.ttl.min(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        info!("media cache sweeper shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let swept = cache.sweep_expired().await;
                        if swept > 0 {
                            info!(swept, "swept stale staged media");
                        }
                    }
                }
            }
        })
    }
}
