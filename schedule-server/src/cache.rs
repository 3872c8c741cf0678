use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task;
use tokio::time::{sleep, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedFormat {
    Xml,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    pub organizer: String,
    pub event: String,
    pub format: FeedFormat,
}

pub struct Config {
    pub enabled: bool,
    pub ttl: Duration,
}

/// TTL cache for rendered feed bodies. Entries expire via a spawned
/// sleep task; the language form additionally invalidates an event's
/// renders on save so stale tags never outlive the TTL they were
/// written under.
pub struct RenderCache {
    enabled: bool,
    ttl: Duration,
    inner: RwLock<HashMap<RenderKey, Arc<String>>>,
}

impl RenderCache {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            enabled: config.enabled,
            ttl: config.ttl,
            inner: Default::default(),
        })
    }

    pub async fn insert(self: Arc<Self>, key: RenderKey, body: String) -> Arc<String> {
        let arcd = Arc::new(body);
        if !self.enabled {
            return arcd;
        }

        self.inner
            .write()
            .await
            .insert(key.clone(), Arc::clone(&arcd));

        let self_clone = Arc::clone(&self);
        task::spawn(async move {
            sleep(self_clone.ttl).await;
            self_clone.inner.write().await.remove(&key);
        });

        arcd
    }

    pub async fn get(&self, key: &RenderKey) -> Option<Arc<String>> {
        if !self.enabled {
            return None;
        }

        self.inner.read().await.get(key).map(Arc::clone)
    }

    /// Drops every cached render of one event, both formats.
    pub async fn invalidate_event(&self, organizer: &str, event: &str) {
        if !self.enabled {
            return;
        }

        self.inner
            .write()
            .await
            .retain(|key, _| key.organizer != organizer || key.event != event);
    }
}
