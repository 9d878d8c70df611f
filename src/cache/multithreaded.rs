use std::{
    fmt::{self, Debug, Formatter},
    ops::Deref,
    sync::Arc,
    time::Instant,
};

use chrono::Duration;
use futures_locks::{Mutex, RwLock};
use reqwest::Client;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

use super::MenuCache;
use crate::{config::Config, fetch::make_client};

/// The shared snapshot. Readers never wait on a scrape: a refresh builds the next [`MenuCache`]
/// without holding the lock and only takes the write lock to swap it in.
pub struct Multithreaded {
    client: Client,
    config: Config,
    cache: RwLock<MenuCache>,
    refreshing: Mutex<()>,
}

impl Debug for Multithreaded {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Multithreaded")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Multithreaded {
    pub fn new(config: Config) -> crate::Result<Self> {
        let client = make_client(config.fetch_timeout)?;
        let refresh_interval =
            Duration::from_std(config.refresh_interval).unwrap_or_else(|_| Duration::minutes(15));
        Ok(Self {
            client,
            config,
            cache: RwLock::new(MenuCache::empty(refresh_interval)),
            refreshing: Mutex::new(()),
        })
    }

    /// Scrapes again and replaces the snapshot. Concurrent calls share one scrape.
    pub async fn refresh(&self) {
        let started = self.get().await.cached_at();
        let _guard = self.refreshing.lock().await;
        if self.get().await.cached_at() != started {
            log::debug!("Another refresh finished while waiting, skipping.");
            return;
        }
        let next = MenuCache::load(&self.client, &self.config).await;
        if next.report().succeeded().is_empty() && !self.config.sources.is_empty() {
            log::warn!("Every source failed, the menu will be empty until the next refresh.");
        }
        *self.cache.write().await = next;
    }

    /// Scrapes once immediately, then once per `every`, until the task is aborted.
    pub fn spawn_refresh_loop(self: Arc<Self>, every: std::time::Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let start = Instant::now();
                self.refresh().await;
                log::info!("Refresh done, took {:?}", start.elapsed());
            }
        })
    }

    pub async fn get(&self) -> impl Deref<Target = MenuCache> + '_ {
        self.cache.read().await
    }
}
