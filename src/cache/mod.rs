mod multithreaded;

use chrono::{DateTime, Duration, Local, Utc};
use reqwest::Client;

use crate::{
    config::Config,
    menu::WeeklyMenu,
    parse::week_anchor,
    scrape_menus::{scrape_week, ScrapeReport},
};

pub use multithreaded::Multithreaded;

/// One complete scrape, replaced whole on refresh.
#[derive(Debug, Clone)]
pub struct MenuCache {
    cached_at: DateTime<Utc>,
    refresh_interval: Duration,
    menu: WeeklyMenu,
    report: ScrapeReport,
}

impl MenuCache {
    /// Placeholder served until the first scrape lands.
    pub fn empty(refresh_interval: Duration) -> Self {
        Self {
            cached_at: DateTime::<Utc>::UNIX_EPOCH,
            refresh_interval,
            menu: WeeklyMenu::empty(week_anchor(Local::now().date_naive())),
            report: ScrapeReport::default(),
        }
    }

    /// Scrapes the current week from every configured source.
    pub async fn load(client: &Client, config: &Config) -> Self {
        let week_of = week_anchor(Local::now().date_naive());
        let (menu, report) =
            scrape_week(client, &config.sources, week_of, config.scrape_timeout).await;
        Self {
            cached_at: Utc::now(),
            refresh_interval: Duration::from_std(config.refresh_interval)
                .unwrap_or_else(|_| Duration::minutes(15)),
            menu,
            report,
        }
    }

    #[inline]
    #[must_use]
    pub fn time_since_refresh(&self) -> Duration {
        Utc::now().signed_duration_since(self.cached_at)
    }

    #[inline]
    #[must_use]
    pub fn time_until_refresh(&self) -> Duration {
        self.refresh_interval - self.time_since_refresh()
    }

    #[inline]
    #[must_use]
    pub const fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    #[inline]
    #[must_use]
    pub const fn menu(&self) -> &WeeklyMenu {
        &self.menu
    }

    #[inline]
    #[must_use]
    pub const fn report(&self) -> &ScrapeReport {
        &self.report
    }
}
