mod daily_stations;
mod menu_item;
mod static_selector;
mod text;
mod weekday;
mod weekly_grid;

use chrono::NaiveDate;
use scraper::Html;

use crate::menu::{MenuEntry, SourceId};

pub use weekday::week_anchor;

/// The two page structures menus are published in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `.meal-section` blocks, each labelled with a weekday and a meal.
    WeeklyGrid,
    /// Numbered per-day blocks under `#block-weeklymenubystations`, grouped by station.
    DailyStations,
}

impl Layout {
    pub fn detect(doc: &Html) -> Option<Self> {
        if weekly_grid::is_present(doc) {
            Some(Self::WeeklyGrid)
        } else if daily_stations::is_present(doc) {
            Some(Self::DailyStations)
        } else {
            None
        }
    }
}

/// Pulls every menu entry out of one source's page, with dates resolved against `week_of`
/// (the Monday of the week being scraped).
///
/// Never fails: a page without a recognised layout, or with missing blocks, just yields fewer
/// entries. Duplicates are left in; see [`crate::menu::dedupe`].
pub fn extract(html: &str, source: &SourceId, week_of: NaiveDate) -> Vec<MenuEntry> {
    let doc = Html::parse_document(html);
    let layout = Layout::detect(&doc);
    let entries = match layout {
        Some(Layout::WeeklyGrid) => weekly_grid::extract(&doc, source, week_of),
        Some(Layout::DailyStations) => daily_stations::extract(&doc, source, week_of),
        None => {
            log::warn!("{source}: page has no recognised menu layout");
            Vec::new()
        }
    };
    log::debug!("{source}: extracted {} entries ({layout:?})", entries.len());
    entries
}
