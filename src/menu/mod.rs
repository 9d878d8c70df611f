mod dedupe;
mod entry;
mod filter;
mod hours;
mod view;
mod weekly_menu;

pub use dedupe::dedupe;
pub use entry::{MealPeriod, MenuEntry, SourceId, UNCATEGORIZED};
pub use hours::{has_ended, ServiceHours};
pub use weekly_menu::{group_by_category, DailyMenu, SourceOutcome, WeeklyMenu};
