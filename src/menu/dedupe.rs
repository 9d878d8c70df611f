use std::collections::HashSet;

use chrono::NaiveDate;

use super::{MealPeriod, MenuEntry, SourceId};

type SeenKey = (SourceId, NaiveDate, MealPeriod, String);

/// Drops every entry whose name was already served by the same source for the same date and meal.
/// The first occurrence wins and the relative order of the survivors is preserved.
pub fn dedupe(entries: Vec<MenuEntry>) -> Vec<MenuEntry> {
    let mut seen: HashSet<SeenKey> = HashSet::with_capacity(entries.len());
    let before = entries.len();
    let out: Vec<MenuEntry> = entries
        .into_iter()
        .filter(|entry| {
            seen.insert((
                entry.source().clone(),
                entry.date(),
                entry.meal_period(),
                entry.name().to_owned(),
            ))
        })
        .collect();
    if out.len() < before {
        log::debug!("Dropped {} duplicate menu entries", before - out.len());
    }
    out
}
