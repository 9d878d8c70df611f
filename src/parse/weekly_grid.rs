//! Pages laid out as one `.meal-section` block per day and meal.
//!
//! ```html
//! <section class="meal-section">
//!   <h2 class="meal-day">Monday</h2>
//!   <h3 class="meal-period">Lunch</h3>
//!   <a class="mitem"><div class="mname">Pasta</div><span class="tooltip" data-content="Gluten"></span></a>
//! </section>
//! ```
use chrono::NaiveDate;
use scraper::{ElementRef, Html};

use super::{
    menu_item::items_in,
    text::element_text,
    weekday::{date_in_week, parse_weekday_label},
};
use crate::{
    menu::{MealPeriod, MenuEntry, SourceId},
    static_selector,
};

static_selector!(BLOCK_SELECTOR <- ".meal-section");

pub fn is_present(doc: &Html) -> bool {
    BLOCK_SELECTOR.first(doc.root_element()).is_some()
}

/// Fold state: the date resolved by the previous block, and the entries so far.
#[derive(Default)]
struct GridScan {
    previous_date: Option<NaiveDate>,
    entries: Vec<MenuEntry>,
}

pub fn extract(doc: &Html, source: &SourceId, week_of: NaiveDate) -> Vec<MenuEntry> {
    doc.select(&BLOCK_SELECTOR)
        .fold(GridScan::default(), |scan, block| {
            scan_block(scan, block, source, week_of)
        })
        .entries
}

fn scan_block(
    mut scan: GridScan,
    block: ElementRef<'_>,
    source: &SourceId,
    week_of: NaiveDate,
) -> GridScan {
    static_selector!(DAY_SELECTOR <- ".meal-day");
    static_selector!(MEAL_SELECTOR <- ".meal-period");

    let labelled_date = DAY_SELECTOR
        .first(block)
        .map(element_text)
        .and_then(|label| parse_weekday_label(&label))
        .map(|weekday| date_in_week(week_of, weekday));
    let meal_label = MEAL_SELECTOR.first(block).map(element_text);
    let Some(meal_period) = meal_label.as_deref().and_then(MealPeriod::from_label) else {
        log::warn!("{source}: skipping block with unrecognised meal label {meal_label:?}");
        scan.previous_date = labelled_date;
        return scan;
    };

    // Dinner headers sometimes drop the day and rely on the lunch block just before them.
    // This only holds while the page keeps lunch and dinner of a day adjacent.
    let date = match (labelled_date, meal_period) {
        (Some(date), _) => Some(date),
        (None, MealPeriod::Dinner) => scan.previous_date,
        (None, MealPeriod::Lunch) => None,
    };
    match date {
        Some(date) => scan
            .entries
            .extend(items_in(block).map(|item| item.into_entry(source, date, meal_period, None))),
        None => log::warn!("{source}: skipping {meal_period} block without a weekday"),
    }
    scan.previous_date = date;
    scan
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::Duration;

    use super::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()
    }

    fn load(name: &str) -> Html {
        let html = fs::read_to_string(format!("./src/parse/html_examples/{name}")).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn test_weekly_grid() {
        let doc = load("weekly_grid.html");
        assert!(is_present(&doc));
        let source = SourceId::new("Baker Servery");
        let entries = extract(&doc, &source, monday());
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.date(), e.meal_period(), e.name()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (monday(), MealPeriod::Lunch, "Pasta Primavera"),
                (monday(), MealPeriod::Lunch, "Caesar   Salad"),
                (monday(), MealPeriod::Dinner, "Grilled Salmon"),
                (monday() + Duration::days(1), MealPeriod::Lunch, "Chicken Tikka Masala"),
                (monday() + Duration::days(1), MealPeriod::Dinner, "Beef Tacos"),
            ]
        );
        assert!(entries.iter().all(|e| e.category().is_none()));
        assert!(entries.iter().all(|e| e.source() == &source));
        assert_eq!(
            entries[0].dietary_tags().iter().collect::<Vec<_>>(),
            vec!["Gluten", "Milk", "Vegetarian"]
        );
    }

    #[test]
    fn test_dinner_without_day_uses_previous_block() {
        let doc = Html::parse_document(
            r#"<section class="meal-section">
                 <h2 class="meal-day">Thursday</h2><h3 class="meal-period">Lunch</h3>
                 <a class="mitem"><div class="mname">Soup</div></a>
               </section>
               <section class="meal-section">
                 <h3 class="meal-period">Dinner</h3>
                 <a class="mitem"><div class="mname">Stew</div></a>
               </section>"#,
        );
        let entries = extract(&doc, &SourceId::new("A"), monday());
        let thursday = monday() + Duration::days(3);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].name(), "Stew");
        assert_eq!(entries[1].date(), thursday);
        assert_eq!(entries[1].meal_period(), MealPeriod::Dinner);
    }

    #[test]
    fn test_blocks_that_cannot_be_placed_are_skipped() {
        let doc = Html::parse_document(
            r#"<section class="meal-section">
                 <h3 class="meal-period">Dinner</h3>
                 <a class="mitem"><div class="mname">Orphan Dinner</div></a>
               </section>
               <section class="meal-section">
                 <h3 class="meal-period">Lunch</h3>
                 <a class="mitem"><div class="mname">Orphan Lunch</div></a>
               </section>
               <section class="meal-section">
                 <h2 class="meal-day">Friday</h2><h3 class="meal-period">Breakfast</h3>
                 <a class="mitem"><div class="mname">Pancakes</div></a>
               </section>
               <section class="meal-section">
                 <h3 class="meal-period">Dinner</h3>
                 <a class="mitem"><div class="mname">Friday Pizza</div></a>
               </section>"#,
        );
        let entries = extract(&doc, &SourceId::new("A"), monday());
        let names: Vec<_> = entries.iter().map(MenuEntry::name).collect();
        assert_eq!(names, vec!["Friday Pizza"]);
        assert_eq!(entries[0].date(), monday() + Duration::days(4));
    }
}
