//! Pages that render every day of the week as numbered view blocks, one per day and meal, with
//! station headings (`h3`) between the item containers (`.menu-items`).
use chrono::{Duration, NaiveDate};
use scraper::{ElementRef, Html};

use super::{menu_item::items_in, text::element_text};
use crate::{
    menu::{MealPeriod, MenuEntry, SourceId},
    static_selector,
};

static_selector!(CONTAINER_SELECTOR <- "#block-weeklymenubystations");

const BLOCK_ID_PREFIX: &str = "block-views-block-weekly-menu-by-stations-block-";

pub fn is_present(doc: &Html) -> bool {
    CONTAINER_SELECTOR.first(doc.root_element()).is_some()
}

/// Id of the block holding `meal` on day `day_index` (Monday = 0).
pub fn block_id(day_index: u32, meal: MealPeriod) -> String {
    let offset = match meal {
        MealPeriod::Lunch => 2,
        MealPeriod::Dinner => 10,
    };
    format!("{BLOCK_ID_PREFIX}{}", day_index + offset)
}

pub fn extract(doc: &Html, source: &SourceId, week_of: NaiveDate) -> Vec<MenuEntry> {
    let Some(container) = CONTAINER_SELECTOR.first(doc.root_element()) else {
        return Vec::new();
    };
    (0..7u32)
        .flat_map(|day_index| MealPeriod::ALL.map(|meal| (day_index, meal)))
        .flat_map(|(day_index, meal)| {
            let date = week_of + Duration::days(day_index.into());
            extract_block(container, &block_id(day_index, meal), source, date, meal)
        })
        .collect()
}

/// Fold state: the heading most recently seen, and the entries so far.
#[derive(Default)]
struct StationScan {
    category: Option<String>,
    entries: Vec<MenuEntry>,
}

fn extract_block(
    container: ElementRef<'_>,
    id: &str,
    source: &SourceId,
    date: NaiveDate,
    meal: MealPeriod,
) -> Vec<MenuEntry> {
    static_selector!(SECTION_SELECTOR <- "h3, .menu-items");

    let Some(block) = container
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id() == Some(id))
    else {
        log::debug!("{source}: no {meal} block #{id} for {date}");
        return Vec::new();
    };

    block
        .select(&SECTION_SELECTOR)
        .fold(StationScan::default(), |mut scan, section| {
            if section.value().name() == "h3" {
                let heading = element_text(section);
                scan.category = (!heading.is_empty()).then_some(heading);
            } else {
                let category = &scan.category;
                scan.entries.extend(
                    items_in(section).map(|item| item.into_entry(source, date, meal, category.clone())),
                );
            }
            scan
        })
        .entries
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::menu::group_by_category;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 8).unwrap()
    }

    fn load(name: &str) -> Html {
        let html = fs::read_to_string(format!("./src/parse/html_examples/{name}")).unwrap();
        Html::parse_document(&html)
    }

    #[test]
    fn test_block_id() {
        assert_eq!(
            block_id(0, MealPeriod::Lunch),
            "block-views-block-weekly-menu-by-stations-block-2"
        );
        assert_eq!(
            block_id(6, MealPeriod::Dinner),
            "block-views-block-weekly-menu-by-stations-block-16"
        );
    }

    #[test]
    fn test_daily_stations() {
        let doc = load("daily_stations.html");
        assert!(is_present(&doc));
        let entries = extract(&doc, &SourceId::new("Seibel Servery"), monday());

        let monday_lunch: Vec<_> = entries
            .iter()
            .filter(|e| e.date() == monday() && e.meal_period() == MealPeriod::Lunch)
            .map(|e| (e.category_label(), e.name()))
            .collect();
        assert_eq!(
            monday_lunch,
            vec![
                ("Uncategorized", "Garlic Bread"),
                ("Soups", "Tomato Basil Soup"),
                ("Soups", "Vegan Chili"),
                ("Entrees", "Grilled Salmon"),
            ]
        );

        let wednesday = monday() + Duration::days(2);
        let wednesday_dinner: Vec<_> = entries
            .iter()
            .filter(|e| e.date() == wednesday && e.meal_period() == MealPeriod::Dinner)
            .map(|e| (e.category(), e.name()))
            .collect();
        assert_eq!(
            wednesday_dinner,
            vec![(Some("Grill"), "Cheeseburger"), (Some("Grill"), "Veggie Burger")]
        );
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn test_groups_by_category() {
        let doc = load("daily_stations.html");
        let entries = extract(&doc, &SourceId::new("Seibel Servery"), monday());
        let lunch = entries
            .iter()
            .filter(|e| e.date() == monday() && e.meal_period() == MealPeriod::Lunch);
        let groups = group_by_category(lunch);
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec!["Entrees", "Soups", "Uncategorized"]);
        assert_eq!(groups["Soups"].len(), 2);
    }

    #[test]
    fn test_missing_container() {
        let doc = Html::parse_document(r#"<div id="block-views-block-weekly-menu-by-stations-block-2"></div>"#);
        assert!(!is_present(&doc));
        assert!(extract(&doc, &SourceId::new("A"), monday()).is_empty());
    }
}
