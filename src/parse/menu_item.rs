use std::collections::BTreeSet;

use chrono::NaiveDate;
use scraper::ElementRef;

use super::text::element_text;
use crate::{
    menu::{MealPeriod, MenuEntry, SourceId},
    static_selector,
};

static_selector!(ITEM_SELECTOR <- "a.mitem");

/// Name and dietary tags of one `a.mitem` node, before it is placed on a date and meal.
#[derive(Debug, PartialEq, Eq)]
pub struct MenuItem {
    name: String,
    dietary_tags: BTreeSet<String>,
}

impl MenuItem {
    /// `None` when the item has no readable name.
    pub fn from_html_element(element: ElementRef<'_>) -> Option<Self> {
        static_selector!(NAME_SELECTOR <- "div.mname");
        static_selector!(TAG_SELECTOR <- "span.tooltip");

        let name = NAME_SELECTOR.first(element).map(element_text)?;
        if name.is_empty() {
            return None;
        }
        // tags are short codes carried on the tooltip attribute, ex. data-content="Vegan"
        let dietary_tags = element
            .select(&TAG_SELECTOR)
            .filter_map(|icon| icon.value().attr("data-content"))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::to_owned)
            .collect();
        Some(Self { name, dietary_tags })
    }

    pub fn into_entry(
        self,
        source: &SourceId,
        date: NaiveDate,
        meal_period: MealPeriod,
        category: Option<String>,
    ) -> MenuEntry {
        MenuEntry::new(
            source.clone(),
            date,
            meal_period,
            self.name,
            self.dietary_tags,
            category,
        )
    }
}

/// Every named item beneath `container`, in document order.
pub fn items_in(container: ElementRef<'_>) -> impl Iterator<Item = MenuItem> + '_ {
    container
        .select(&ITEM_SELECTOR)
        .filter_map(MenuItem::from_html_element)
}
