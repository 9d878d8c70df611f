use regex::{Regex, RegexBuilder};

use super::MenuEntry;

/// Dietary/name filter applied to menu items when they are read back out.
#[derive(Debug, Default)]
pub struct ItemFilter {
    contains_any_tags: Option<Vec<String>>,
    excludes_all_tags: Option<Vec<String>>,
    name_contains: Option<Regex>,
}

impl ItemFilter {
    pub fn new(
        contains_any_tags: Option<Vec<String>>,
        excludes_all_tags: Option<Vec<String>>,
        name_contains: Option<&str>,
    ) -> Self {
        let name_contains = name_contains.map(|s| {
            RegexBuilder::new(&regex::escape(s))
                .case_insensitive(true)
                .build()
                .expect("regex using escaped input should be valid")
        });
        Self {
            contains_any_tags,
            excludes_all_tags,
            name_contains,
        }
    }

    pub fn matches(&self, entry: &MenuEntry) -> bool {
        let tags = entry.dietary_tags();
        let mut out = true;
        out &= self
            .contains_any_tags
            .as_ref()
            .map_or(true, |any| any.iter().any(|t| tags.contains(t)));
        out &= self
            .excludes_all_tags
            .as_ref()
            .map_or(true, |excluded| !excluded.iter().any(|t| tags.contains(t)));
        out &= self
            .name_contains
            .as_ref()
            .map_or(true, |pat| pat.is_match(entry.name()));
        out
    }

    pub fn apply<'e>(&self, entries: impl IntoIterator<Item = &'e MenuEntry>) -> Vec<MenuEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::menu::{MealPeriod, SourceId};

    fn entry(name: &str, tags: &[&str]) -> MenuEntry {
        MenuEntry::new(
            SourceId::new("South Servery"),
            NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
            MealPeriod::Lunch,
            name,
            tags.iter().map(|t| (*t).to_string()).collect(),
            None,
        )
    }

    #[test]
    fn test_default_matches_everything() {
        assert!(ItemFilter::default().matches(&entry("Tofu", &[])));
    }

    #[test]
    fn test_tag_filters() {
        let items = [
            entry("Cheese Pizza", &["Milk", "Gluten", "Vegetarian"]),
            entry("Tofu Stir Fry", &["Soy", "Vegan"]),
            entry("Fried Rice", &["Eggs", "Soy"]),
        ];
        let filter = ItemFilter::new(
            Some(vec!["Vegan".into(), "Vegetarian".into()]),
            Some(vec!["Milk".into()]),
            None,
        );
        let names: Vec<_> = filter
            .apply(items.iter())
            .iter()
            .map(|e| e.name().to_owned())
            .collect();
        assert_eq!(names, vec!["Tofu Stir Fry"]);
    }

    #[test]
    fn test_name_filter_is_literal_and_case_insensitive() {
        let filter = ItemFilter::new(None, None, Some("RICE"));
        assert!(filter.matches(&entry("Fried Rice", &[])));
        assert!(!filter.matches(&entry("Noodles", &[])));
        let filter = ItemFilter::new(None, None, Some("(a+"));
        assert!(filter.matches(&entry("Pasta (a+ grade)", &[])));
    }
}
