use std::sync::OnceLock;

use scraper::{ElementRef, Selector};

/// A CSS selector parsed on first use and shared for the lifetime of the process.
#[derive(Debug)]
pub(super) struct StaticSelector<'a> {
    cell: OnceLock<Selector>,
    selector: &'a str,
}

impl<'a> StaticSelector<'a> {
    pub(super) const fn new(selector: &'a str) -> Self {
        Self {
            cell: OnceLock::new(),
            selector,
        }
    }

    /// First descendant of `element` matching the selector, in document order.
    pub(super) fn first<'e>(&self, element: ElementRef<'e>) -> Option<ElementRef<'e>> {
        element.select(self).next()
    }
}

impl<'a> core::ops::Deref for StaticSelector<'a> {
    type Target = Selector;

    fn deref(&self) -> &Self::Target {
        self.cell
            .get_or_init(|| match Selector::parse(self.selector) {
                Ok(sel) => sel,
                Err(e) => panic!("Error parsing static selector {}: {:?}", self.selector, e),
            })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::static_selector::StaticSelector =
            $crate::parse::static_selector::StaticSelector::new($sel);
    };
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    #[test]
    fn test_first_match_in_document_order() {
        static_selector!(ITEM <- "li.item");
        let doc = Html::parse_fragment(r#"<ul><li>x</li><li class="item">a</li><li class="item">b</li></ul>"#);
        let first = ITEM.first(doc.root_element()).expect("an item should match");
        assert_eq!(first.text().collect::<String>(), "a");
        assert_eq!(doc.select(&ITEM).count(), 2);
    }
}
