use scraper::ElementRef;

/// All text beneath `element` with the surrounding whitespace trimmed. Interior spacing is kept
/// as served. Empty when the element has no text.
pub fn element_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    fn first_div(doc: &Html) -> ElementRef<'_> {
        let selector = Selector::parse("div").unwrap();
        doc.select(&selector)
            .next()
            .expect("fragment should contain the div")
    }

    #[test]
    fn test_element_text_joins_nested_nodes() {
        let doc = Html::parse_fragment("<div>\n  Grilled <b>Chicken</b> Thighs\n</div>");
        assert_eq!(element_text(first_div(&doc)), "Grilled Chicken Thighs");
    }

    #[test]
    fn test_interior_spacing_is_kept() {
        let doc = Html::parse_fragment("<div>  Mac  and Cheese </div>");
        assert_eq!(element_text(first_div(&doc)), "Mac  and Cheese");
    }
}
