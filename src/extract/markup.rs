//! Small markup traversal primitives shared by extractors and link discovery

use scraper::{ElementRef, Html};

/// Collapsed text content of an element
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Finds the element whose own text node reads exactly `marker`
///
/// Whitespace around the text node is ignored. Returns the first match in
/// document order.
pub fn find_by_marker<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    document
        .root_element()
        .descendants()
        .filter(|node| {
            node.value()
                .as_text()
                .map(|text| text.trim() == marker)
                .unwrap_or(false)
        })
        .find_map(|node| node.parent().and_then(ElementRef::wrap))
}

/// True when any text node of the document reads exactly `marker`
pub fn has_marker(document: &Html, marker: &str) -> bool {
    find_by_marker(document, marker).is_some()
}

/// The element following the one labelled `marker`
///
/// Matches the common `<th>Label:</th><td>value</td>` layout.
pub fn value_after_marker<'a>(document: &'a Html, marker: &str) -> Option<ElementRef<'a>> {
    find_by_marker(document, marker)?
        .next_siblings()
        .find_map(ElementRef::wrap)
}

/// Nearest ancestor element with the given tag name
pub fn closest<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == tag)
}
