//! Markup node capability used by the tile parser
//!
//! The parsers only need a handful of navigation primitives. They are
//! collected in [`TagNode`] and implemented for `scraper::ElementRef`.

use scraper::{ElementRef, Selector};

/// Navigation primitives over one element of a parsed document
pub trait TagNode: Sized {
    /// First descendant matching `selector`, in document order
    fn find_first(&self, selector: &Selector) -> Option<Self>;

    /// All descendants matching `selector`, in document order
    fn find_all(&self, selector: &Selector) -> Vec<Self>;

    /// Concatenated text of the element and its descendants
    fn text(&self) -> String;

    /// Value of attribute `name`, if present
    fn attribute(&self, name: &str) -> Option<String>;

    /// Nearest element after this one's start tag in document order that
    /// matches `selector`. Descendants come first, then everything that
    /// follows the element, anywhere in the document.
    fn next_matching(&self, selector: &Selector) -> Option<Self>;
}

impl<'a> TagNode for ElementRef<'a> {
    fn find_first(&self, selector: &Selector) -> Option<Self> {
        self.select(selector).next()
    }

    fn find_all(&self, selector: &Selector) -> Vec<Self> {
        self.select(selector).collect()
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn next_matching(&self, selector: &Selector) -> Option<Self> {
        following(*self).find(|element| selector.matches(element))
    }
}

/// Elements after `element`'s start tag, in document order.
fn following<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    let inside = element.descendants().skip(1);
    let after = std::iter::once(*element)
        .chain(element.ancestors())
        .flat_map(|node| node.next_siblings())
        .flat_map(|node| node.descendants());

    inside.chain(after).filter_map(ElementRef::wrap)
}
