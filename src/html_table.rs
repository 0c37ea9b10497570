use anyhow::{Result, anyhow};
use once_cell::sync::OnceCell;
use scraper::{ElementRef, Html, Selector};

use crate::error::TableError;

static TABLE_SELECTOR: OnceCell<Selector> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Owned copy of an HTML subtree. Only what the table fixups and the
/// converter look at is kept: tag name, classes, children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn set_tag(&mut self, tag: &str) {
        self.tag = tag.to_string();
    }

    /// Drops every child, leaving an empty element in place.
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// All descendant elements with `tag`, in document order.
    pub fn find_all(&self, tag: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_tag(tag, &mut out);
        out
    }

    fn collect_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    out.push(el);
                }
                el.collect_tag(tag, out);
            }
        }
    }

    /// All descendant elements carrying `class`, in document order.
    pub fn select_class(&self, class: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_class(class, &mut out);
        out
    }

    fn collect_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Element>) {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.has_class(class) {
                    out.push(el);
                }
                el.collect_class(class, out);
            }
        }
    }

    pub fn find_first(&self, tag: &str) -> Option<&Element> {
        for child in &self.children {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.find_first(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_first_mut(&mut self, tag: &str) -> Option<&mut Element> {
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                if el.tag == tag {
                    return Some(el);
                }
                if let Some(found) = el.find_first_mut(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Detaches the first descendant with `tag` from its parent and returns it.
    pub fn remove_first(&mut self, tag: &str) -> Option<Element> {
        for idx in 0..self.children.len() {
            let hit = matches!(&self.children[idx], Node::Element(el) if el.tag == tag);
            if hit {
                return match self.children.remove(idx) {
                    Node::Element(el) => Some(el),
                    Node::Text(_) => None,
                };
            }
            if let Node::Element(el) = &mut self.children[idx] {
                if let Some(found) = el.remove_first(tag) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Calls `f` on every descendant element, parents before children.
    pub fn for_each_descendant_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        for child in self.children.iter_mut() {
            if let Node::Element(el) = child {
                f(el);
                el.for_each_descendant_mut(f);
            }
        }
    }

    /// Concatenated descendant text, trimmed at both ends.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out.trim().to_string()
    }

    fn push_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(text) => out.push_str(text),
                Node::Element(el) => el.push_text(out),
            }
        }
    }
}

/// Parses `html` and copies the first `<table>` (document order) into an
/// owned tree. Later tables are ignored.
pub fn first_table(html: &str) -> Result<Element> {
    let selector = table_selector()?;
    let document = Html::parse_document(html);
    let table = document
        .select(selector)
        .next()
        .ok_or(TableError::NoTable)?;
    Ok(copy_element(table))
}

fn table_selector() -> Result<&'static Selector> {
    TABLE_SELECTOR.get_or_try_init(|| {
        Selector::parse("table").map_err(|err| anyhow!("invalid table selector: {err:?}"))
    })
}

fn copy_element(source: ElementRef<'_>) -> Element {
    let value = source.value();
    let mut out = Element {
        tag: value.name().to_ascii_lowercase(),
        classes: value.classes().map(|c| c.to_string()).collect(),
        children: Vec::new(),
    };
    for child in source.children() {
        match child.value() {
            scraper::Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    out.children.push(Node::Element(copy_element(el)));
                }
            }
            scraper::Node::Text(text) => out.children.push(Node::Text(text.to_string())),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Node, first_table};
    use crate::error::TableError;

    #[test]
    fn first_table_picks_document_order() {
        let html = r#"<p>intro</p>
<table class="a"><tr><th>One</th></tr></table>
<table class="b"><tr><th>Two</th></tr></table>"#;
        let table = first_table(html).expect("table");
        assert!(table.has_class("a"));
        assert_eq!(table.find_all("th").len(), 1);
        assert_eq!(table.find_all("th")[0].text(), "One");
    }

    #[test]
    fn first_table_without_table_is_no_table() {
        let err = first_table("<html><body><p>nothing</p></body></html>").unwrap_err();
        assert_eq!(err.downcast_ref::<TableError>(), Some(&TableError::NoTable));
    }

    #[test]
    fn text_concatenates_nested_and_trims() {
        let table =
            first_table("<table><tr><td>  <b>LA</b> Galaxy </td></tr></table>").expect("table");
        assert_eq!(table.find_all("td")[0].text(), "LA Galaxy");
    }

    #[test]
    fn remove_first_detaches_in_document_order() {
        let mut table = first_table(
            "<table><tr><td>first</td></tr><tr><td>second</td></tr></table>",
        )
        .expect("table");
        let removed = table.remove_first("tr").expect("row");
        assert_eq!(removed.text(), "first");
        let rows = table.find_all("tr");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text(), "second");
    }

    #[test]
    fn clear_and_retag_mutate_in_place() {
        let mut table = first_table(
            r#"<table><tr><td>Club<span class="m">C</span></td></tr></table>"#,
        )
        .expect("table");
        table.for_each_descendant_mut(&mut |el| {
            if el.has_class("m") {
                el.clear();
            }
        });
        let row = table.find_first_mut("tr").expect("row");
        row.for_each_descendant_mut(&mut |el| {
            if el.tag == "td" {
                el.set_tag("th");
            }
        });
        assert!(table.find_all("td").is_empty());
        assert_eq!(table.find_all("th")[0].text(), "Club");
        assert!(table.select_class("m")[0].children.is_empty());
    }

    #[test]
    fn comments_are_not_text() {
        let table =
            first_table("<table><tr><td>a<!-- hidden -->b</td></tr></table>").expect("table");
        let cell = table.find_all("td")[0];
        assert!(cell.children.iter().all(|c| matches!(c, Node::Text(_))));
        assert_eq!(cell.text(), "ab");
    }
}
