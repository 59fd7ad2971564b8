//! Per-element reads and writes
//!
//! Writers apply to every node of the collection and return the collection
//! for chaining; non-element nodes are skipped. Readers look at the first
//! node only.

use super::fragment_nodes;
use super::Collection;
use crate::dom::style::hyphen_to_camel;
use crate::dom::NodeId;
use serde_json::Value;
use std::fmt;

/// Value written by `set_attr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    /// Remove the attribute instead of writing it
    Remove,
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

/// `false` removes the attribute, `true` writes `"true"`
impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        if b {
            AttrValue::Text("true".to_string())
        } else {
            AttrValue::Remove
        }
    }
}

macro_rules! attr_value_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for AttrValue {
                fn from(n: $t) -> Self {
                    AttrValue::Text(n.to_string())
                }
            }
        )*
    };
}

attr_value_from_number!(i32, i64, u32, u64, usize, f64);

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(AttrValue::Remove, Into::into)
    }
}

/// Inline style value as read back by `css`
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Number(f64),
    Text(String),
}

impl StyleValue {
    /// Coerce a declared value: fully numeric text becomes a number
    pub fn coerce(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => StyleValue::Number(n),
            _ => StyleValue::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StyleValue::Number(n) => Some(*n),
            StyleValue::Text(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{n}"),
            StyleValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Text(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Text(s)
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(n.into())
    }
}

/// Content accepted by `append`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Markup, parsed once per target
    Html(String),
    Node(NodeId),
    Nodes(Vec<NodeId>),
    Empty,
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Content::Empty
        } else {
            Content::Html(s.to_string())
        }
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::from(s.as_str())
    }
}

impl From<NodeId> for Content {
    fn from(id: NodeId) -> Self {
        Content::Node(id)
    }
}

impl From<&Collection> for Content {
    fn from(collection: &Collection) -> Self {
        Content::Nodes(collection.nodes().to_vec())
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map_or(Content::Empty, Into::into)
    }
}

impl Collection {
    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    /// Add each whitespace-separated class to every element
    pub fn add_class(&self, names: &str) -> &Self {
        for node in self {
            for name in names.split_ascii_whitespace() {
                self.document().add_class(node, name);
            }
        }
        self
    }

    pub fn remove_class(&self, names: &str) -> &Self {
        for node in self {
            for name in names.split_ascii_whitespace() {
                self.document().remove_class(node, name);
            }
        }
        self
    }

    pub fn toggle_class(&self, names: &str) -> &Self {
        for node in self {
            for name in names.split_ascii_whitespace() {
                self.document().toggle_class(node, name);
            }
        }
        self
    }

    /// Whether any element carries the class
    pub fn has_class(&self, name: &str) -> bool {
        self.iter().any(|node| self.document().has_class(node, name))
    }

    // ------------------------------------------------------------------
    // Attributes and properties
    // ------------------------------------------------------------------

    pub fn attr(&self, key: &str) -> Option<String> {
        self.el().and_then(|node| self.document().attribute(node, key))
    }

    /// Write an attribute on every element; `false` removes it
    pub fn set_attr(&self, key: &str, value: impl Into<AttrValue>) -> &Self {
        let value = value.into();
        for node in self {
            match &value {
                AttrValue::Text(text) => self.document().set_attribute(node, key, text),
                AttrValue::Remove => self.document().remove_attribute(node, key),
            }
        }
        self
    }

    pub fn set_attrs<I, K, V>(&self, attrs: I) -> &Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<AttrValue>,
    {
        for (key, value) in attrs {
            self.set_attr(key.as_ref(), value);
        }
        self
    }

    pub fn remove_attr(&self, key: &str) -> &Self {
        for node in self {
            self.document().remove_attribute(node, key);
        }
        self
    }

    /// Live property of the first element
    pub fn prop(&self, key: &str) -> Option<Value> {
        self.el().and_then(|node| self.document().property(node, key))
    }

    pub fn set_prop(&self, key: &str, value: impl Into<Value>) -> &Self {
        let value = value.into();
        for node in self {
            self.document().set_property(node, key, value.clone());
        }
        self
    }

    // ------------------------------------------------------------------
    // Style
    // ------------------------------------------------------------------

    /// Inline style of the first element; accepts `background-color` or
    /// `backgroundColor`
    pub fn css(&self, key: &str) -> Option<StyleValue> {
        let node = self.el()?;
        self.document()
            .style_property(node, &hyphen_to_camel(key))
            .map(|raw| StyleValue::coerce(&raw))
    }

    /// Set an inline style on every element; an empty value removes it
    pub fn set_css(&self, key: &str, value: impl Into<StyleValue>) -> &Self {
        let key = hyphen_to_camel(key);
        let value = value.into().to_string();
        for node in self {
            self.document().set_style_property(node, &key, &value);
        }
        self
    }

    // ------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------

    pub fn html(&self) -> Option<String> {
        self.el().and_then(|node| self.document().inner_html(node))
    }

    /// Replace the children of every element with parsed markup
    pub fn set_html(&self, markup: &str) -> &Self {
        for node in self {
            self.document().set_inner_html(node, markup);
        }
        self
    }

    pub fn val(&self) -> Option<String> {
        self.el().and_then(|node| self.document().value(node))
    }

    pub fn set_val(&self, value: &str) -> &Self {
        for node in self {
            self.document().set_value(node, value);
        }
        self
    }

    pub fn text(&self) -> Option<String> {
        self.el().and_then(|node| self.document().text_content(node))
    }

    pub fn set_text(&self, text: &str) -> &Self {
        for node in self {
            self.document().set_text_content(node, text);
        }
        self
    }

    /// Append content as the last child of every element
    ///
    /// Markup is parsed separately for each target. Existing nodes are moved
    /// into the last target; earlier targets receive deep clones.
    pub fn append(&self, content: impl Into<Content>) -> &Self {
        let doc = self.document();
        let targets: Vec<NodeId> = self.iter().filter(|&node| doc.is_element(node)).collect();

        match content.into() {
            Content::Empty => {}
            Content::Html(markup) => {
                for &target in &targets {
                    for node in fragment_nodes(doc, &markup) {
                        doc.append_child(target, node);
                    }
                }
            }
            Content::Node(node) => self.append_nodes(&targets, &[node]),
            Content::Nodes(nodes) => self.append_nodes(&targets, &nodes),
        }
        self
    }

    fn append_nodes(&self, targets: &[NodeId], nodes: &[NodeId]) {
        let doc = self.document();
        let Some((&last, earlier)) = targets.split_last() else {
            return;
        };
        for &target in earlier {
            for &node in nodes {
                if let Some(copy) = doc.clone_node(node, true) {
                    doc.append_child(target, copy);
                }
            }
        }
        for &node in nodes {
            doc.append_child(last, node);
        }
    }

    /// Replace every element (outer markup included) with parsed markup
    pub fn replace_with(&self, markup: &str) -> &Self {
        for node in self {
            self.document().set_outer_html(node, markup);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::query::query;
    use serde_json::json;

    fn page() -> Document {
        Document::parse(
            r#"<div class="item" id="one" data-k="v" style="width: 10px">A</div><div class="item" id="two">B</div>text"#,
        )
    }

    #[test]
    fn test_class_tokens() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        items.add_class("a b").remove_class("a");
        assert_eq!(items.attr("class").as_deref(), Some("item b"));
        items.remove_class("a");
        assert_eq!(doc.class_list(items.get(1).unwrap()), vec!["item", "b"]);
        items.add_class("  ");
        assert!(items.has_class("b"));
    }

    #[test]
    fn test_attr_values() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        assert_eq!(items.attr("data-k").as_deref(), Some("v"));
        items.set_attr("data-k", false);
        assert_eq!(items.attr("data-k"), None);
        items.set_attr("aria-hidden", true).set_attr("tabindex", 3);
        assert_eq!(items.attr("aria-hidden").as_deref(), Some("true"));
        assert_eq!(items.attr("tabindex").as_deref(), Some("3"));
        items.set_attrs([("title", "t"), ("lang", "en")]);
        assert_eq!(doc.attribute(items.get(1).unwrap(), "lang").as_deref(), Some("en"));
        items.remove_attr("title");
        assert_eq!(items.attr("title"), None);
    }

    #[test]
    fn test_css_coercion() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        assert_eq!(items.css("width"), Some(StyleValue::Text("10px".to_string())));
        items.set_css("background-color", "10");
        assert_eq!(items.css("background-color"), Some(StyleValue::Number(10.0)));
        assert_eq!(items.css("backgroundColor"), Some(StyleValue::Number(10.0)));
        items.set_css("z-index", 2);
        assert_eq!(items.css("z-index").and_then(|v| v.as_number()), Some(2.0));
        items.set_css("width", "");
        assert_eq!(items.css("width"), None);
        assert_eq!(
            doc.attribute(items.get(1).unwrap(), "style").as_deref(),
            Some("background-color: 10; z-index: 2;")
        );
    }

    #[test]
    fn test_css_property_names() {
        let doc = page();
        let item = query(&doc, "#one").unwrap();
        item.set_css("-webkit-transition", "opacity 1s");
        assert_eq!(
            item.css("-webkit-transition"),
            Some(StyleValue::Text("opacity 1s".to_string()))
        );
        assert_eq!(
            item.css("WebkitTransition"),
            Some(StyleValue::Text("opacity 1s".to_string()))
        );

        let before = item.attr("style");
        item.set_css("Font-Size", "12");
        assert_eq!(item.attr("style"), before);
        assert_eq!(item.css("font-size"), None);
        assert_eq!(item.css("Font-Size"), None);
    }

    #[test]
    fn test_props_and_values() {
        let doc = Document::parse(r#"<input class="f" value="a"><input class="f">"#);
        let inputs = query(&doc, ".f").unwrap();
        assert_eq!(inputs.val().as_deref(), Some("a"));
        inputs.set_val("b");
        assert_eq!(inputs.prop("value"), Some(json!("b")));
        assert_eq!(inputs.attr("value").as_deref(), Some("a"));
        inputs.set_prop("disabled", true);
        assert_eq!(doc.attribute(inputs.get(1).unwrap(), "disabled").as_deref(), Some(""));
        assert_eq!(inputs.prop("tagName"), Some(json!("INPUT")));
    }

    #[test]
    fn test_html_and_text() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        items.set_html("<b>x</b>");
        assert_eq!(doc.inner_html(items.get(1).unwrap()).as_deref(), Some("<b>x</b>"));
        items.set_text("<i>");
        assert_eq!(items.html().as_deref(), Some("&lt;i&gt;"));
        assert_eq!(items.text().as_deref(), Some("<i>"));
    }

    #[test]
    fn test_append_markup_per_target() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        items.append("<span>x</span>");
        for node in &items {
            let last = doc.last_child(node).unwrap();
            assert_eq!(doc.tag_name(last).as_deref(), Some("span"));
        }
        assert_ne!(doc.last_child(items.get(0).unwrap()), doc.last_child(items.get(1).unwrap()));
        items.append("");
        assert_eq!(query(&doc, "span").unwrap().len(), 2);
    }

    #[test]
    fn test_append_node_moves_into_last_target() {
        let doc = page();
        let items = query(&doc, ".item").unwrap();
        let em = doc.create_element("em").unwrap();
        items.append(em);
        assert_eq!(doc.parent(em), items.get(1));
        assert_eq!(query(&doc, "em").unwrap().len(), 2);
    }

    #[test]
    fn test_replace_with() {
        let doc = page();
        query(&doc, "#two").unwrap().replace_with("<p>new</p>");
        assert!(query(&doc, "#two").unwrap().is_empty());
        assert_eq!(query(&doc, "p").unwrap().text().as_deref(), Some("new"));
    }

    #[test]
    fn test_empty_collection_is_inert() {
        let doc = page();
        let none = query(&doc, ".missing").unwrap();
        none.add_class("x").set_attr("a", "b").set_css("color", "red").append("<i></i>");
        assert_eq!(none.attr("a"), None);
        assert_eq!(none.css("color"), None);
        assert_eq!(none.html(), None);
        assert_eq!(query(&doc, "i").unwrap().len(), 0);
    }
}
