//! Element property reflection
//!
//! Properties are the live, typed view of an element. A handful reflect
//! attributes (string or presence), `value`/`checked` have their own dirty
//! slots, a few are computed and read-only, and everything else is an
//! expando stored on the element.

use super::document::Dom;
use super::node::NodeId;
use super::serialize;
use super::DocumentAccess;
use serde_json::Value;

/// (property, attribute) pairs reflected as strings
const STRING_REFLECTED: &[(&str, &str)] = &[
    ("id", "id"),
    ("className", "class"),
    ("title", "title"),
    ("href", "href"),
    ("src", "src"),
    ("name", "name"),
    ("type", "type"),
    ("alt", "alt"),
    ("lang", "lang"),
    ("dir", "dir"),
    ("rel", "rel"),
    ("target", "target"),
    ("placeholder", "placeholder"),
    ("htmlFor", "for"),
];

/// (property, attribute) pairs reflected as attribute presence
const BOOLEAN_REFLECTED: &[(&str, &str)] = &[
    ("disabled", "disabled"),
    ("hidden", "hidden"),
    ("required", "required"),
    ("readOnly", "readonly"),
    ("selected", "selected"),
    ("multiple", "multiple"),
    ("autofocus", "autofocus"),
];

const READ_ONLY: &[&str] = &["tagName", "nodeName", "childElementCount"];

fn reflected(table: &'static [(&str, &str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(property, _)| *property == key)
        .map(|(_, attribute)| *attribute)
}

/// String conversion used when a value is written into a string slot
pub(crate) fn to_dom_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Truthiness used when a value is written into a boolean slot
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl Dom {
    /// Read a property; `None` for non-elements and unset expandos
    pub(crate) fn property(&self, id: NodeId, key: &str) -> Option<Value> {
        let element = self.element(id)?;

        if let Some(attribute) = reflected(STRING_REFLECTED, key) {
            return Some(Value::String(element.attr(attribute).unwrap_or("").to_string()));
        }
        if let Some(attribute) = reflected(BOOLEAN_REFLECTED, key) {
            return Some(Value::Bool(element.attr(attribute).is_some()));
        }

        let value = match key {
            "tagName" | "nodeName" => Value::String(element.tag.to_ascii_uppercase()),
            "value" => Value::String(self.value(id).unwrap_or_default()),
            "checked" => Value::Bool(
                element
                    .checked
                    .unwrap_or_else(|| element.attr("checked").is_some()),
            ),
            "innerHTML" => Value::String(serialize::inner_html(self, id)),
            "outerHTML" => Value::String(serialize::outer_html(self, id)),
            "textContent" => Value::String(serialize::text_content(self, id)),
            "childElementCount" => Value::from(
                self.children_vec(id)
                    .into_iter()
                    .filter(|&child| self.element(child).is_some())
                    .count(),
            ),
            _ => return element.expando.get(key).cloned(),
        };
        Some(value)
    }

    /// Write a property; writes to read-only properties are ignored
    pub(crate) fn set_property(&mut self, id: NodeId, key: &str, value: Value) {
        if READ_ONLY.contains(&key) {
            return;
        }
        match key {
            "innerHTML" => return self.set_inner_html(id, &to_dom_string(&value)),
            "outerHTML" => return self.set_outer_html(id, &to_dom_string(&value)),
            "textContent" => return self.set_text_content(id, &to_dom_string(&value)),
            _ => {}
        }

        let Some(element) = self.element_mut(id) else {
            return;
        };
        if let Some(attribute) = reflected(STRING_REFLECTED, key) {
            element.set_attr(attribute, to_dom_string(&value));
        } else if let Some(attribute) = reflected(BOOLEAN_REFLECTED, key) {
            if is_truthy(&value) {
                element.set_attr(attribute, "");
            } else {
                element.remove_attr(attribute);
            }
        } else if key == "value" {
            element.value = Some(to_dom_string(&value));
        } else if key == "checked" {
            element.checked = Some(is_truthy(&value));
        } else {
            element.expando.insert(key.to_string(), value);
        }
    }
}
