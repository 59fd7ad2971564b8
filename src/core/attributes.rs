//! HTML Attribute Parsing
//!
//! Parses attributes from the body of a start tag. Lenient like browsers:
//! names are lower-cased, values may be double-quoted, single-quoted, bare or
//! absent, and the first occurrence of a duplicated name wins.

use super::entities::decode_text;
use super::scanner::is_whitespace;
use std::borrow::Cow;

/// A parsed attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, ASCII lower-cased
    pub name: Cow<'a, str>,
    /// Attribute value (character references decoded)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute, lower-casing the name only when needed
    pub fn new(name: &'a str, value: Cow<'a, str>) -> Self {
        let name = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        };
        Attribute { name, value }
    }

    /// Convert into an owned (name, value) pair
    pub fn into_owned(self) -> (String, String) {
        (self.name.into_owned(), self.value.into_owned())
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between the element name and '>' (a trailing
/// '/' of a self-closing tag is ignored).
pub fn parse_attributes(input: &str) -> Vec<Attribute<'_>> {
    let bytes = input.as_bytes();
    let mut attrs: Vec<Attribute<'_>> = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && (is_whitespace(bytes[pos]) || bytes[pos] == b'/') {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        // The first character may be '=' (browsers keep it as part of the name)
        let name_start = pos;
        pos += 1;
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let value = if pos < bytes.len() && bytes[pos] == b'=' {
            pos += 1;
            while pos < bytes.len() && is_whitespace(bytes[pos]) {
                pos += 1;
            }
            match bytes.get(pos) {
                Some(&quote) if quote == b'"' || quote == b'\'' => {
                    let value_start = pos + 1;
                    let value_end = memchr::memchr(quote, &bytes[value_start..])
                        .map_or(bytes.len(), |i| value_start + i);
                    pos = (value_end + 1).min(bytes.len());
                    decode_text(&input[value_start..value_end])
                }
                Some(_) => {
                    let value_start = pos;
                    while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                        pos += 1;
                    }
                    decode_text(&input[value_start..pos])
                }
                None => Cow::Borrowed(""),
            }
        } else {
            // Attribute without value (HTML boolean attribute)
            Cow::Borrowed("")
        };

        let attr = Attribute::new(name, value);
        if !attrs.iter().any(|existing| existing.name == attr.name) {
            attrs.push(attr);
        }
    }

    attrs
}

/// Check if byte can continue an attribute name
#[inline]
fn is_name_char(b: u8) -> bool {
    !is_whitespace(b) && !matches!(b, b'/' | b'>' | b'=' | b'"' | b'\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_attributes() {
        let attrs = parse_attributes(" id=\"test\" class=\"foo\"");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "test");
        assert_eq!(attrs[1].name, "class");
        assert_eq!(attrs[1].value, "foo");
    }

    #[test]
    fn test_single_quoted_and_bare() {
        let attrs = parse_attributes(" id='test' width=20 hidden");
        assert_eq!(attrs.len(), 3);
        assert_eq!(attrs[0].value, "test");
        assert_eq!(attrs[1].value, "20");
        assert_eq!(attrs[2].name, "hidden");
        assert_eq!(attrs[2].value, "");
    }

    #[test]
    fn test_names_are_lowercased() {
        let attrs = parse_attributes(" DATA-Key=\"v\"");
        assert_eq!(attrs[0].name, "data-key");
    }

    #[test]
    fn test_entity_in_value() {
        let attrs = parse_attributes(" title=\"&lt;hello&gt;\"");
        assert_eq!(attrs[0].value, "<hello>");
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let attrs = parse_attributes(" a=1 a=2");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value, "1");
    }

    #[test]
    fn test_self_closing_slash_and_whitespace() {
        let attrs = parse_attributes("  id  =  \"test\"  /");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name, "id");
        assert_eq!(attrs[0].value, "test");
        assert!(parse_attributes("").is_empty());
    }
}
