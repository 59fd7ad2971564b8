//! Inline style declarations
//!
//! An element's style object is backed by its `style` attribute: reads parse
//! the attribute, writes rewrite it. Property names are looked up in camel
//! form (`backgroundColor`) and stored hyphenated (`background-color`);
//! custom properties (`--x`) are stored as-is.

/// Parse `a: b; c: d` into (hyphenated name, value) pairs
///
/// Later declarations of the same property replace earlier ones.
pub fn parse_declarations(style: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for declaration in style.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        let name = if name.starts_with("--") {
            name.to_string()
        } else {
            name.to_ascii_lowercase()
        };
        match out.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => out.push((name, value.to_string())),
        }
    }
    out
}

/// Serialize declarations back into a `style` attribute value
pub fn serialize_declarations(declarations: &[(String, String)]) -> String {
    declarations
        .iter()
        .map(|(name, value)| format!("{name}: {value};"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Vendor prefixes a style property name may start with
const VENDOR_PREFIXES: &[&str] = &["webkit", "moz", "ms"];

/// `backgroundColor` -> `background-color`, `WebkitTransition` ->
/// `-webkit-transition`
///
/// None for a name that names no CSS property, such as `FontSize`: only a
/// vendor prefix may start with a capital letter.
pub fn camel_to_hyphen(name: &str) -> Option<String> {
    if name.starts_with("--") {
        return Some(name.to_string());
    }
    let first = name.chars().next()?;
    let mut out = String::with_capacity(name.len() + 4);
    let prefixed = has_vendor_prefix(name);
    if first.is_ascii_uppercase() && !prefixed {
        return None;
    }
    if prefixed {
        out.push('-');
    }
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    Some(out)
}

/// `WebkitTransition`, `msTransform`: a known prefix followed by a capital
fn has_vendor_prefix(name: &str) -> bool {
    VENDOR_PREFIXES.iter().any(|prefix| {
        name.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
            && name[prefix.len()..].starts_with(|c: char| c.is_ascii_uppercase())
    })
}

/// `background-color` -> `backgroundColor`
pub fn hyphen_to_camel(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.push(ch.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let decls = parse_declarations("color: red; Margin-Top:4px;;bogus; color: blue");
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "blue".to_string()),
                ("margin-top".to_string(), "4px".to_string()),
            ]
        );
        assert_eq!(serialize_declarations(&decls), "color: blue; margin-top: 4px;");
    }

    #[test]
    fn test_name_conversion() {
        assert_eq!(hyphen_to_camel("background-color"), "backgroundColor");
        assert_eq!(hyphen_to_camel("color"), "color");
        assert_eq!(camel_to_hyphen("backgroundColor").as_deref(), Some("background-color"));
        assert_eq!(camel_to_hyphen("--brand-color").as_deref(), Some("--brand-color"));
        assert_eq!(hyphen_to_camel("--brand-color"), "--brand-color");
    }

    #[test]
    fn test_vendor_prefixes() {
        assert_eq!(hyphen_to_camel("-webkit-transition"), "WebkitTransition");
        assert_eq!(camel_to_hyphen("WebkitTransition").as_deref(), Some("-webkit-transition"));
        assert_eq!(camel_to_hyphen("MozAppearance").as_deref(), Some("-moz-appearance"));
        assert_eq!(camel_to_hyphen("msTransform").as_deref(), Some("-ms-transform"));
        assert_eq!(camel_to_hyphen("FontSize"), None);
        assert_eq!(camel_to_hyphen("Webkit"), None);
        assert_eq!(camel_to_hyphen("webkit").as_deref(), Some("webkit"));
        assert_eq!(camel_to_hyphen(""), None);
    }
}
