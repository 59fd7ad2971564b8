//! HTML character reference handling
//!
//! Decoding covers:
//! - The markup-significant named references: &lt; &gt; &amp; &quot; &apos;
//! - A handful of common typographic names (&nbsp; &copy; &mdash; ...)
//! - Numeric character references: &#123; &#x7B;
//!
//! Escaping is the inverse used by the serializer. Both use Cow so untouched
//! input is never copied.

use memchr::{memchr, memchr2, memchr3};
use std::borrow::Cow;

/// Decode character references in text or attribute content
///
/// Returns Borrowed if no references are present, Owned otherwise.
/// Unknown or malformed references are kept verbatim.
#[inline]
pub fn decode_text(input: &str) -> Cow<'_, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

fn decode_entities(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        let amp = pos + amp_offset;
        result.push_str(&input[pos..amp]);

        // References are short; don't scan the whole tail for a ';'
        let window_end = (amp + 34).min(bytes.len());
        let decoded = memchr(b';', &bytes[amp..window_end]).and_then(|semi| {
            let entity = &input[amp + 1..amp + semi];
            decode_entity(entity).map(|ch| (ch, amp + semi + 1))
        });

        match decoded {
            Some((ch, next)) => {
                result.push(ch);
                pos = next;
            }
            None => {
                result.push('&');
                pos = amp + 1;
            }
        }
    }

    result.push_str(&input[pos..]);
    result
}

/// Decode a single reference (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "hellip" => Some('\u{2026}'),
        _ => None,
    }
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };
    // NUL and surrogates map to the replacement character, like browsers do
    Some(char::from_u32(codepoint).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'))
}

/// Escape text content for serialization: & < >
#[inline]
pub fn escape_text(input: &str) -> Cow<'_, str> {
    if memchr3(b'&', b'<', b'>', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

/// Escape a double-quoted attribute value for serialization: & "
#[inline]
pub fn escape_attr(input: &str) -> Cow<'_, str> {
    if memchr2(b'&', b'"', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}
