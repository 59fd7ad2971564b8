//! HTML Tokenizer - pull parser for markup token extraction
//!
//! Implements a pull-parser style tokenizer that extracts:
//! - Element start/end tags (with attributes, self-closing flag)
//! - Text content (character references decoded)
//! - Comments
//! - DOCTYPE declarations
//! - Raw text of `<script>`/`<style>` and escapable raw text of
//!   `<textarea>`/`<title>`
//!
//! The tokenizer never fails. Malformed constructs degrade the way browsers
//! degrade them: a stray '<' becomes text, `<?...>` and `</ ...>` become
//! bogus comments that are dropped, an unterminated tag at EOF is dropped.

use super::attributes::{parse_attributes, Attribute};
use super::entities::decode_text;
use super::scanner::Scanner;
use std::borrow::Cow;

/// Current parsing state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between tags
    Data,
    /// Right after the start tag of a raw text element
    RawText(RawKind),
    /// End of input reached
    Done,
}

/// Raw text flavour of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    /// `<script>`, `<style>`: no references decoded
    Script,
    Style,
    /// `<textarea>`, `<title>`: references decoded
    Textarea,
    Title,
}

impl RawKind {
    fn for_tag(name: &str) -> Option<Self> {
        match name {
            "script" => Some(RawKind::Script),
            "style" => Some(RawKind::Style),
            "textarea" => Some(RawKind::Textarea),
            "title" => Some(RawKind::Title),
            _ => None,
        }
    }

    fn tag(self) -> &'static [u8] {
        match self {
            RawKind::Script => b"script",
            RawKind::Style => b"style",
            RawKind::Textarea => b"textarea",
            RawKind::Title => b"title",
        }
    }

    fn decodes_references(self) -> bool {
        matches!(self, RawKind::Textarea | RawKind::Title)
    }
}

/// A markup token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<name attr=...>` or `<name/>`
    StartTag {
        name: Cow<'a, str>,
        attributes: Vec<Attribute<'a>>,
        self_closing: bool,
    },
    /// `</name>`
    EndTag { name: Cow<'a, str> },
    /// Character data
    Text(Cow<'a, str>),
    /// `<!-- ... -->`
    Comment(&'a str),
    /// `<!DOCTYPE ...>`; the payload is everything after the keyword
    Doctype(&'a str),
}

/// HTML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
    state: ParseState,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a str) -> Self {
        Tokenizer {
            input,
            scanner: Scanner::new(input.as_bytes()),
            state: ParseState::Data,
        }
    }

    #[inline]
    fn str_slice(&self, start: usize, end: usize) -> &'a str {
        &self.input[start..end]
    }

    /// Get the next token, or None if at end of input
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        loop {
            match self.state {
                ParseState::Done => return None,
                ParseState::RawText(kind) => {
                    self.state = ParseState::Data;
                    if let Some(token) = self.read_raw_text(kind) {
                        return Some(token);
                    }
                }
                ParseState::Data => {
                    if self.scanner.is_eof() {
                        self.state = ParseState::Done;
                        return None;
                    }
                    if self.scanner.peek() == Some(b'<') && self.markup_starts_here() {
                        if let Some(token) = self.read_markup() {
                            return Some(token);
                        }
                    } else {
                        return Some(self.read_text());
                    }
                }
            }
        }
    }

    /// Whether the '<' under the cursor opens a markup construct
    fn markup_starts_here(&self) -> bool {
        match self.scanner.peek_at(1) {
            Some(b) if b.is_ascii_alphabetic() => true,
            Some(b'!') | Some(b'?') => true,
            Some(b'/') => self.scanner.peek_at(2).is_some_and(|b| b != b'>'),
            _ => false,
        }
    }

    fn read_text(&mut self) -> Token<'a> {
        let start = self.scanner.position();
        // A leading '<' here is a stray one; keep it as text
        self.scanner.advance(1);
        loop {
            match self.scanner.find_tag_start() {
                Some(lt) => {
                    self.scanner.set_position(lt);
                    if self.markup_starts_here() {
                        break;
                    }
                    self.scanner.advance(1);
                }
                None => {
                    self.scanner.set_position(self.input.len());
                    break;
                }
            }
        }
        let end = self.scanner.position();
        Token::Text(decode_text(self.str_slice(start, end)))
    }

    fn read_raw_text(&mut self, kind: RawKind) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_closing_tag(kind.tag())
            .unwrap_or(self.input.len());
        self.scanner.set_position(end);
        if end == start {
            return None;
        }
        let raw = self.str_slice(start, end);
        let content = if kind.decodes_references() {
            decode_text(raw)
        } else {
            Cow::Borrowed(raw)
        };
        Some(Token::Text(content))
    }

    /// Read the construct starting at '<'; None for dropped constructs
    fn read_markup(&mut self) -> Option<Token<'a>> {
        if self.scanner.starts_with(b"<!--") {
            return Some(self.read_comment());
        }
        if self.scanner.starts_with_ignore_case(b"<!doctype") {
            let body_start = self.scanner.position() + b"<!doctype".len();
            let end = self.skip_past_gt();
            return Some(Token::Doctype(self.str_slice(body_start, end).trim()));
        }
        match self.scanner.peek_at(1) {
            Some(b'!') | Some(b'?') => {
                // Bogus comment
                self.skip_past_gt();
                None
            }
            Some(b'/') => self.read_end_tag(),
            _ => self.read_start_tag(),
        }
    }

    fn read_comment(&mut self) -> Token<'a> {
        let body_start = self.scanner.position() + 4;
        self.scanner.set_position(body_start);
        match self.scanner.find_seq(b"-->") {
            Some(end) => {
                self.scanner.set_position(end + 3);
                Token::Comment(self.str_slice(body_start, end))
            }
            None => {
                self.scanner.set_position(self.input.len());
                Token::Comment(self.str_slice(body_start, self.input.len()))
            }
        }
    }

    /// Advance past the next '>' and return its position (or EOF)
    fn skip_past_gt(&mut self) -> usize {
        let end = self.scanner.find_tag_end_quoted().unwrap_or(self.input.len());
        self.scanner.set_position(end + 1);
        end
    }

    fn read_end_tag(&mut self) -> Option<Token<'a>> {
        self.scanner.advance(2);
        let name = self.scanner.read_tag_name();
        self.skip_past_gt();
        let name = std::str::from_utf8(name?).ok()?;
        Some(Token::EndTag {
            name: lowercase(name),
        })
    }

    fn read_start_tag(&mut self) -> Option<Token<'a>> {
        self.scanner.advance(1);
        let name_bytes = self.scanner.read_tag_name()?;
        let body_start = self.scanner.position();
        let Some(gt) = self.scanner.find_tag_end_quoted() else {
            // EOF inside a tag: the tag is dropped
            self.scanner.set_position(self.input.len());
            return None;
        };
        self.scanner.set_position(gt + 1);

        let name = lowercase(std::str::from_utf8(name_bytes).ok()?);
        let body = self.str_slice(body_start, gt);
        let self_closing = body.trim_end().ends_with('/');

        if !self_closing {
            if let Some(kind) = RawKind::for_tag(&name) {
                self.state = ParseState::RawText(kind);
            }
        }

        Some(Token::StartTag {
            name,
            attributes: parse_attributes(body),
            self_closing,
        })
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[inline]
fn lowercase(name: &str) -> Cow<'_, str> {
    if name.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(name.to_ascii_lowercase())
    } else {
        Cow::Borrowed(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Tokenizer::new(input).collect()
    }

    #[test]
    fn test_simple_element() {
        let toks = tokens("<div class=\"a\">hi</div>");
        assert_eq!(toks.len(), 3);
        match &toks[0] {
            Token::StartTag { name, attributes, self_closing } => {
                assert_eq!(name, "div");
                assert_eq!(attributes[0].value, "a");
                assert!(!self_closing);
            }
            other => panic!("unexpected token {other:?}"),
        }
        assert_eq!(toks[1], Token::Text(Cow::Borrowed("hi")));
        assert_eq!(toks[2], Token::EndTag { name: Cow::Borrowed("div") });
    }

    #[test]
    fn test_uppercase_names_and_self_closing() {
        let toks = tokens("<BR/><Img SRC=x />");
        assert!(matches!(&toks[0], Token::StartTag { name, self_closing: true, .. } if name == "br"));
        assert!(matches!(&toks[1], Token::StartTag { name, self_closing: true, .. } if name == "img"));
    }

    #[test]
    fn test_comment_and_doctype() {
        let toks = tokens("<!DOCTYPE html><!-- note --><p></p>");
        assert_eq!(toks[0], Token::Doctype("html"));
        assert_eq!(toks[1], Token::Comment(" note "));
        assert_eq!(toks.len(), 4);
    }

    #[test]
    fn test_stray_lt_is_text() {
        let toks = tokens("a < b <> c");
        assert_eq!(toks, vec![Token::Text(Cow::Borrowed("a < b <> c"))]);
    }

    #[test]
    fn test_script_is_raw() {
        let toks = tokens("<script>if (a < b && c) {}</script><p>");
        assert_eq!(toks[1], Token::Text(Cow::Borrowed("if (a < b && c) {}")));
        assert!(matches!(&toks[2], Token::EndTag { name } if name == "script"));
        assert!(matches!(&toks[3], Token::StartTag { name, .. } if name == "p"));
    }

    #[test]
    fn test_textarea_decodes_references() {
        let toks = tokens("<textarea>&lt;b&gt;</textarea>");
        assert_eq!(toks[1], Token::Text(Cow::Owned("<b>".to_string())));
    }

    #[test]
    fn test_unterminated_tag_dropped() {
        let toks = tokens("text<div class=\"x");
        assert_eq!(toks, vec![Token::Text(Cow::Borrowed("text"))]);
    }

    #[test]
    fn test_processing_instruction_dropped() {
        let toks = tokens("<?xml version=\"1.0\"?><a></a>");
        assert_eq!(toks.len(), 2);
    }
}
