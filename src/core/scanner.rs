//! Byte cursor over HTML source
//!
//! Delimiter searches go through memchr so long text runs and raw text
//! bodies are skipped in bulk rather than byte by byte.

use memchr::{memchr, memmem};

/// Cursor that the tokenizer drives over the input bytes
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor, clamped to the end of input
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos.min(self.input.len());
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.set_position(self.pos + n);
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    fn rest(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.rest().starts_with(prefix)
    }

    /// ASCII case-insensitive `starts_with`, used for `<!DOCTYPE`
    #[inline]
    pub fn starts_with_ignore_case(&self, prefix: &[u8]) -> bool {
        self.rest()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    /// Absolute offset of the next '<'
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', self.rest()).map(|i| self.pos + i)
    }

    /// Absolute offset of the next occurrence of `needle`
    #[inline]
    pub fn find_seq(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(self.rest(), needle).map(|i| self.pos + i)
    }

    /// Offset of the '>' closing the current tag
    ///
    /// A '>' inside a single- or double-quoted attribute value does not
    /// close the tag.
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let mut quote: Option<u8> = None;
        for (i, &b) in self.rest().iter().enumerate() {
            match (quote, b) {
                (None, b'"' | b'\'') => quote = Some(b),
                (Some(q), _) if q == b => quote = None,
                (None, b'>') => return Some(self.pos + i),
                _ => {}
            }
        }
        None
    }

    /// Offset of the `</name` that ends a raw text element
    ///
    /// `name` is compared case-insensitively and must be followed by
    /// whitespace, '/', '>' or end of input, so `</scripts>` does not end
    /// a script body.
    pub fn find_closing_tag(&self, name: &[u8]) -> Option<usize> {
        let finder = memmem::Finder::new(b"</");
        let mut from = self.pos;
        while let Some(hit) = finder.find(&self.input[from..]) {
            let open = from + hit;
            let after = &self.input[open + 2..];
            let name_matches = after
                .get(..name.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name));
            if name_matches && after.get(name.len()).is_none_or(|&b| ends_tag_name(b)) {
                return Some(open);
            }
            from = open + 2;
        }
        None
    }

    /// Consume a tag name: an ASCII letter followed by anything up to
    /// whitespace, '/' or '>'
    pub fn read_tag_name(&mut self) -> Option<&'a [u8]> {
        let rest = self.rest();
        if !rest.first().is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        let len = rest.iter().position(|&b| ends_tag_name(b)).unwrap_or(rest.len());
        self.pos += len;
        Some(&rest[..len])
    }
}

/// HTML whitespace: space, tab, LF, FF, CR
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0C | b'\r')
}

#[inline]
fn ends_tag_name(b: u8) -> bool {
    is_whitespace(b) || b == b'/' || b == b'>'
}
