//! Selector Lexer
//!
//! Tokenizes selector strings. Whitespace is significant (it is the
//! descendant combinator) so it is kept as a token of its own.

/// Selector token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Ident(String),
    /// `#name`
    Hash(String),
    String(String),
    /// String literal with no closing quote
    UnterminatedString,

    Dot,         // .
    Star,        // *
    Colon,       // :
    Comma,       // ,
    Gt,          // >
    Plus,        // +
    Tilde,       // ~
    Eq,          // =
    Includes,    // ~=
    DashMatch,   // |=
    PrefixMatch, // ^=
    SuffixMatch, // $=
    Substring,   // *=

    LeftBracket,  // [
    RightBracket, // ]
    LeftParen,    // (
    RightParen,   // )

    Whitespace,
    /// Any other character
    Delim(char),

    Eof,
}

/// Selector lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Single character token, or a two character match operator when the
    /// next character is `=`
    fn operator(&mut self, single: Token, with_eq: Token) -> Token {
        self.advance(1);
        if self.peek() == Some('=') {
            self.advance(1);
            with_eq
        } else {
            single
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        match c {
            c if is_whitespace(c) => {
                while self.peek().is_some_and(is_whitespace) {
                    self.advance(1);
                }
                Token::Whitespace
            }
            '#' if self.peek_at(1).is_some_and(|n| is_name_char(n) || n == '\\') => {
                self.advance(1);
                Token::Hash(self.read_name())
            }
            '.' => {
                self.advance(1);
                Token::Dot
            }
            ':' => {
                self.advance(1);
                Token::Colon
            }
            ',' => {
                self.advance(1);
                Token::Comma
            }
            '>' => {
                self.advance(1);
                Token::Gt
            }
            '+' => {
                self.advance(1);
                Token::Plus
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '*' => self.operator(Token::Star, Token::Substring),
            '~' => self.operator(Token::Tilde, Token::Includes),
            '|' => self.operator(Token::Delim('|'), Token::DashMatch),
            '^' => self.operator(Token::Delim('^'), Token::PrefixMatch),
            '$' => self.operator(Token::Delim('$'), Token::SuffixMatch),
            '"' | '\'' => self.read_string(c),
            '-' if self
                .peek_at(1)
                .is_some_and(|n| is_name_start_char(n) || n == '-' || n == '\\') =>
            {
                Token::Ident(self.read_name())
            }
            '\\' => Token::Ident(self.read_name()),
            c if is_name_start_char(c) => Token::Ident(self.read_name()),
            c => {
                self.advance(c.len_utf8());
                Token::Delim(c)
            }
        }
    }

    /// Read a name, resolving backslash escapes
    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.advance(1);
                if let Some(escaped) = self.read_escape() {
                    name.push(escaped);
                }
            } else if is_name_char(c) {
                name.push(c);
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        name
    }

    /// Escape body after the backslash: 1-6 hex digits plus one optional
    /// whitespace, or any single character
    fn read_escape(&mut self) -> Option<char> {
        let hex_len = self
            .remaining()
            .bytes()
            .take(6)
            .take_while(u8::is_ascii_hexdigit)
            .count();
        if hex_len > 0 {
            let code = u32::from_str_radix(&self.remaining()[..hex_len], 16).unwrap_or(0xFFFD);
            self.advance(hex_len);
            if self.peek().is_some_and(is_whitespace) {
                self.advance(1);
            }
            return Some(match char::from_u32(code) {
                Some('\0') | None => '\u{FFFD}',
                Some(ch) => ch,
            });
        }
        let c = self.peek()?;
        self.advance(c.len_utf8());
        Some(c)
    }

    fn read_string(&mut self, quote: char) -> Token {
        self.advance(1);
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance(1);
                return Token::String(value);
            }
            if c == '\\' {
                self.advance(1);
                match self.peek() {
                    // Escaped newline is a line continuation
                    Some('\n') => self.advance(1),
                    Some(_) => {
                        if let Some(escaped) = self.read_escape() {
                            value.push(escaped);
                        }
                    }
                    None => break,
                }
                continue;
            }
            if c == '\n' {
                break;
            }
            value.push(c);
            self.advance(c.len_utf8());
        }
        Token::UnterminatedString
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    #[test]
    fn test_compound() {
        let tokens = Lexer::new("div#main.item").tokenize();
        assert_eq!(
            tokens,
            vec![ident("div"), Token::Hash("main".to_string()), Token::Dot, ident("item")]
        );
    }

    #[test]
    fn test_combinators_keep_whitespace() {
        let tokens = Lexer::new("ul > li  a").tokenize();
        assert_eq!(
            tokens,
            vec![
                ident("ul"),
                Token::Whitespace,
                Token::Gt,
                Token::Whitespace,
                ident("li"),
                Token::Whitespace,
                ident("a"),
            ]
        );
    }

    #[test]
    fn test_attribute_operators() {
        let tokens = Lexer::new("[a~=b][c|='d'][e^=f][g$=h][i*=\"j\"]").tokenize();
        assert!(tokens.contains(&Token::Includes));
        assert!(tokens.contains(&Token::DashMatch));
        assert!(tokens.contains(&Token::PrefixMatch));
        assert!(tokens.contains(&Token::SuffixMatch));
        assert!(tokens.contains(&Token::Substring));
        assert!(tokens.contains(&Token::String("d".to_string())));
        assert!(tokens.contains(&Token::String("j".to_string())));
    }

    #[test]
    fn test_escapes() {
        assert_eq!(Lexer::new(r"a\:b").next_token(), ident("a:b"));
        assert_eq!(Lexer::new(r"\31 0").next_token(), ident("10"));
        assert_eq!(Lexer::new(r#""a\"b""#).next_token(), Token::String("a\"b".to_string()));
        assert_eq!(Lexer::new("'open").next_token(), Token::UnterminatedString);
    }

    #[test]
    fn test_dashed_ident_and_delims() {
        assert_eq!(Lexer::new("-webkit-x").next_token(), ident("-webkit-x"));
        assert_eq!(Lexer::new("--var").next_token(), ident("--var"));
        assert_eq!(Lexer::new("-1").next_token(), Token::Delim('-'));
        assert_eq!(Lexer::new("#").next_token(), Token::Delim('#'));
        assert_eq!(Lexer::new("").next_token(), Token::Eof);
    }
}
