//! Selector Parser
//!
//! Recursive descent parser producing a `SelectorList`:
//!
//! ```text
//! list      := complex ( ',' complex )*
//! complex   := compound ( combinator compound )*
//! compound  := ( type | '*' )? ( '#id' | '.class' | '[attr]' | ':pseudo' )*
//! ```

use super::lexer::{Lexer, Token};
use crate::error::{Error, Result};

/// Comma-separated group of selectors; matches if any member matches
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Compounds joined by combinators
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`; the
/// last compound is the subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<Compound>,
    pub combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// whitespace
    Descendant,
    /// `>`
    Child,
    /// `+`
    NextSibling,
    /// `~`
    SubsequentSibling,
}

/// Simple selectors that all apply to one element
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Compound {
    /// Lower-cased tag name; `None` for `*` or no type selector
    pub tag: Option<String>,
    pub simple: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute {
        name: String,
        matcher: Option<(AttrOp, String)>,
    },
    Pseudo(PseudoClass),
    Not(Vec<Compound>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`
    Equals,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
    /// `*=`
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    Empty,
    Checked,
    Disabled,
    Enabled,
}

impl PseudoClass {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "root" => Some(PseudoClass::Root),
            "first-child" => Some(PseudoClass::FirstChild),
            "last-child" => Some(PseudoClass::LastChild),
            "only-child" => Some(PseudoClass::OnlyChild),
            "empty" => Some(PseudoClass::Empty),
            "checked" => Some(PseudoClass::Checked),
            "disabled" => Some(PseudoClass::Disabled),
            "enabled" => Some(PseudoClass::Enabled),
            _ => None,
        }
    }
}

/// Valid CSS pseudo-classes this engine does not evaluate
const UNSUPPORTED_PSEUDO: &[&str] = &[
    "active", "any-link", "autofill", "default", "defined", "focus", "focus-visible",
    "focus-within", "has", "hover", "in-range", "indeterminate", "invalid", "is", "lang", "link",
    "first-of-type", "last-of-type", "only-of-type", "nth-child", "nth-last-child",
    "nth-of-type", "nth-last-of-type", "optional", "out-of-range", "placeholder-shown",
    "read-only", "read-write", "scope", "target", "valid", "visited", "where",
];

/// Selector parser
pub struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Parser {
            source,
            lexer,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Skip whitespace; returns whether any was skipped
    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while matches!(self.current, Token::Whitespace) {
            self.advance();
            skipped = true;
        }
        skipped
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::invalid(self.source, reason)
    }

    fn unexpected(&self) -> Error {
        match &self.current {
            Token::Eof => self.invalid("unexpected end of selector"),
            Token::UnterminatedString => self.invalid("unterminated string"),
            token => self.invalid(format!("unexpected {token:?}")),
        }
    }

    /// Parse a full selector list
    pub fn parse(&mut self) -> Result<SelectorList> {
        let mut list = Vec::new();
        loop {
            self.skip_whitespace();
            list.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.current {
                Token::Comma => self.advance(),
                Token::Eof => break,
                _ => return Err(self.unexpected()),
            }
        }
        Ok(SelectorList(list))
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.current {
                Token::Gt => Combinator::Child,
                Token::Plus => Combinator::NextSibling,
                Token::Tilde => Combinator::SubsequentSibling,
                Token::Comma | Token::Eof | Token::RightParen => break,
                _ if had_whitespace => Combinator::Descendant,
                _ => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.advance();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut any = false;

        match &self.current {
            Token::Ident(name) => {
                compound.tag = Some(name.to_ascii_lowercase());
                self.advance();
                any = true;
            }
            Token::Star => {
                self.advance();
                any = true;
            }
            _ => {}
        }

        loop {
            let simple = match &self.current {
                Token::Hash(id) => {
                    let id = id.clone();
                    self.advance();
                    SimpleSelector::Id(id)
                }
                Token::Dot => {
                    self.advance();
                    let Token::Ident(class) = &self.current else {
                        return Err(self.invalid("expected class name after '.'"));
                    };
                    let class = class.clone();
                    self.advance();
                    SimpleSelector::Class(class)
                }
                Token::LeftBracket => self.parse_attribute()?,
                Token::Colon => self.parse_pseudo()?,
                _ => break,
            };
            compound.simple.push(simple);
            any = true;
        }

        if !any {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<SimpleSelector> {
        self.advance();
        self.skip_whitespace();
        let Token::Ident(name) = &self.current else {
            return Err(self.invalid("expected attribute name"));
        };
        let name = name.to_ascii_lowercase();
        self.advance();
        self.skip_whitespace();

        let op = match self.current {
            Token::RightBracket => {
                self.advance();
                return Ok(SimpleSelector::Attribute {
                    name,
                    matcher: None,
                });
            }
            Token::Eq => AttrOp::Equals,
            Token::Includes => AttrOp::Includes,
            Token::DashMatch => AttrOp::DashMatch,
            Token::PrefixMatch => AttrOp::Prefix,
            Token::SuffixMatch => AttrOp::Suffix,
            Token::Substring => AttrOp::Substring,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        self.skip_whitespace();

        let value = match &self.current {
            Token::Ident(value) | Token::String(value) => value.clone(),
            _ => return Err(self.invalid("expected attribute value")),
        };
        self.advance();
        self.skip_whitespace();

        if self.current != Token::RightBracket {
            return Err(self.invalid("unterminated attribute selector"));
        }
        self.advance();

        Ok(SimpleSelector::Attribute {
            name,
            matcher: Some((op, value)),
        })
    }

    fn parse_pseudo(&mut self) -> Result<SimpleSelector> {
        self.advance();
        if self.current == Token::Colon {
            return Err(Error::unsupported(self.source, "pseudo-elements"));
        }
        let Token::Ident(name) = &self.current else {
            return Err(self.invalid("expected pseudo-class name"));
        };
        let name = name.to_ascii_lowercase();
        self.advance();

        if self.current == Token::LeftParen {
            if name != "not" {
                return Err(if UNSUPPORTED_PSEUDO.contains(&name.as_str()) {
                    Error::unsupported(self.source, format!(":{name}()"))
                } else {
                    self.invalid(format!("unknown pseudo-class :{name}()"))
                });
            }
            self.advance();
            return self.parse_negation();
        }

        if let Some(pseudo) = PseudoClass::from_name(&name) {
            return Ok(SimpleSelector::Pseudo(pseudo));
        }
        if UNSUPPORTED_PSEUDO.contains(&name.as_str()) {
            return Err(Error::unsupported(self.source, format!(":{name}")));
        }
        Err(self.invalid(format!("unknown pseudo-class :{name}")))
    }

    /// Body of `:not(...)`: a comma-separated list of compounds
    fn parse_negation(&mut self) -> Result<SimpleSelector> {
        let mut compounds = Vec::new();
        loop {
            self.skip_whitespace();
            compounds.push(self.parse_compound()?);
            self.skip_whitespace();
            match self.current {
                Token::Comma => self.advance(),
                Token::RightParen => {
                    self.advance();
                    break;
                }
                Token::Gt | Token::Plus | Token::Tilde | Token::Ident(_) | Token::Star => {
                    return Err(Error::unsupported(self.source, "combinators inside :not()"));
                }
                _ => return Err(self.unexpected()),
            }
        }
        Ok(SimpleSelector::Not(compounds))
    }
}

/// Parse a selector string
pub fn parse(source: &str) -> Result<SelectorList> {
    if source.trim().is_empty() {
        return Err(Error::invalid(source, "empty selector"));
    }
    Parser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(source: &str) -> ComplexSelector {
        let mut list = parse(source).unwrap();
        assert_eq!(list.0.len(), 1);
        list.0.remove(0)
    }

    #[test]
    fn test_compound() {
        let selector = single("DIV#main.a.b");
        assert!(selector.combinators.is_empty());
        let compound = &selector.compounds[0];
        assert_eq!(compound.tag.as_deref(), Some("div"));
        assert_eq!(
            compound.simple,
            vec![
                SimpleSelector::Id("main".to_string()),
                SimpleSelector::Class("a".to_string()),
                SimpleSelector::Class("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_combinators() {
        let selector = single("ul > li + li ~ p a");
        assert_eq!(
            selector.combinators,
            vec![
                Combinator::Child,
                Combinator::NextSibling,
                Combinator::SubsequentSibling,
                Combinator::Descendant,
            ]
        );
        assert_eq!(selector.compounds.len(), 5);
    }

    #[test]
    fn test_group_and_attributes() {
        let list = parse(" a[href^='http'] , [data-X] ").unwrap();
        assert_eq!(list.0.len(), 2);
        assert_eq!(
            list.0[0].compounds[0].simple[0],
            SimpleSelector::Attribute {
                name: "href".to_string(),
                matcher: Some((AttrOp::Prefix, "http".to_string())),
            }
        );
        assert_eq!(
            list.0[1].compounds[0].simple[0],
            SimpleSelector::Attribute {
                name: "data-x".to_string(),
                matcher: None,
            }
        );
    }

    #[test]
    fn test_pseudo_classes() {
        let selector = single("li:first-child:not(.done, [hidden])");
        let simple = &selector.compounds[0].simple;
        assert_eq!(simple[0], SimpleSelector::Pseudo(PseudoClass::FirstChild));
        assert!(matches!(&simple[1], SimpleSelector::Not(inner) if inner.len() == 2));
    }

    #[test]
    fn test_invalid() {
        for source in ["", "  ", "div[", "a >", ".", "#", "a,,b", "[=x]", "p:bogus", "a)"] {
            assert!(
                matches!(parse(source), Err(Error::InvalidSelector { .. })),
                "{source:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_unsupported() {
        for source in ["a:hover", "li:nth-child(2)", "p::before", ":not(a b)"] {
            assert!(
                matches!(parse(source), Err(Error::UnsupportedSelector { .. })),
                "{source:?} should be unsupported"
            );
        }
    }
}
