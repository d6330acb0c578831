//! Selector text to `SelectorList`.

use crate::{
    Combinator, ComplexSelector, CompoundSelector, SelectorError, SelectorList, SimpleSelector,
};

/// Byte cursor over the selector source.
struct Cursor<'input> {
    input: &'input str,
    index: usize,
}

#[inline]
const fn is_ident_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || byte >= 0x80
}

impl<'input> Cursor<'input> {
    const fn new(input: &'input str) -> Self {
        Self { input, index: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.index).copied()
    }

    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn error(&self, reason: &str) -> SelectorError {
        SelectorError {
            offset: self.index,
            reason: reason.to_owned(),
        }
    }

    /// Skip ASCII whitespace, returning whether any was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    fn slice_from(&self, start: usize) -> Result<&'input str, SelectorError> {
        self.input
            .get(start..self.index)
            .ok_or_else(|| self.error("selector is not valid UTF-8 at this position"))
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(is_ident_byte) {
            self.bump();
        }
        if self.index == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.slice_from(start)?.to_owned())
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        self.skip_whitespace();
        let first = self.compound()?;
        let mut rest = Vec::new();
        loop {
            let saw_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(b',') => break,
                Some(b'>') => Combinator::Child,
                Some(b'+') => Combinator::AdjacentSibling,
                Some(b'~') => Combinator::GeneralSibling,
                Some(_) if saw_whitespace => Combinator::Descendant,
                Some(b':') => return Err(self.error("pseudo-classes are not supported")),
                Some(_) => return Err(self.error("unexpected character")),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            rest.push((combinator, self.compound()?));
        }
        Ok(ComplexSelector { first, rest })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut compound = CompoundSelector::default();
        match self.peek() {
            Some(b'*') => {
                self.bump();
                compound.simples.push(SimpleSelector::Universal);
            }
            Some(byte) if is_ident_byte(byte) => {
                let tag = self.ident()?;
                compound
                    .simples
                    .push(SimpleSelector::Type(tag.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some(b'.') => {
                    self.bump();
                    compound.simples.push(SimpleSelector::Class(self.ident()?));
                }
                Some(b'#') => {
                    self.bump();
                    compound
                        .simples
                        .push(SimpleSelector::IdSelector(self.ident()?));
                }
                Some(b'[') => {
                    self.bump();
                    compound.simples.push(self.attribute()?);
                }
                Some(b':') => return Err(self.error("pseudo-classes are not supported")),
                _ => break,
            }
        }
        if compound.simples.is_empty() {
            return Err(self.error("expected a selector"));
        }
        Ok(compound)
    }

    /// Parses the body of `[name]` or `[name=value]`; the `[` is already consumed.
    fn attribute(&mut self) -> Result<SimpleSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let selector = match self.peek() {
            Some(b']') => SimpleSelector::AttrExists { name },
            Some(b'=') => {
                self.bump();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(quote @ (b'"' | b'\'')) => {
                        self.bump();
                        self.quoted(quote)?
                    }
                    _ => self.unquoted()?,
                };
                self.skip_whitespace();
                SimpleSelector::AttrEquals { name, value }
            }
            Some(b'~' | b'|' | b'^' | b'$' | b'*') => {
                return Err(self.error("unsupported attribute operator"));
            }
            _ => return Err(self.error("unterminated attribute selector")),
        };
        if self.peek() != Some(b']') {
            return Err(self.error("unterminated attribute selector"));
        }
        self.bump();
        Ok(selector)
    }

    fn quoted(&mut self, quote: u8) -> Result<String, SelectorError> {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte != quote) {
            self.bump();
        }
        if self.peek().is_none() {
            return Err(self.error("unterminated string"));
        }
        let value = self.slice_from(start)?.to_owned();
        self.bump();
        Ok(value)
    }

    fn unquoted(&mut self) -> Result<String, SelectorError> {
        let start = self.index;
        while self
            .peek()
            .is_some_and(|byte| !byte.is_ascii_whitespace() && byte != b']')
        {
            self.bump();
        }
        if self.index == start {
            return Err(self.error("expected an attribute value"));
        }
        Ok(self.slice_from(start)?.to_owned())
    }
}

/// Parse a comma-separated selector list.
///
/// # Errors
/// Returns a `SelectorError` for empty groups, dangling combinators and
/// unsupported syntax.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    let mut cursor = Cursor::new(input);
    let mut list = SelectorList::default();
    loop {
        list.selectors.push(cursor.complex()?);
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some(b',') => cursor.bump(),
            Some(_) => return Err(cursor.error("unexpected character")),
        }
    }
    Ok(list)
}

/// Parse exactly one complex selector.
///
/// # Errors
/// Returns a `SelectorError` if the text is not a single valid complex selector.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector, SelectorError> {
    let mut cursor = Cursor::new(input);
    let selector = cursor.complex()?;
    cursor.skip_whitespace();
    if cursor.peek().is_some() {
        return Err(cursor.error("trailing input after selector"));
    }
    Ok(selector)
}
