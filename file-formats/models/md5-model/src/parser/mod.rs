//! Block scanner shared by the `.md5mesh` and `.md5anim` readers
//!
//! Both formats are line oriented: top-level statements (`MD5Version 10`,
//! `frameRate 24`) and tagged blocks (`joints {`, `frame 3 {`) whose body lines
//! each hold one record. The scanner splits a document into statements and
//! blocks once; the record readers then walk the lines they care about.
//!
//! Malformed input is handled according to [`ParseOptions`]: in the default
//! lenient mode a bad record is skipped and a missing block reads as empty,
//! in strict mode the first problem is returned as an error.

mod lexer;

pub use lexer::{Token, tokenize};

use std::str::FromStr;

use glam::{Vec2, Vec3};
use log::debug;

use crate::error::{Md5Error, Result};

/// How to react to records that do not match the expected grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Skip malformed records and treat missing blocks as empty
    #[default]
    Lenient,
    /// Fail on the first malformed record or missing block
    Strict,
}

/// Options controlling text parsing
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Reaction to malformed input
    pub strictness: Strictness,
}

impl ParseOptions {
    /// Options that fail on the first malformed record
    pub fn strict() -> Self {
        Self {
            strictness: Strictness::Strict,
        }
    }

    /// Whether malformed records are skipped
    pub fn is_lenient(&self) -> bool {
        self.strictness == Strictness::Lenient
    }

    /// Turn a failed record into a skipped one when lenient.
    pub(crate) fn recover<T>(&self, result: Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.is_lenient() => {
                debug!("skipping malformed record: {err}");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Resolve an optional block, failing in strict mode when it is absent.
    pub(crate) fn require<'d, 'a>(
        &self,
        block: Option<&'d Block<'a>>,
        tag: &'static str,
    ) -> Result<Option<&'d Block<'a>>> {
        match block {
            Some(block) => Ok(Some(block)),
            None if self.is_lenient() => {
                debug!("no '{tag}' block found; reading it as empty");
                Ok(None)
            }
            None => Err(Md5Error::MissingBlock(tag)),
        }
    }
}

/// A tokenized source line
#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    /// Tokens on the line, comments removed
    pub tokens: Vec<Token<'a>>,
}

impl<'a> Line<'a> {
    /// A cursor over this line's tokens
    pub fn cursor(&self) -> Tokens<'_, 'a> {
        Tokens {
            line: self.number,
            tokens: &self.tokens,
            pos: 0,
        }
    }

    /// The leading keyword, if the line starts with a bare word
    pub fn keyword(&self) -> Option<&'a str> {
        match self.tokens.first() {
            Some(Token::Word(word)) => Some(*word),
            _ => None,
        }
    }
}

/// A tagged `{ ... }` block
#[derive(Debug, Clone)]
pub struct Block<'a> {
    /// The word before the brace, e.g. `joints` or `frame`
    pub tag: &'a str,
    /// Tokens between the tag and the brace, e.g. the frame number
    pub label: Vec<Token<'a>>,
    /// Line the block was opened on
    pub line: usize,
    /// Non-empty body lines
    pub body: Vec<Line<'a>>,
}

impl<'a> Block<'a> {
    /// The label parsed as a number, e.g. `frame 7 {` yields 7
    pub fn label_number<T: FromStr>(&self) -> Option<T> {
        match self.label.as_slice() {
            [Token::Word(word)] => word.parse().ok(),
            _ => None,
        }
    }

    /// Every token of the body in order, tagged with its line number
    pub fn body_tokens(&self) -> impl Iterator<Item = (usize, &Token<'a>)> {
        self.body
            .iter()
            .flat_map(|line| line.tokens.iter().map(move |token| (line.number, token)))
    }
}

/// A scanned MD5 document: top-level statements and blocks
#[derive(Debug, Clone, Default)]
pub struct Document<'a> {
    statements: Vec<Line<'a>>,
    blocks: Vec<Block<'a>>,
}

impl<'a> Document<'a> {
    /// Split `text` into statements and blocks
    pub fn scan(text: &'a str, options: &ParseOptions) -> Result<Self> {
        let mut document = Self::default();
        let mut open: Option<Block<'a>> = None;

        for (index, raw) in text.lines().enumerate() {
            let number = index + 1;
            let Some(tokens) = options.recover(
                tokenize(raw).map_err(|message| Md5Error::parse(number, message)),
            )?
            else {
                continue;
            };
            if tokens.is_empty() {
                continue;
            }

            if let Some(block) = open.as_mut() {
                match tokens.iter().position(|t| *t == Token::CloseBrace) {
                    Some(end) => {
                        if end > 0 {
                            block.body.push(Line {
                                number,
                                tokens: tokens[..end].to_vec(),
                            });
                        }
                        if end + 1 < tokens.len() {
                            debug!("line {number}: ignoring tokens after '}}'");
                        }
                        if let Some(block) = open.take() {
                            document.blocks.push(block);
                        }
                    }
                    None => block.body.push(Line { number, tokens }),
                }
                continue;
            }

            let tag = match tokens.first() {
                Some(Token::Word(tag)) => Some(*tag),
                _ => None,
            };
            let brace = tokens.iter().position(|t| *t == Token::OpenBrace);
            let (Some(tag), Some(brace)) = (tag, brace) else {
                document.statements.push(Line { number, tokens });
                continue;
            };

            // `tag [label] {` optionally followed by body tokens and `}`
            let mut block = Block {
                tag,
                label: tokens[1..brace].to_vec(),
                line: number,
                body: Vec::new(),
            };
            let rest = &tokens[brace + 1..];
            let close = rest.iter().position(|t| *t == Token::CloseBrace);
            let body = close.map_or(rest, |end| &rest[..end]);
            if !body.is_empty() {
                block.body.push(Line {
                    number,
                    tokens: body.to_vec(),
                });
            }
            match close {
                Some(end) => {
                    if end + 1 < rest.len() {
                        debug!("line {number}: ignoring tokens after '}}'");
                    }
                    document.blocks.push(block);
                }
                None => open = Some(block),
            }
        }

        if let Some(block) = open {
            let err = Md5Error::parse(
                block.line,
                format!("block '{}' is never closed", block.tag),
            );
            options.recover::<()>(Err(err))?;
        }

        Ok(document)
    }

    /// The first block with the given tag
    pub fn block(&self, tag: &str) -> Option<&Block<'a>> {
        self.blocks.iter().find(|block| block.tag == tag)
    }

    /// All blocks with the given tag, in file order
    pub fn blocks<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = &'s Block<'a>> + 's {
        self.blocks.iter().filter(move |block| block.tag == tag)
    }

    /// The first top-level statement starting with `keyword`
    pub fn statement(&self, keyword: &str) -> Option<&Line<'a>> {
        self.statements
            .iter()
            .find(|line| line.keyword() == Some(keyword))
    }
}

/// Cursor over the tokens of one line
#[derive(Debug, Clone)]
pub struct Tokens<'t, 'a> {
    line: usize,
    tokens: &'t [Token<'a>],
    pos: usize,
}

impl<'t, 'a> Tokens<'t, 'a> {
    /// Line number for error reporting
    pub fn line(&self) -> usize {
        self.line
    }

    /// Whether all tokens were consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn next(&mut self, what: &str) -> Result<Token<'a>> {
        let token = self.tokens.get(self.pos).copied().ok_or_else(|| {
            Md5Error::parse(self.line, format!("expected {what}, found end of line"))
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self, what: &str, found: Token<'_>) -> Md5Error {
        Md5Error::parse(self.line, format!("expected {what}, found {found}"))
    }

    /// Consume a specific keyword
    pub fn keyword(&mut self, keyword: &str) -> Result<()> {
        match self.next(keyword)? {
            Token::Word(word) if word == keyword => Ok(()),
            other => Err(self.unexpected(keyword, other)),
        }
    }

    /// Consume a quoted string
    pub fn string(&mut self, what: &str) -> Result<&'a str> {
        match self.next(what)? {
            Token::Str(text) => Ok(text),
            other => Err(self.unexpected(what, other)),
        }
    }

    /// Consume a bare word and parse it as a number
    pub fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        match self.next(what)? {
            Token::Word(word) => word.parse().map_err(|_| {
                Md5Error::parse(self.line, format!("invalid {what}: '{word}'"))
            }),
            other => Err(self.unexpected(what, other)),
        }
    }

    fn punct(&mut self, expected: Token<'static>) -> Result<()> {
        let what = expected.to_string();
        let found = self.next(&what)?;
        if found == expected {
            Ok(())
        } else {
            Err(self.unexpected(&what, found))
        }
    }

    /// Consume `( x y )`
    pub fn vec2(&mut self, what: &str) -> Result<Vec2> {
        self.punct(Token::OpenParen)?;
        let x = self.number(what)?;
        let y = self.number(what)?;
        self.punct(Token::CloseParen)?;
        Ok(Vec2::new(x, y))
    }

    /// Consume `( x y z )`
    pub fn vec3(&mut self, what: &str) -> Result<Vec3> {
        self.punct(Token::OpenParen)?;
        let x = self.number(what)?;
        let y = self.number(what)?;
        let z = self.number(what)?;
        self.punct(Token::CloseParen)?;
        Ok(Vec3::new(x, y, z))
    }
}
