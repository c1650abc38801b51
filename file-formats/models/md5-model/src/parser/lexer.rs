//! Line tokenizer for the MD5 text formats

use std::fmt;

/// A single token on an MD5 line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A bare word: keyword or number
    Word(&'a str),
    /// A double-quoted string, without the quotes
    Str(&'a str),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(word) => write!(f, "'{word}'"),
            Token::Str(text) => write!(f, "\"{text}\""),
            Token::OpenParen => f.write_str("'('"),
            Token::CloseParen => f.write_str("')'"),
            Token::OpenBrace => f.write_str("'{'"),
            Token::CloseBrace => f.write_str("'}'"),
        }
    }
}

fn is_comment(bytes: &[u8], at: usize) -> bool {
    bytes[at] == b'/' && bytes.get(at + 1) == Some(&b'/')
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b'(' | b')' | b'{' | b'}' | b'"')
}

/// Split one line into tokens, dropping a trailing `//` comment.
///
/// Quoted strings may contain spaces, parentheses and `//`; an unterminated
/// quote is reported as an error message.
pub fn tokenize(line: &str) -> Result<Vec<Token<'_>>, String> {
    let bytes = line.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b if b.is_ascii_whitespace() => i += 1,
            b'(' => {
                tokens.push(Token::OpenParen);
                i += 1;
            }
            b')' => {
                tokens.push(Token::CloseParen);
                i += 1;
            }
            b'{' => {
                tokens.push(Token::OpenBrace);
                i += 1;
            }
            b'}' => {
                tokens.push(Token::CloseBrace);
                i += 1;
            }
            b'"' => {
                let start = i + 1;
                let Some(len) = line[start..].find('"') else {
                    return Err(format!("unterminated string at column {}", i + 1));
                };
                tokens.push(Token::Str(&line[start..start + len]));
                i = start + len + 1;
            }
            _ if is_comment(bytes, i) => break,
            _ => {
                let start = i;
                while i < bytes.len() && !is_delimiter(bytes[i]) && !is_comment(bytes, i) {
                    i += 1;
                }
                tokens.push(Token::Word(&line[start..i]));
            }
        }
    }

    Ok(tokens)
}
