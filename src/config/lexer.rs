//! Line tokenizer for the `key = value` format.
//!
//! Each line is run through a small state machine:
//!
//! - `BeforeEquals` collects the key until `=`, `#` or end of line.
//! - `AfterEquals` collects an unquoted value until `#` or end of line.
//! - `AfterEqualsString` collects a `'` or `"` quoted value, which may contain `#`.
//!
//! Nothing is trimmed here; the parser trims both sides of the pair.

use std::iter::Peekable;
use std::str::Chars;

use super::SyntaxErrorKind;

/// The untrimmed result of lexing one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPair {
    pub left: String,
    pub right: String,
    /// Set when the line was a comment and contributes nothing.
    pub skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeEquals,
    AfterEquals,
    AfterEqualsString,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    pair: RawPair,
    /// The character that opened the current quoted value.
    quote: char,
}

/// Runs the state machine over a single line.
pub fn lex_line(line: &str) -> Result<RawPair, SyntaxErrorKind> {
    let mut lexer = Lexer {
        chars: line.chars().peekable(),
        pair: RawPair::default(),
        quote: '"',
    };

    let mut state = Some(State::BeforeEquals);
    while let Some(current) = state {
        state = match current {
            State::BeforeEquals => lexer.before_equals()?,
            State::AfterEquals => lexer.after_equals(),
            State::AfterEqualsString => lexer.after_equals_string(),
        };
    }

    Ok(lexer.pair)
}

impl Lexer<'_> {
    /// Consumes whitespace, stopping before the first other character.
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn before_equals(&mut self) -> Result<Option<State>, SyntaxErrorKind> {
        while let Some(c) = self.chars.next() {
            match c {
                '=' => {
                    self.skip_whitespace();
                    return Ok(match self.chars.peek() {
                        None => None,
                        Some(&q) if q == '"' || q == '\'' => {
                            self.chars.next();
                            self.quote = q;
                            Some(State::AfterEqualsString)
                        }
                        Some(_) => Some(State::AfterEquals),
                    });
                }
                '#' => {
                    // `#` only starts a comment at the beginning of a line.
                    if !self.pair.left.is_empty() {
                        return Err(SyntaxErrorKind::UnexpectedIdentifier);
                    }
                    self.pair.skip = true;
                    return Ok(None);
                }
                _ => self.pair.left.push(c),
            }
        }

        if self.pair.left.is_empty() {
            Ok(None)
        } else {
            Err(SyntaxErrorKind::UnexpectedIdentifier)
        }
    }

    fn after_equals(&mut self) -> Option<State> {
        for c in self.chars.by_ref() {
            if c == '#' {
                break;
            }
            self.pair.right.push(c);
        }
        None
    }

    fn after_equals_string(&mut self) -> Option<State> {
        let quote = self.quote;
        for c in self.chars.by_ref() {
            if c == quote {
                break;
            }
            self.pair.right.push(c);
        }

        // Only whitespace and a comment are expected after the closing quote,
        // anything else is ignored.
        self.skip_whitespace();
        None
    }
}
