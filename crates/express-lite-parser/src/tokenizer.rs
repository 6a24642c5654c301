// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! EXPRESS tokenizer using nom combinators
//!
//! Tokens are whitespace-delimited substrings of a line. Punctuation such
//! as `;`, `,`, `(` and `)` stays attached to the token it was written
//! with; the state machine relies on it.

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while},
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, value},
    sequence::{delimited, preceded, separated_pair},
    IResult, Parser,
};

// ============================================================================
// Tokens
// ============================================================================

/// Parse the next whitespace-delimited token
fn token(input: &str) -> IResult<&str, &str> {
    preceded(
        take_while(char::is_whitespace),
        take_till1(char::is_whitespace),
    )
    .parse(input)
}

/// Lazy token iterator over one line
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (rest, tok) = token(self.rest).ok()?;
        self.rest = rest;
        Some(tok)
    }
}

/// Split a line into tokens, preserving their original text
pub fn tokens(line: &str) -> Tokens<'_> {
    Tokens { rest: line }
}

// ============================================================================
// Cardinality bounds
// ============================================================================

/// `?` (unbounded, keeps the default) or a non-negative integer
fn bound(input: &str) -> IResult<&str, Option<u32>> {
    alt((
        value(None, char('?')),
        map_res(digit1, |digits: &str| {
            lexical_core::parse::<u32>(digits.as_bytes()).map(Some)
        }),
    ))
    .parse(input)
}

/// Parse a bracketed bound token such as `[1:?]`
///
/// Returns `None` when the token is not a well-formed bound.
pub fn parse_bounds(token: &str) -> Option<(Option<u32>, Option<u32>)> {
    let (_, bounds) = all_consuming(delimited(
        char('['),
        separated_pair(bound, char(':'), bound),
        char(']'),
    ))
    .parse(token)
    .ok()?;
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_keep_punctuation() {
        let toks: Vec<_> = tokens("  SUBTYPE OF (IfcRoot);\t").collect();
        assert_eq!(toks, ["SUBTYPE", "OF", "(IfcRoot);"]);
    }

    #[test]
    fn test_tokens_empty_line() {
        assert_eq!(tokens("").count(), 0);
        assert_eq!(tokens("   \t ").count(), 0);
    }

    #[test]
    fn test_tokens_inverse_line() {
        let toks: Vec<_> = tokens("IsDefinedBy : SET [0:?] OF IfcRelDefines FOR RelatedObjects;")
            .collect();
        assert_eq!(toks.len(), 8);
        assert_eq!(toks[3], "[0:?]");
        assert_eq!(toks[7], "RelatedObjects;");
    }

    #[test]
    fn test_parse_bounds() {
        assert_eq!(parse_bounds("[1:?]"), Some((Some(1), None)));
        assert_eq!(parse_bounds("[2:3]"), Some((Some(2), Some(3))));
        assert_eq!(parse_bounds("[?:?]"), Some((None, None)));
    }

    #[test]
    fn test_parse_bounds_rejects_malformed() {
        assert_eq!(parse_bounds("[1:]"), None);
        assert_eq!(parse_bounds("[1]"), None);
        assert_eq!(parse_bounds("[1:2];"), None);
        assert_eq!(parse_bounds("[a:2]"), None);
    }
}
