// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line scanner for EXPRESS text
//!
//! Splits schema text into lines and removes `(* ... *)` block comments
//! (which may span lines) and `--` line comments, using memchr for the
//! byte searches. Quoted strings are left untouched.

use memchr::{memchr, memchr3, memmem};
use std::borrow::Cow;

/// Comment remover carrying block-comment state across lines
#[derive(Debug, Default)]
pub struct CommentStripper {
    in_block: bool,
}

impl CommentStripper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last line ended inside a block comment
    pub fn in_block(&self) -> bool {
        self.in_block
    }

    /// Remove comments from one line
    ///
    /// A block comment is replaced by a single space so that the tokens on
    /// either side stay apart. Lines without comments are returned borrowed.
    pub fn strip<'a>(&mut self, line: &'a str) -> Cow<'a, str> {
        let bytes = line.as_bytes();
        let mut kept = String::new();
        let mut stripped = false;
        // start of the segment not yet copied into `kept`
        let mut start = 0;
        let mut pos = 0;

        while pos < bytes.len() {
            if self.in_block {
                stripped = true;
                match memmem::find(&bytes[pos..], b"*)") {
                    Some(end) => {
                        pos += end + 2;
                        start = pos;
                        self.in_block = false;
                        kept.push(' ');
                    }
                    None => {
                        pos = bytes.len();
                        start = pos;
                    }
                }
                continue;
            }

            let Some(offset) = memchr3(b'(', b'-', b'\'', &bytes[pos..]) else {
                break;
            };
            let at = pos + offset;
            match (bytes[at], bytes.get(at + 1)) {
                (b'\'', _) => {
                    pos = match memchr(b'\'', &bytes[at + 1..]) {
                        Some(close) => at + close + 2,
                        None => bytes.len(),
                    };
                }
                (b'(', Some(b'*')) => {
                    stripped = true;
                    kept.push_str(&line[start..at]);
                    self.in_block = true;
                    pos = at + 2;
                    start = pos;
                }
                (b'-', Some(b'-')) => {
                    stripped = true;
                    kept.push_str(&line[start..at]);
                    start = bytes.len();
                    break;
                }
                _ => pos = at + 1,
            }
        }

        if !stripped {
            return Cow::Borrowed(line);
        }
        if start < bytes.len() {
            kept.push_str(&line[start..]);
        }
        Cow::Owned(kept)
    }
}

/// Iterator over the lines of a schema, comments optionally removed
pub struct SchemaScanner<'a> {
    content: &'a str,
    pos: usize,
    comments: Option<CommentStripper>,
}

impl<'a> SchemaScanner<'a> {
    /// Scanner that removes comments
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            comments: Some(CommentStripper::new()),
        }
    }

    /// Scanner that yields lines as written
    pub fn raw(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            comments: None,
        }
    }

    /// Number of lines in `content`
    pub fn line_count(content: &str) -> usize {
        SchemaScanner::raw(content).count()
    }
}

impl<'a> Iterator for SchemaScanner<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.content.len() {
            return None;
        }

        let rest = &self.content[self.pos..];
        let line = match memchr(b'\n', rest.as_bytes()) {
            Some(end) => {
                self.pos += end + 1;
                &rest[..end]
            }
            None => {
                self.pos = self.content.len();
                rest
            }
        };
        let line = line.strip_suffix('\r').unwrap_or(line);

        Some(match self.comments.as_mut() {
            Some(stripper) => stripper.strip(line),
            None => Cow::Borrowed(line),
        })
    }
}
