// src/tsv.rs

use anyhow::{Context, Result};
use std::io::{self, BufRead};

/// One parsed row: the 1-based line it starts on and its undecoded fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsvRow {
    pub line: u64,
    raw: Vec<Vec<u8>>,
}

impl TsvRow {
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Decode every field as UTF-8.
    pub fn into_fields(self) -> Result<Vec<String>> {
        self.raw
            .into_iter()
            .enumerate()
            .map(|(i, f)| {
                String::from_utf8(f).with_context(|| format!("column {} is not valid UTF-8", i + 1))
            })
            .collect()
    }
}

/// Streaming reader for headerless, tab-separated files using `\` as the
/// escape character and `"` as the quote character.
///
/// - `\t` separates fields, `\n` ends a row (a `\r` right before it is dropped).
/// - A backslash makes the next byte literal, so an escaped tab stays in the
///   field and an escaped newline continues the row on the next line.
/// - A field starting with `"` is quoted: tabs and newlines inside are
///   literal, `""` is one quote, and the next lone `"` closes it. A quote
///   anywhere else is an ordinary character.
/// - Blank lines yield nothing.
///
/// Only read failures are errors here; decoding is left to [`TsvRow::into_fields`].
pub struct TsvReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: u64,
}

impl<R: BufRead> TsvReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(256),
            line: 0,
        }
    }

    /// Physical lines consumed so far.
    pub fn lines_read(&self) -> u64 {
        self.line
    }

    fn read_row(&mut self) -> io::Result<Option<TsvRow>> {
        loop {
            let start = self.line + 1;
            let mut row = RowBuilder::default();
            let mut eof = false;

            loop {
                self.buf.clear();
                if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                    eof = true;
                    break;
                }
                self.line += 1;
                if row.feed(&self.buf) {
                    break;
                }
            }

            if row.is_blank() {
                if eof {
                    return Ok(None);
                }
                continue;
            }
            return Ok(Some(TsvRow {
                line: start,
                raw: row.finish(),
            }));
        }
    }
}

impl<R: BufRead> Iterator for TsvReader<R> {
    type Item = io::Result<TsvRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    FieldStart,
    InField,
    InQuoted,
    // a `"` was seen inside a quoted field: closing, or first half of `""`
    QuoteInQuoted,
}

#[derive(Default)]
struct RowBuilder {
    fields: Vec<Vec<u8>>,
    field: Vec<u8>,
    state: State,
    escaped: bool,
    saw_quote: bool,
    // last byte pushed was an unescaped '\r' outside quotes
    pending_cr: bool,
}

impl RowBuilder {
    /// Consume one physical line. Returns true once the row is terminated.
    fn feed(&mut self, bytes: &[u8]) -> bool {
        for &b in bytes {
            let prev_cr = std::mem::take(&mut self.pending_cr);

            if self.escaped {
                self.field.push(b);
                self.escaped = false;
                if self.state != State::InQuoted {
                    self.state = State::InField;
                }
                continue;
            }

            match (self.state, b) {
                (State::InQuoted, b'\\') => self.escaped = true,
                (State::InQuoted, b'"') => self.state = State::QuoteInQuoted,
                (State::InQuoted, _) => self.field.push(b),
                (State::QuoteInQuoted, b'"') => {
                    self.field.push(b'"');
                    self.state = State::InQuoted;
                }
                (State::FieldStart, b'"') => {
                    self.state = State::InQuoted;
                    self.saw_quote = true;
                }
                (_, b'\\') => self.escaped = true,
                (_, b'\t') => {
                    self.fields.push(std::mem::take(&mut self.field));
                    self.state = State::FieldStart;
                }
                (_, b'\n') => {
                    if prev_cr {
                        self.field.pop();
                    }
                    return true;
                }
                (_, _) => {
                    self.field.push(b);
                    self.pending_cr = b == b'\r';
                    self.state = State::InField;
                }
            }
        }
        false
    }

    fn is_blank(&self) -> bool {
        self.fields.is_empty() && self.field.is_empty() && !self.saw_quote
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        self.fields.push(self.field);
        self.fields
    }
}
