use log::{debug, trace};

use crate::der::{self, Token};
use crate::{Error, Result};

/// Maximum number of nested values a [`Parser`] will descend into.
pub const MAX_DEPTH: usize = 10;

// Position of the most recently produced token.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: usize,
    end: usize,
    primitive: bool,
    entered: bool,
}

/// Cursor over a DER buffer.
///
/// [`next`](Parser::next) reads one TLV and moves the cursor past its content,
/// constructed or not. Children of a constructed token are only reachable by
/// calling [`descend`](Parser::descend) right after reading it, which moves the
/// cursor back to the first child and bounds every read by that token's end.
#[derive(Clone, Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    pos: usize,
    constraint: usize,
    parents: [usize; MAX_DEPTH],
    depth: usize,
    last: Option<Span>,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Parser {
            data,
            pos: 0,
            constraint: data.len(),
            parents: [0; MAX_DEPTH],
            depth: 0,
            last: None,
        }
    }

    /// Decode the TLV at the cursor.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Token<'a>> {
        if self.pos >= self.constraint {
            return Err(Error::Invalid);
        }

        let data = self.data;
        let window = untrusted::Input::from(&data[self.pos..self.constraint]);
        let mut reader = untrusted::Reader::new(window);

        let (header_bytes, header) = reader.read_partial(der::read_header)?;
        let content = reader.read_bytes(header.length).map_err(|_| {
            debug!(
                "content of {} bytes at offset {} crosses the enclosing value",
                header.length, self.pos
            );
            Error::Invalid
        })?;

        let start = self.pos + header_bytes.len();
        let end = start + content.len();

        trace!(
            "{:?} tag {} ({}) len {} at depth {}",
            header.class,
            header.tag,
            der::type_name(header.class, header.tag),
            header.length,
            self.depth
        );

        self.pos = end;
        self.last = Some(Span {
            start,
            end,
            primitive: header.primitive,
            entered: false,
        });

        Ok(Token::new(
            header.class,
            header.tag,
            header.primitive,
            content.as_slice_less_safe(),
            end,
        ))
    }

    /// Move the cursor to the first child of the constructed token just read
    /// and restrict it to that token's content.
    pub fn descend(&mut self) -> Result<()> {
        let span = match self.last {
            Some(span) if !span.primitive && !span.entered && span.end == self.pos => span,
            _ => return Err(Error::Invalid),
        };

        if self.depth >= MAX_DEPTH {
            debug!("refusing to nest deeper than {} levels", MAX_DEPTH);
            return Err(Error::Memory);
        }

        self.parents[self.depth] = self.constraint;
        self.depth += 1;
        self.constraint = span.end;
        self.pos = span.start;
        self.last = Some(Span {
            entered: true,
            ..span
        });

        trace!("descend to depth {}", self.depth);
        Ok(())
    }

    /// Leave `levels` nested values, continuing after the outermost one.
    pub fn ascend(&mut self, levels: usize) -> Result<()> {
        if levels > self.depth {
            return Err(Error::Invalid);
        }

        for _ in 0..levels {
            self.pos = self.constraint;
            self.depth -= 1;
            self.constraint = self.parents[self.depth];
        }

        if levels > 0 {
            self.last = None;
            trace!("ascend to depth {}", self.depth);
        }
        Ok(())
    }

    /// Move past the content of the last token without looking at it. After
    /// a [`descend`](Parser::descend) this drops the remaining children.
    ///
    /// Nothing inside is validated, so a malformed subtree is accepted here
    /// even though walking it would have failed.
    pub fn skip_children(&mut self) {
        if let Some(span) = self.last {
            if span.end > self.pos {
                self.pos = span.end;
            }
        }
    }

    /// True when no more children of `token` remain.
    pub fn eot(&self, token: &Token<'_>) -> bool {
        self.pos == token.end()
    }

    /// True when the whole buffer has been consumed.
    pub fn eof(&self) -> bool {
        self.pos == self.data.len()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Cursor offset into the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }
}
