//! Backtracking parser primitives over a buffered token stream.
//!
//! Tokens are pulled lazily from the tokenizer into a [BufferedStream], which remembers every
//! token it has handed out so a [Parser] can seek back after a failed alternative. Errors carry
//! a stack of contexts that callers extend with [ErrorExt::context] as the error bubbles up.

use std::fmt;
use std::ops::Range;

use itertools::Itertools;

pub type Span = Range<usize>;

/// One-based line and column of a byte offset in a source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineLocation {
    pub line: usize,
    pub column: usize,
}

impl LineLocation {
    /// Locates `offset` in `source`. Offsets past the end point just after the last character.
    pub fn of(source: &str, offset: usize) -> LineLocation {
        let before = source.get(..offset).unwrap_or(source);

        let line = before.matches('\n').count() + 1;

        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };

        LineLocation { line, column }
    }
}

impl fmt::Display for LineLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Error<Context> {
    pub kind: ErrorKind,

    /// Innermost context first.
    pub context: Vec<Context>,
}

impl<C> Error<C> {
    pub fn new<T>(span: Span, ctx: T) -> Error<C>
    where
        T: Into<C>,
    {
        Error {
            kind: ErrorKind::UnexpectedToken { span },
            context: vec![ctx.into()],
        }
    }

    pub fn eos<T>(ctx: T) -> Error<C>
    where
        T: Into<C>,
    {
        Error {
            kind: ErrorKind::EndOfStream,
            context: vec![ctx.into()],
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self.kind {
            ErrorKind::EndOfStream => None,
            ErrorKind::UnexpectedToken { ref span } => Some(span),
        }
    }

    /// Where in `source` the error occurred. End-of-stream errors point past the last character.
    pub fn location(&self, source: &str) -> LineLocation {
        let offset = self.span().map(|span| span.start).unwrap_or(source.len());

        LineLocation::of(source, offset)
    }
}

pub trait ErrorExt<R, C> {
    fn context<T>(self, ctx: T) -> Self
    where
        T: Into<C>;
}

impl<R, C> ErrorExt<R, C> for Result<R, Error<C>> {
    fn context<T>(mut self, ctx: T) -> Self
    where
        T: Into<C>,
    {
        if let Err(ref mut err) = self {
            err.context.push(ctx.into());
        }

        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ErrorKind {
    EndOfStream,
    UnexpectedToken { span: Span },
}

impl<C> fmt::Display for Error<C>
where
    C: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let ctx = self.context.iter().rev().join(": ");

        match self.kind {
            ErrorKind::EndOfStream => write!(f, "{}: unexpected end of input", ctx),
            ErrorKind::UnexpectedToken { ref span } => write!(
                f,
                "{}: unexpected token at {}..{}",
                ctx, span.start, span.end
            ),
        }
    }
}

impl<C> std::error::Error for Error<C> where C: fmt::Debug + fmt::Display {}

/// An iterator that can move its read position back and forth over already produced items.
pub trait SeekStream: Iterator {
    fn offset(&self) -> usize;
    fn seek(&mut self, amount: isize);
    fn seek_boundary(&self) -> Range<isize>;
    fn at_offset(&self, offset: isize) -> Option<&Self::Item>;
}

pub struct BufferedStream<S: Iterator> {
    stream: S,
    position: usize,
    buffer: Vec<S::Item>,
}

impl<S> From<S> for BufferedStream<S>
where
    S: Iterator,
{
    fn from(stream: S) -> BufferedStream<S> {
        BufferedStream {
            stream,
            position: 0,
            buffer: Vec::new(),
        }
    }
}

impl<S> Iterator for BufferedStream<S>
where
    S: Iterator,
    S::Item: Clone,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<S::Item> {
        if let Some(item) = self.buffer.get(self.position) {
            self.position += 1;
            return Some(item.clone());
        }

        let item = self.stream.next()?;

        self.position += 1;
        self.buffer.push(item.clone());

        Some(item)
    }
}

impl<S> SeekStream for BufferedStream<S>
where
    S: Iterator,
    S::Item: Clone,
{
    fn offset(&self) -> usize {
        self.position
    }

    fn seek(&mut self, amount: isize) {
        assert!(self.seek_boundary().contains(&amount));
        self.position = ((self.position as isize) + amount) as usize;
    }

    /// Seeking is limited to the start of the stream and the end of the buffered items.
    fn seek_boundary(&self) -> Range<isize> {
        let backwards = -(self.position as isize);
        let forwards = (self.buffer.len() as isize) - (self.position as isize);

        backwards..forwards + 1
    }

    fn at_offset(&self, offset: isize) -> Option<&Self::Item> {
        if !self.seek_boundary().contains(&offset) {
            return None;
        }

        let index = (self.position as isize) + offset;

        self.buffer.get(index as usize)
    }
}

pub trait Parser<T> {
    type Stream: SeekStream<Item = (T, Span)>;

    fn stream_mut(&mut self) -> &mut Self::Stream;

    /// Returns the token `n` positions ahead without consuming anything.
    fn peek_nth(&mut self, n: usize) -> Option<&T> {
        let stream = self.stream_mut();

        let mut taken = 0;
        while taken <= n && stream.next().is_some() {
            taken += 1;
        }

        stream.seek(-(taken as isize));

        stream.at_offset(n as isize).map(|(token, _)| token)
    }

    fn peek(&mut self) -> Option<&T> {
        self.peek_nth(0)
    }

    /// Runs `op` and rewinds the stream to where it was if `op` fails.
    fn apply<P, O, X>(&mut self, op: P) -> Result<O, Error<X>>
    where
        Self: Sized,
        P: Operation<Self, O, X>,
    {
        let position = self.stream_mut().offset() as isize;

        let result = op.call(self);

        if result.is_err() {
            let stream = self.stream_mut();
            let delta = position - stream.offset() as isize;
            stream.seek(delta);
        }

        result
    }

    fn assert_token<X>(&mut self, token: T) -> Result<(), Error<X>>
    where
        T: PartialEq,
        Self: Sized,
    {
        self.apply(assert_token(token))
    }

    /// Consumes `token` if it is next in the stream.
    fn eat(&mut self, token: T) -> bool
    where
        T: PartialEq,
        Self: Sized,
    {
        self.assert_token::<()>(token).is_ok()
    }
}

pub trait Operation<Parser, Output, Context> {
    fn call(self, parser: &mut Parser) -> Result<Output, Error<Context>>;
}

impl<F, Parser, Output, Context> Operation<Parser, Output, Context> for F
where
    F: FnOnce(&mut Parser) -> Result<Output, Error<Context>>,
{
    fn call(self, parser: &mut Parser) -> Result<Output, Error<Context>> {
        self(parser)
    }
}

fn mismatch<X>(next: Option<Span>) -> Error<X> {
    let kind = match next {
        Some(span) => ErrorKind::UnexpectedToken { span },
        None => ErrorKind::EndOfStream,
    };

    Error {
        kind,
        context: Vec::new(),
    }
}

pub struct AssertToken<T>(T);

impl<P, T, X> Operation<P, (), X> for AssertToken<T>
where
    P: Parser<T>,
    T: PartialEq,
{
    fn call(self, parser: &mut P) -> Result<(), Error<X>> {
        match parser.stream_mut().next() {
            Some((t, _)) if t == self.0 => Ok(()),
            Some((_, span)) => Err(mismatch(Some(span))),
            None => Err(mismatch(None)),
        }
    }
}

pub fn assert_token<T>(token: T) -> AssertToken<T> {
    AssertToken(token)
}
