use crate::{
    error::ParseError,
    parser::{
        boundary::Boundary,
        event::{Event, EventSink},
    },
};

/// State of the byte-level multipart state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No boundary has been set yet.
    Uninitialized,
    /// Waiting for the first byte of the body.
    Start,
    /// Reading the opening `--boundary\r\n` line.
    StartBoundary,
    /// About to read a header name, or the blank line ending the headers.
    HeaderFieldStart,
    /// Inside a header name.
    HeaderField,
    /// Skipping spaces before a header value.
    HeaderValueStart,
    /// Inside a header value.
    HeaderValue,
    /// Expecting the `\n` that ends a header line.
    HeaderValueAlmostDone,
    /// Expecting the `\n` of the blank line ending the headers.
    HeadersAlmostDone,
    /// About to read the first body byte.
    PartDataStart,
    /// Inside a part body, scanning for the delimiter.
    PartData,
    /// The terminal boundary was read; trailing bytes are ignored.
    End,
    /// An unexpected byte was read. Terminal.
    Error,
}

#[derive(Debug, Clone, Copy, Default)]
struct Flags {
    part_boundary: bool,
    last_boundary: bool,
}

/// Offsets into the current chunk where open spans started.
#[derive(Debug, Clone, Copy, Default)]
struct Marks {
    header_field: Option<usize>,
    header_value: Option<usize>,
    part_data: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum SpanKind {
    HeaderField,
    HeaderValue,
    PartData,
}

/// Everything a single parse session mutates while stepping over bytes.
#[derive(Debug)]
struct Machine {
    boundary: Boundary,
    lookbehind: Box<[u8]>,
    state: ParserState,
    index: usize,
    flags: Flags,
    marks: Marks,
}

impl Machine {
    fn new(boundary: Boundary) -> Self {
        let lookbehind = vec![0u8; boundary.len() + 8].into_boxed_slice();

        Self {
            boundary,
            lookbehind,
            state: ParserState::Start,
            index: 0,
            flags: Flags::default(),
            marks: Marks::default(),
        }
    }

    fn write<S: EventSink>(&mut self, chunk: &[u8], sink: &mut S) -> usize {
        let len = chunk.len();
        let boundary_len = self.boundary.len();
        let mut i = 0;

        while i < len {
            let mut c = chunk[i];

            match self.state {
                ParserState::Uninitialized | ParserState::Error => return i,
                ParserState::Start => {
                    self.index = 0;
                    self.state = ParserState::StartBoundary;
                }
                ParserState::StartBoundary => {
                    // The first delimiter has no leading CRLF but is followed by one.
                    if self.index == boundary_len - 2 {
                        if c != b'\r' {
                            return self.fail(i);
                        }
                        self.index += 1;
                    } else if self.index == boundary_len - 1 {
                        if c != b'\n' {
                            return self.fail(i);
                        }
                        self.index = 0;
                        sink.on_event(Event::PartBegin);
                        self.state = ParserState::HeaderFieldStart;
                    } else {
                        if c != self.boundary.as_bytes()[self.index + 2] {
                            return self.fail(i);
                        }
                        self.index += 1;
                    }
                    i += 1;
                }
                ParserState::HeaderFieldStart => {
                    self.state = ParserState::HeaderField;
                    self.marks.header_field = Some(i);
                    self.index = 0;
                }
                ParserState::HeaderField => {
                    if c == b'\r' {
                        if self.index > 0 {
                            return self.fail(i);
                        }
                        self.marks.header_field = None;
                        self.state = ParserState::HeadersAlmostDone;
                    } else {
                        self.index += 1;
                        if c == b':' {
                            if self.index == 1 {
                                return self.fail(i);
                            }
                            close_span(&mut self.marks, SpanKind::HeaderField, chunk, i, sink);
                            self.state = ParserState::HeaderValueStart;
                        } else if c != b'-' && !c.is_ascii_alphabetic() {
                            return self.fail(i);
                        }
                    }
                    i += 1;
                }
                ParserState::HeaderValueStart => {
                    if c == b' ' {
                        i += 1;
                    } else {
                        self.marks.header_value = Some(i);
                        self.state = ParserState::HeaderValue;
                    }
                }
                ParserState::HeaderValue => {
                    if c == b'\r' {
                        close_span(&mut self.marks, SpanKind::HeaderValue, chunk, i, sink);
                        sink.on_event(Event::HeaderEnd);
                        self.state = ParserState::HeaderValueAlmostDone;
                    }
                    i += 1;
                }
                ParserState::HeaderValueAlmostDone => {
                    if c != b'\n' {
                        return self.fail(i);
                    }
                    self.state = ParserState::HeaderFieldStart;
                    i += 1;
                }
                ParserState::HeadersAlmostDone => {
                    if c != b'\n' {
                        return self.fail(i);
                    }
                    sink.on_event(Event::HeadersEnd);
                    self.state = ParserState::PartDataStart;
                    i += 1;
                }
                ParserState::PartDataStart => {
                    self.state = ParserState::PartData;
                    self.marks.part_data = Some(i);
                }
                ParserState::PartData => {
                    let prev_index = self.index;

                    if self.index == 0 {
                        // Any delimiter starting in [i, i + boundary_len) covers the probed byte.
                        while i + boundary_len <= len
                            && !self.boundary.contains(chunk[i + boundary_len - 1])
                        {
                            i += boundary_len;
                        }
                        if i == len {
                            break;
                        }
                        c = chunk[i];
                    }

                    if self.index < boundary_len {
                        if self.boundary.as_bytes()[self.index] == c {
                            if self.index == 0 {
                                close_span(&mut self.marks, SpanKind::PartData, chunk, i, sink);
                            }
                            self.index += 1;
                        } else {
                            self.reset_match();
                        }
                    } else if self.index == boundary_len {
                        self.index += 1;
                        match c {
                            b'\r' => self.flags.part_boundary = true,
                            b'-' => self.flags.last_boundary = true,
                            _ => self.reset_match(),
                        }
                    } else if self.flags.part_boundary && c == b'\n' {
                        self.reset_match();
                        sink.on_event(Event::PartEnd);
                        sink.on_event(Event::PartBegin);
                        self.state = ParserState::HeaderFieldStart;
                        i += 1;
                        continue;
                    } else if self.flags.last_boundary && c == b'-' {
                        sink.on_event(Event::PartEnd);
                        sink.on_event(Event::End);
                        self.state = ParserState::End;
                    } else {
                        self.reset_match();
                    }

                    if self.index > 0 {
                        self.lookbehind[self.index - 1] = c;
                    } else if prev_index > 0 {
                        // The held bytes were body data after all.
                        emit_span(SpanKind::PartData, &self.lookbehind[..prev_index], sink);
                        self.marks.part_data = Some(i);
                        // Re-examine the current byte as a possible delimiter start.
                        continue;
                    }

                    i += 1;
                }
                ParserState::End => {
                    i = len;
                }
            }
        }

        flush_span(&mut self.marks, SpanKind::HeaderField, chunk, sink);
        flush_span(&mut self.marks, SpanKind::HeaderValue, chunk, sink);
        flush_span(&mut self.marks, SpanKind::PartData, chunk, sink);

        len
    }

    fn reset_match(&mut self) {
        self.index = 0;
        self.flags = Flags::default();
    }

    fn fail(&mut self, offset: usize) -> usize {
        #[cfg(feature = "tracing")]
        tracing::debug!(offset, state = ?self.state, "parser: unexpected byte");

        self.state = ParserState::Error;
        offset
    }
}

fn mark_of(marks: &mut Marks, kind: SpanKind) -> &mut Option<usize> {
    match kind {
        SpanKind::HeaderField => &mut marks.header_field,
        SpanKind::HeaderValue => &mut marks.header_value,
        SpanKind::PartData => &mut marks.part_data,
    }
}

/// Emits an explicitly terminated span and drops its mark.
fn close_span<S: EventSink>(marks: &mut Marks, kind: SpanKind, chunk: &[u8], end: usize, sink: &mut S) {
    if let Some(start) = mark_of(marks, kind).take() {
        emit_span(kind, &chunk[start..end], sink);
    }
}

/// Emits whatever an open span holds at the end of a chunk; the span resumes at
/// offset 0 of the next chunk.
fn flush_span<S: EventSink>(marks: &mut Marks, kind: SpanKind, chunk: &[u8], sink: &mut S) {
    let mark = mark_of(marks, kind);
    if let Some(start) = *mark {
        emit_span(kind, &chunk[start..], sink);
        *mark = Some(0);
    }
}

fn emit_span<S: EventSink>(kind: SpanKind, span: &[u8], sink: &mut S) {
    if span.is_empty() {
        return;
    }

    let event = match kind {
        SpanKind::HeaderField => Event::HeaderField(span),
        SpanKind::HeaderValue => Event::HeaderValue(span),
        SpanKind::PartData => Event::PartData(span),
    };
    sink.on_event(event);
}

/// Incremental multipart/form-data parser.
///
/// The parser is push-driven: each call to [`Parser::write`] steps the state
/// machine over one chunk and reports what it saw to the sink. Chunks may be
/// split at any byte, including inside a delimiter; the only state carried
/// between calls is a lookbehind buffer of `boundary.len() + 8` bytes.
#[derive(Debug)]
pub struct Parser<S> {
    machine: Option<Machine>,
    sink: S,
}

impl<S> Parser<S> {
    /// Creates a parser with no boundary. Writes are rejected until
    /// [`Parser::initialize`] is called.
    pub fn new(sink: S) -> Self {
        Self {
            machine: None,
            sink,
        }
    }

    /// Creates a parser ready to read a body delimited by `boundary`.
    pub fn with_boundary(boundary: &str, sink: S) -> Self {
        let mut parser = Self::new(sink);
        parser.initialize(boundary);
        parser
    }

    /// Sets the boundary token and starts a fresh session.
    pub fn initialize(&mut self, boundary: &str) {
        self.machine = Some(Machine::new(Boundary::new(boundary)));
    }

    /// Returns the current state.
    pub fn state(&self) -> ParserState {
        self.machine
            .as_ref()
            .map_or(ParserState::Uninitialized, |machine| machine.state)
    }

    /// Returns the event sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Returns the event sink mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the parser and returns its sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: EventSink> Parser<S> {
    /// Steps the state machine over `chunk`.
    ///
    /// Returns `chunk.len()` on success. A smaller value is the offset of the
    /// first byte that violates the multipart grammar; the parser is then in
    /// [`ParserState::Error`] and must not be written to again.
    pub fn write(&mut self, chunk: &[u8]) -> usize {
        match self.machine.as_mut() {
            Some(machine) => machine.write(chunk, &mut self.sink),
            None => 0,
        }
    }

    /// Steps the state machine over `chunk`, reporting a short read as an
    /// error.
    ///
    /// Fails with [`ParseError::Uninitialized`] before a boundary was set.
    /// A parser already in [`ParserState::Error`] rejects every chunk at
    /// offset 0.
    pub fn try_write(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let length = chunk.len();
        let Some(machine) = self.machine.as_mut() else {
            return Err(ParseError::Uninitialized);
        };

        let consumed = machine.write(chunk, &mut self.sink);
        if consumed != length {
            return Err(ParseError::Rejected {
                offset: consumed,
                length,
            });
        }

        Ok(())
    }
}
