use std::collections::HashMap;

use crate::{
    error::ParseError,
    parser::{Event, EventSink, Parser, ParserState},
    part::Part,
};

/// Receiver for assembled parts and their streamed bodies.
///
/// Calls arrive in byte-stream order: `on_part` once the headers of a part
/// are complete, `on_data` zero or more times with consecutive body bytes,
/// then `on_part_end`. At most one part is open at a time.
pub trait PartSink {
    /// Called when the headers of a new part are complete.
    fn on_part(&mut self, _part: &Part) {}

    /// Called with the next run of body bytes of the open part.
    fn on_data(&mut self, part: &Part, data: &[u8]);

    /// Called after the last body byte of a part.
    fn on_part_end(&mut self, _part: &Part) {}
}

/// Turns low-level parser events into [`Part`] records.
#[derive(Debug)]
struct Assembler<H> {
    handler: H,
    part: Option<Part>,
    header_field: Vec<u8>,
    header_value: Vec<u8>,
    parts: HashMap<String, Part>,
    ended: bool,
}

impl<H> Assembler<H> {
    fn new(handler: H) -> Self {
        Self {
            handler,
            part: None,
            header_field: Vec::new(),
            header_value: Vec::new(),
            parts: HashMap::new(),
            ended: false,
        }
    }

    fn commit_header(&mut self) {
        let name = String::from_utf8_lossy(&self.header_field).to_ascii_lowercase();
        let value = String::from_utf8_lossy(&self.header_value).into_owned();
        self.header_field.clear();
        self.header_value.clear();

        if let Some(part) = self.part.as_mut() {
            part.push_header(name, value);
        }
    }
}

impl<H: PartSink> EventSink for Assembler<H> {
    fn on_event(&mut self, event: Event<'_>) {
        match event {
            Event::PartBegin => {
                self.part = Some(Part::new());
                self.header_field.clear();
                self.header_value.clear();
            }
            Event::HeaderField(span) => self.header_field.extend_from_slice(span),
            Event::HeaderValue(span) => self.header_value.extend_from_slice(span),
            Event::HeaderEnd => self.commit_header(),
            Event::HeadersEnd => {
                if let Some(part) = self.part.as_ref() {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        name = %part.name,
                        filename = ?part.filename,
                        "reader: part headers complete"
                    );

                    self.handler.on_part(part);
                }
            }
            Event::PartData(span) => {
                if let Some(part) = self.part.as_ref() {
                    self.handler.on_data(part, span);
                }
            }
            Event::PartEnd => {
                if let Some(mut part) = self.part.take() {
                    part.ended = true;

                    #[cfg(feature = "tracing")]
                    tracing::trace!(name = %part.name, "reader: part finished");

                    self.handler.on_part_end(&part);
                    self.parts.insert(part.name.clone(), part);
                }
            }
            Event::End => {
                #[cfg(feature = "tracing")]
                tracing::trace!(parts = self.parts.len(), "reader: terminal boundary");

                self.ended = true;
            }
        }
    }
}

/// One multipart parse session.
///
/// Owns the byte-level [`Parser`], the part currently being read and every
/// finished part keyed by name. A later part with an already seen name
/// replaces the earlier record.
#[derive(Debug)]
pub struct Reader<H> {
    parser: Parser<Assembler<H>>,
}

impl<H: PartSink> Reader<H> {
    /// Creates a session for a body delimited by `boundary`.
    pub fn new(boundary: &str, handler: H) -> Self {
        Self {
            parser: Parser::with_boundary(boundary, Assembler::new(handler)),
        }
    }

    /// Pushes the next chunk of the body.
    ///
    /// Any error is final: the session stays failed and later writes are
    /// rejected at offset 0.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let result = self.parser.try_write(chunk);

        #[cfg(feature = "tracing")]
        if let Err(err) = &result {
            tracing::debug!(error = %err, "reader: parser rejected chunk");
        }

        result
    }
}

impl<H> Reader<H> {
    /// Returns `true` once the terminal boundary was read.
    pub fn ended(&self) -> bool {
        self.parser.sink().ended
    }

    /// Returns the state of the underlying parser.
    pub fn state(&self) -> ParserState {
        self.parser.state()
    }

    /// Returns the part whose headers or body are currently being read.
    pub fn current_part(&self) -> Option<&Part> {
        self.parser.sink().part.as_ref()
    }

    /// Returns the finished parts keyed by name.
    pub fn parts(&self) -> &HashMap<String, Part> {
        &self.parser.sink().parts
    }

    /// Returns the part handler.
    pub fn handler(&self) -> &H {
        &self.parser.sink().handler
    }

    /// Returns the part handler mutably.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.parser.sink_mut().handler
    }

    /// Consumes the session, returning the handler and the finished parts.
    pub fn into_parts(self) -> (H, HashMap<String, Part>) {
        let assembler = self.parser.into_sink();
        (assembler.handler, assembler.parts)
    }
}
