/// Low-level notification emitted by [`Parser`](super::Parser).
///
/// Span events borrow either the chunk currently being written or the
/// parser's lookbehind buffer; the slice is only valid for the duration of
/// the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A boundary was crossed and a new part starts.
    PartBegin,
    /// A fragment of the current header name.
    HeaderField(&'a [u8]),
    /// A fragment of the current header value.
    HeaderValue(&'a [u8]),
    /// The current header line is complete.
    HeaderEnd,
    /// The blank line ending the header block was read.
    HeadersEnd,
    /// A fragment of the current part body.
    PartData(&'a [u8]),
    /// The current part body is complete.
    PartEnd,
    /// The terminal boundary was read.
    End,
}

/// Receiver for parser events.
///
/// Events are delivered synchronously, in byte-stream order, from inside
/// [`Parser::write`](super::Parser::write).
pub trait EventSink {
    /// Handles one parser event.
    fn on_event(&mut self, event: Event<'_>);
}

impl<F> EventSink for F
where
    F: FnMut(Event<'_>),
{
    fn on_event(&mut self, event: Event<'_>) {
        self(event)
    }
}
