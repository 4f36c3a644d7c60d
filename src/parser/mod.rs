/// Multipart boundary extraction.
pub mod boundary;
/// Parser event model.
pub mod event;
/// Part header attribute helpers.
pub mod headers;
/// Byte-level multipart state machine.
pub mod machine;

pub use boundary::{extract_boundary, extract_boundary_from_headers};
pub use event::{Event, EventSink};
pub use headers::{disposition_param, strip_windows_path};
pub use machine::{Parser, ParserState};
