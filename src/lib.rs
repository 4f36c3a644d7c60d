#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Incremental `multipart/form-data` parsing.
//!
//! [`Parser`] is a byte-level state machine fed one chunk at a time. It never
//! buffers a part body; it reports header and body spans to an
//! [`EventSink`] as soon as it has classified them, holding back only the
//! few bytes that might still turn out to be a delimiter. [`Reader`] builds
//! [`Part`] records on top of those events and streams bodies to a
//! [`PartSink`]. [`Multipart`] drives a reader from a blocking, async or
//! stream source and buffers everything into a [`FormData`].
//!
//! ```
//! use formwire::{extract_boundary, Multipart};
//!
//! let boundary = extract_boundary(Some("multipart/form-data; boundary=AaB03x"))?;
//! let mut multipart = Multipart::new(&boundary);
//! multipart.write(b"--AaB03x\r\ncontent-disposition: form-data; name=\"a\"\r\n\r\n")?;
//! multipart.write(b"1\r\n--AaB03x--")?;
//!
//! let form = multipart.finish()?;
//! assert_eq!(form.get("a").map(|part| &part.data[..]), Some(&b"1"[..]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Driver configuration.
pub mod config;
/// Error types exposed by this crate.
pub mod error;
/// Buffering multipart driver.
pub mod multipart;
/// Low-level parser components.
pub mod parser;
/// Parsed part metadata.
pub mod part;
/// Part assembly on top of parser events.
pub mod reader;

pub use config::Config;
pub use error::{ConfigError, MultipartError, NotMultipartError, ParseError};
pub use multipart::{BufferedPart, FormData, Multipart};
pub use parser::{
    extract_boundary, extract_boundary_from_headers, Event, EventSink, Parser, ParserState,
};
pub use part::Part;
pub use reader::{PartSink, Reader};
