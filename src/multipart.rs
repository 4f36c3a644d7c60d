use std::{collections::HashMap, io::Read};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::{
    config::Config,
    error::{ConfigError, MultipartError, NotMultipartError},
    parser::extract_boundary,
    part::Part,
    reader::{PartSink, Reader},
};

/// A finished part together with its buffered body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedPart {
    /// Part metadata.
    pub part: Part,
    /// Complete body bytes.
    pub data: Bytes,
}

impl BufferedPart {
    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.data)
    }
}

/// Every part of a multipart body, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    parts: HashMap<String, BufferedPart>,
}

impl FormData {
    /// Returns the part with the given field name.
    pub fn get(&self, name: &str) -> Option<&BufferedPart> {
        self.parts.get(name)
    }

    /// Returns the number of distinct field names.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` when the body held no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Iterates over `(name, part)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BufferedPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    /// Returns the underlying map.
    pub fn into_inner(self) -> HashMap<String, BufferedPart> {
        self.parts
    }
}

/// Buffers each part body in memory.
///
/// Only bodies are kept here; part metadata stays in the reader's own index
/// and the two are joined by name once the body is complete.
#[derive(Debug, Default)]
struct Collector {
    body: BytesMut,
    bodies: HashMap<String, Bytes>,
}

impl PartSink for Collector {
    fn on_part(&mut self, _part: &Part) {
        self.body.clear();
    }

    fn on_data(&mut self, _part: &Part, data: &[u8]) {
        self.body.extend_from_slice(data);
    }

    fn on_part_end(&mut self, part: &Part) {
        let data = self.body.split().freeze();
        self.bodies.insert(part.name.clone(), data);
    }
}

/// Buffering multipart driver.
///
/// Feeds a [`Reader`] from a byte source and collects every part with its
/// body. A body that stops before the terminal boundary is an error; no
/// partial form is returned.
#[derive(Debug)]
pub struct Multipart {
    reader: Reader<Collector>,
    config: Config,
}

impl Multipart {
    /// Creates a driver for a known boundary token.
    pub fn new(boundary: &str) -> Self {
        Self {
            reader: Reader::new(boundary, Collector::default()),
            config: Config::default(),
        }
    }

    /// Creates a driver from a request `Content-Type` value.
    pub fn from_content_type(content_type: &str) -> Result<Self, NotMultipartError> {
        let boundary = extract_boundary(Some(content_type))?;
        Ok(Self::new(&boundary))
    }

    /// Creates a driver with explicit validated configuration.
    pub fn with_config(boundary: &str, config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            reader: Reader::new(boundary, Collector::default()),
            config,
        })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pushes one chunk of the body.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), MultipartError> {
        self.reader.write(chunk).map_err(MultipartError::from)
    }

    /// Returns `true` once the terminal boundary was read.
    pub fn is_finished(&self) -> bool {
        self.reader.ended()
    }

    /// Returns the collected form, or an error if the body was cut short.
    pub fn finish(self) -> Result<FormData, MultipartError> {
        if !self.reader.ended() {
            #[cfg(feature = "tracing")]
            tracing::debug!(state = ?self.reader.state(), "multipart: body ended early");

            return Err(MultipartError::IncompleteStream);
        }

        let (mut collector, parts) = self.reader.into_parts();
        let parts = parts
            .into_iter()
            .map(|(name, part)| {
                let data = collector.bodies.remove(&name).unwrap_or_default();
                (name, BufferedPart { part, data })
            })
            .collect();

        Ok(FormData { parts })
    }

    /// Reads `reader` to the end in `chunk_size` pieces and collects the form.
    pub fn read_from<R: Read>(mut self, mut reader: R) -> Result<FormData, MultipartError> {
        let mut buf = vec![0u8; self.config.chunk_size];

        loop {
            let read = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            self.write(&buf[..read])?;
        }

        self.finish()
    }

    /// Drains a chunk stream and collects the form.
    pub async fn read_stream<S, E>(mut self, mut stream: S) -> Result<FormData, MultipartError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| MultipartError::Stream(err.into()))?;
            self.write(&chunk)?;
        }

        self.finish()
    }

    /// Reads an async byte source to the end in `chunk_size` pieces and
    /// collects the form.
    pub async fn read_async<R>(mut self, reader: R) -> Result<FormData, MultipartError>
    where
        R: AsyncRead + Unpin,
    {
        let mut chunks = ReaderStream::with_capacity(reader, self.config.chunk_size);

        while let Some(chunk) = chunks.next().await {
            self.write(&chunk?)?;
        }

        self.finish()
    }
}
