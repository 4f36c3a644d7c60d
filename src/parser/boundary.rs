use http::{header, HeaderMap};

use crate::error::NotMultipartError;

const MULTIPART: &[u8] = b"multipart";
const BOUNDARY_PARAM: &[u8] = b"boundary=";

/// Extracts the `boundary` token from a `Content-Type` header value.
///
/// The value must start with `multipart` (any case). The token may be quoted,
/// in which case it runs to the closing quote, or bare, in which case it runs
/// to the next `;`, `,` or the end of the value.
pub fn extract_boundary(content_type: Option<&str>) -> Result<String, NotMultipartError> {
    let value = content_type.ok_or(NotMultipartError::MissingContentType)?;
    let raw = value.trim_start().as_bytes();

    let is_multipart = raw
        .get(..MULTIPART.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(MULTIPART));
    if !is_multipart {
        return Err(NotMultipartError::NotMultipart);
    }

    let start = find_boundary_param(raw).ok_or(NotMultipartError::MissingBoundary)?;
    let rest = &raw[start..];

    let token = match rest.strip_prefix(b"\"") {
        Some(quoted) => {
            let end = quoted
                .iter()
                .position(|&b| b == b'"')
                .ok_or(NotMultipartError::MissingBoundary)?;
            &quoted[..end]
        }
        None => {
            let end = rest
                .iter()
                .position(|&b| b == b';' || b == b',')
                .unwrap_or(rest.len());
            let token = &rest[..end];
            let trimmed = token
                .iter()
                .rposition(|b| !b.is_ascii_whitespace())
                .map_or(0, |last| last + 1);
            &token[..trimmed]
        }
    };

    if token.is_empty() {
        return Err(NotMultipartError::MissingBoundary);
    }

    // Slicing only happened at ASCII delimiters, so the token stays valid UTF-8.
    String::from_utf8(token.to_vec()).map_err(|_| NotMultipartError::MissingBoundary)
}

/// Extracts the boundary from the `Content-Type` entry of a header map.
pub fn extract_boundary_from_headers(headers: &HeaderMap) -> Result<String, NotMultipartError> {
    let value = headers
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().map_err(|_| NotMultipartError::NotMultipart))
        .transpose()?;

    extract_boundary(value)
}

/// Returns the offset just past a `boundary=` parameter name.
fn find_boundary_param(raw: &[u8]) -> Option<usize> {
    let last = raw.len().checked_sub(BOUNDARY_PARAM.len())?;

    (0..=last)
        .filter(|&at| at == 0 || matches!(raw[at - 1], b';' | b' ' | b'\t'))
        .find(|&at| raw[at..at + BOUNDARY_PARAM.len()].eq_ignore_ascii_case(BOUNDARY_PARAM))
        .map(|at| at + BOUNDARY_PARAM.len())
}

/// Delimiter that separates parts, `"\r\n--" + token`.
#[derive(Debug, Clone)]
pub(crate) struct Boundary {
    delimiter: Box<[u8]>,
    members: [bool; 256],
}

impl Boundary {
    pub(crate) fn new(token: &str) -> Self {
        let delimiter: Box<[u8]> = [b"\r\n--".as_slice(), token.as_bytes()].concat().into();

        let mut members = [false; 256];
        for &byte in delimiter.iter() {
            members[usize::from(byte)] = true;
        }

        Self { delimiter, members }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.delimiter
    }

    pub(crate) fn len(&self) -> usize {
        self.delimiter.len()
    }

    /// Whether `byte` occurs anywhere in the delimiter.
    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.members[usize::from(byte)]
    }
}
