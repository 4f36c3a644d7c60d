use std::collections::HashMap;

use crate::parser::headers::{disposition_param, strip_windows_path};

const CONTENT_DISPOSITION: &str = "content-disposition";
const CONTENT_TYPE: &str = "content-type";

/// Metadata of one multipart part.
///
/// Headers are complete once the part is handed to
/// [`PartSink::on_part`](crate::PartSink::on_part); body bytes are never
/// stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    /// Field name from the `Content-Disposition` `name` parameter. Empty when
    /// the part carried none.
    pub name: String,
    /// File name from the `filename` parameter, without any Windows directory.
    pub filename: Option<String>,
    /// Raw `Content-Type` value of the part.
    pub mime: Option<String>,
    /// Part headers keyed by lower-cased name.
    pub headers: HashMap<String, String>,
    /// Whether the closing delimiter of this part was read.
    pub ended: bool,
}

impl Part {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records one complete header line and derives metadata from it.
    pub(crate) fn push_header(&mut self, name: String, value: String) {
        match name.as_str() {
            CONTENT_DISPOSITION => {
                if let Some(field) = disposition_param(&value, "name") {
                    self.name = field.to_owned();
                }
                if let Some(filename) = disposition_param(&value, "filename") {
                    self.filename = Some(strip_windows_path(filename).to_owned());
                }
            }
            CONTENT_TYPE => self.mime = Some(value.clone()),
            _ => {}
        }

        self.headers.insert(name, value);
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parses the part `Content-Type`, if present and well formed.
    pub fn mime_type(&self) -> Option<mime::Mime> {
        self.mime.as_deref()?.trim().parse().ok()
    }

    /// Returns `true` when the part carries a file name.
    pub fn is_file(&self) -> bool {
        self.filename.is_some()
    }
}
