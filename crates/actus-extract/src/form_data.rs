//! Flat, ordered form submissions.
//!
//! [`FormData`] keeps every submitted entry in order, including repeated
//! keys, exactly as a browser sends them. Nesting is applied later by the
//! [`decode`](crate::decode) module.

use crate::error::ExtractionError;
use bytes::Bytes;

/// An uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Client-side file name.
    pub name: String,
    /// MIME type as sent by the client.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl FileEntry {
    /// Creates a file entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// File size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// One submitted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    /// A text field.
    Text(String),
    /// A file field.
    File(FileEntry),
}

impl FormValue {
    /// Returns the text, if this is a text field.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    /// Returns the file, if this is a file field.
    #[must_use]
    pub fn as_file(&self) -> Option<&FileEntry> {
        match self {
            Self::Text(_) => None,
            Self::File(file) => Some(file),
        }
    }
}

impl From<&str> for FormValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for FormValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<FileEntry> for FormValue {
    fn from(file: FileEntry) -> Self {
        Self::File(file)
    }
}

/// Ordered form entries.
///
/// # Example
///
/// ```
/// use actus_extract::FormData;
///
/// let form = FormData::parse_urlencoded(b"tag=a&tag=b&name=hello+world").unwrap();
/// assert_eq!(form.text("name"), Some("hello world"));
/// assert_eq!(form.get_all("tag").count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` body.
    pub fn parse_urlencoded(body: &[u8]) -> Result<Self, ExtractionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|e| ExtractionError::deserialization_failed(e.to_string()))?;
        Ok(pairs.into_iter().collect())
    }

    /// Appends an entry, keeping earlier entries with the same name.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Builder-style [`append`](Self::append).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.append(name, value);
        self
    }

    /// First value submitted under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// First text value submitted under `name`.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FormValue::as_text)
    }

    /// Every value submitted under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.entries
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// All entries in submission order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was submitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<FormValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
