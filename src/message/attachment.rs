use std::{io, path::Path, sync::Arc};

/// Content type used when none is given.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file attached to a message.
///
/// The content is shared, cloning an attachment (as composing a message does)
/// does not copy it. It is released once the last clone is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    content_type: String,
    content: Arc<[u8]>,
}

impl Attachment {
    /// An attachment named `filename`, sent as `application/octet-stream`.
    #[must_use]
    pub fn new(filename: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
            content: content.into(),
        }
    }

    /// Read an attachment from disk, named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "attachment path has no file name")
            })?;
        let content = std::fs::read(path)?;
        Ok(Self::new(filename, content))
    }

    /// Set the MIME type, e.g. `"text/csv"`. Checked by the transport, not here.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.content.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
