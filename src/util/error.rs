//! Error types for the UEFormat decoder.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for UEFormat decoding.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of file
    #[error("Invalid UEFormat file: expected UEFORMAT magic bytes, found {0:?}")]
    InvalidMagic(Vec<u8>),

    /// Header identifier names a payload kind we don't know
    #[error("Unknown payload identifier: {0}")]
    UnknownIdentifier(String),

    /// Version byte is unknown or newer than the latest supported version
    #[error("Unsupported UEFormat version: {0}")]
    UnsupportedVersion(u8),

    /// Payload names a codec that isn't registered
    #[error("Unknown compression codec: {0}")]
    UnknownCodec(String),

    /// Decompression failed or produced unexpected output
    #[error("Compression error: {0}")]
    Compression(String),

    /// Read past the end of the current bound
    #[error("Unexpected end of data at position {pos} (wanted {wanted} bytes, {available} available)")]
    UnexpectedEof { pos: usize, wanted: usize, available: usize },

    /// String field is not valid UTF-8
    #[error("Invalid UTF-8 at position {pos}: {source}")]
    Utf8 {
        pos: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    /// Semantic invariant violation
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Failure raised while decoding the body of one section
    #[error("{context} section {section}: {source}")]
    Section {
        context: &'static str,
        section: String,
        #[source]
        source: Box<Error>,
    },

    /// Decode was cancelled at a section boundary
    #[error("Decode cancelled")]
    Cancelled,

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure classes, independent of section nesting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic or unknown payload identifier.
    Format,
    /// Unknown or future version.
    Version,
    /// Unknown codec or failed decompression.
    Compression,
    /// Invalid UTF-8 in a string field.
    Encoding,
    /// Read past the end of the buffer or a chunk.
    Truncated,
    /// Semantic invariant violation.
    Data,
    /// File system failure.
    Io,
    /// Cooperative cancellation.
    Cancelled,
}

impl Error {
    /// Create an invalid data error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create a compression error.
    pub fn compression(msg: impl Into<String>) -> Self {
        Self::Compression(msg.into())
    }

    /// Attribute this error to a section of the given framing context.
    pub fn in_section(self, context: &'static str, section: &str) -> Self {
        Self::Section {
            context,
            section: section.to_string(),
            source: Box::new(self),
        }
    }

    /// Classify the error, looking through section wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagic(_) | Self::UnknownIdentifier(_) => ErrorKind::Format,
            Self::UnsupportedVersion(_) => ErrorKind::Version,
            Self::UnknownCodec(_) | Self::Compression(_) => ErrorKind::Compression,
            Self::Utf8 { .. } => ErrorKind::Encoding,
            Self::UnexpectedEof { .. } => ErrorKind::Truncated,
            Self::InvalidData(_) => ErrorKind::Data,
            Self::Section { source, .. } => source.kind(),
            Self::Cancelled => ErrorKind::Cancelled,
            Self::FileNotFound(_) | Self::MmapFailed(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// The innermost error, with section wrappers removed.
    pub fn root(&self) -> &Error {
        match self {
            Self::Section { source, .. } => source.root(),
            other => other,
        }
    }

    /// Section names from outermost to innermost.
    pub fn section_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Self::Section { section, source, .. } = current {
            path.push(section.as_str());
            current = source;
        }
        path
    }
}

/// Result type alias for UEFormat operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::InvalidMagic(b"NOTMAGIC".to_vec());
        assert!(e.to_string().contains("magic"));

        let e = Error::UnexpectedEof { pos: 12, wanted: 4, available: 1 };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("4"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_sees_through_sections() {
        let err = Error::invalid("index count 5 is not a multiple of 3")
            .in_section("lod", "INDICES")
            .in_section("model", "LODS");

        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(matches!(err.root(), Error::InvalidData(_)));
        assert_eq!(err.section_path(), vec!["LODS", "INDICES"]);
        assert!(err.to_string().contains("LODS"));
    }
}
