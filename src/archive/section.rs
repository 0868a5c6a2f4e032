//! Section framing shared by every entity decoder.
//!
//! ```text
//! Section := Name:String ElementCount:i32 ByteSize:i32 Body[ByteSize]
//! ```
//!
//! `ByteSize` is authoritative. After a body is handed to its decoder the
//! cursor is always repositioned to the end of the declared body, so an
//! unknown section or a decoder that reads too little can't desynchronize
//! the stream, and the decoder only ever sees its own body.

use std::fmt::Debug;

use super::ArchiveReader;
use crate::core::CancelToken;
use crate::util::{Error, Result};

/// The `(name, element count, byte size)` triple preceding each body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    pub name: String,
    pub element_count: usize,
    pub byte_size: usize,
}

impl SectionHeader {
    /// Read a section header. Negative counts or sizes are invalid data.
    pub fn read(reader: &mut ArchiveReader) -> Result<Self> {
        let name = reader.read_fstring()?;
        let element_count = reader.read_count()?;
        let byte_size = reader.read_count()?;
        Ok(Self { name, element_count, byte_size })
    }
}

/// Closed set of section names recognized in one framing context.
pub trait SectionKind: Copy + Debug {
    /// Context name used in logs and error attribution.
    const CONTEXT: &'static str;

    /// Look up a recognized section. `None` means the body is skipped.
    fn from_name(name: &str) -> Option<Self>;
}

/// Iterate sections until `reader` is exhausted, dispatching recognized
/// ones to `decode` with a reader bounded to the section body.
///
/// End of data is only accepted at a section header boundary; a header or
/// body cut short fails with `UnexpectedEof`. Errors from `decode` are
/// attributed to the section they came from.
pub fn read_sections<K, F>(
    reader: &mut ArchiveReader,
    cancel: Option<&CancelToken>,
    mut decode: F,
) -> Result<()>
where
    K: SectionKind,
    F: FnMut(K, &SectionHeader, &mut ArchiveReader) -> Result<()>,
{
    while !reader.is_eof() {
        if let Some(token) = cancel {
            token.check()?;
        }

        let header = SectionHeader::read(reader)?;
        let body_start = reader.position();
        tracing::trace!(
            context = K::CONTEXT,
            section = %header.name,
            count = header.element_count,
            size = header.byte_size,
            offset = body_start,
            "section"
        );

        let mut body = reader
            .chunk(header.byte_size)
            .map_err(|e| e.in_section(K::CONTEXT, &header.name))?;

        match K::from_name(&header.name) {
            Some(kind) => {
                decode(kind, &header, &mut body).map_err(|e| e.in_section(K::CONTEXT, &header.name))?;
                if !body.is_eof() {
                    tracing::trace!(
                        context = K::CONTEXT,
                        section = %header.name,
                        unread = body.remaining(),
                        "section body not fully consumed"
                    );
                }
            }
            None => {
                tracing::debug!(context = K::CONTEXT, section = %header.name, size = header.byte_size, "skipping unknown section");
            }
        }

        // Resync on the declared size, whatever the decoder consumed.
        reader.seek(body_start + header.byte_size)?;
    }
    Ok(())
}

/// Check that a decoder consumed exactly the declared body.
///
/// Used by sections whose element stride is fixed by the layout, where a
/// mismatch means the stride or the declared size is wrong.
pub fn expect_consumed(body: &ArchiveReader, header: &SectionHeader) -> Result<()> {
    let consumed = body.position();
    if consumed != header.byte_size {
        return Err(Error::invalid(format!(
            "{} elements consumed {} bytes but section declares {}",
            header.element_count, consumed, header.byte_size
        )));
    }
    Ok(())
}
