//! Sequential little-endian cursor over a [`Buffer`].

use byteorder::{ByteOrder, LittleEndian};

use super::Buffer;
use crate::util::{Error, Result};

/// Upper bound on the memory reserved ahead of decoding a counted array.
const MAX_PREALLOC_BYTES: usize = 1 << 20;

/// Positional reader over a bounded range of a shared buffer.
///
/// Positions are local: `0` is the start of this reader's range and
/// [`ArchiveReader::is_eof`] is relative to its own end, so a chunk never
/// sees its parent's bytes. Cloning is cheap and gives an independent
/// cursor over the same range.
#[derive(Clone)]
pub struct ArchiveReader {
    buf: Buffer,
    start: usize,
    end: usize,
    /// Absolute position in `buf`.
    pos: usize,
}

impl ArchiveReader {
    /// Create a reader over a whole buffer.
    pub fn new(buf: impl Into<Buffer>) -> Self {
        let buf = buf.into();
        let end = buf.len();
        Self { buf, start: 0, end, pos: 0 }
    }

    /// Length of this reader's range.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if this reader's range is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Current position relative to the start of the range.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos - self.start
    }

    /// Bytes left before the end of the range.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    /// Check if the cursor has reached the end of its range.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Offset of this reader's range within the underlying buffer.
    #[inline]
    pub fn buffer_offset(&self) -> usize {
        self.start
    }

    /// Peek at the unread bytes without moving the cursor.
    pub fn peek(&self, len: usize) -> Option<&[u8]> {
        (len <= self.remaining()).then(|| &self.buf[self.pos..self.pos + len])
    }

    fn eof(&self, wanted: usize) -> Error {
        Error::UnexpectedEof {
            pos: self.position(),
            wanted,
            available: self.remaining(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&[u8]> {
        if len > self.remaining() {
            return Err(self.eof(len));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..start + len])
    }

    /// Fail early if `count` elements of `width` bytes can't fit in the rest
    /// of the range, so corrupt counts never drive large allocations.
    fn ensure(&self, count: usize, width: usize) -> Result<usize> {
        let len = count
            .checked_mul(width)
            .ok_or_else(|| Error::invalid(format!("element count {} overflows", count)))?;
        if len > self.remaining() {
            return Err(self.eof(len));
        }
        Ok(len)
    }

    // ------------------------------------------------------------------
    // Positioning
    // ------------------------------------------------------------------

    /// Move the cursor to a local position. Seeking to the very end is allowed.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.len() {
            return Err(Error::UnexpectedEof {
                pos,
                wanted: 0,
                available: self.len(),
            });
        }
        self.pos = self.start + pos;
        Ok(())
    }

    /// Split off the next `len` bytes as an independent reader and advance
    /// past them.
    pub fn chunk(&mut self, len: usize) -> Result<ArchiveReader> {
        if len > self.remaining() {
            return Err(self.eof(len));
        }
        let child = ArchiveReader {
            buf: self.buf.clone(),
            start: self.pos,
            end: self.pos + len,
            pos: self.pos,
        };
        self.pos += len;
        Ok(child)
    }

    // ------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------

    /// Borrow the next `len` bytes.
    pub fn read_slice(&mut self, len: usize) -> Result<&[u8]> {
        self.take(len)
    }

    /// Copy the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }

    /// Copy everything up to the end of the range.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>> {
        let len = self.remaining();
        self.read_bytes(len)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// One byte, nonzero is true.
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.take(4)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.take(4)?))
    }

    /// A non-negative `i32` count.
    pub fn read_count(&mut self) -> Result<usize> {
        let pos = self.position();
        let count = self.read_i32()?;
        usize::try_from(count)
            .map_err(|_| Error::invalid(format!("negative count {} at position {}", count, pos)))
    }

    // ------------------------------------------------------------------
    // Strings
    // ------------------------------------------------------------------

    /// Exactly `len` bytes decoded as UTF-8.
    pub fn read_string(&mut self, len: usize) -> Result<String> {
        let pos = self.position();
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|source| Error::Utf8 { pos, source })
    }

    /// `i32` length followed by that many UTF-8 bytes, no terminator.
    pub fn read_fstring(&mut self) -> Result<String> {
        let len = self.read_count()?;
        self.read_string(len)
    }

    // ------------------------------------------------------------------
    // Bulk
    // ------------------------------------------------------------------

    /// `count` contiguous floats. A zero count reads nothing.
    pub fn read_f32_vec(&mut self, count: usize) -> Result<Vec<f32>> {
        let len = self.ensure(count, 4)?;
        let mut out = vec![0.0f32; count];
        LittleEndian::read_f32_into(self.take(len)?, &mut out);
        Ok(out)
    }

    /// `count` contiguous `i32`s. A zero count reads nothing.
    pub fn read_i32_vec(&mut self, count: usize) -> Result<Vec<i32>> {
        let len = self.ensure(count, 4)?;
        let mut out = vec![0i32; count];
        LittleEndian::read_i32_into(self.take(len)?, &mut out);
        Ok(out)
    }

    /// Fixed-size float array.
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0.0f32; N];
        LittleEndian::read_f32_into(self.take(N * 4)?, &mut out);
        Ok(out)
    }

    /// Run `decode` `count` times against this reader, collecting results in
    /// order. Elements may have different encoded lengths.
    pub fn read_array<T, F>(&mut self, count: usize, mut decode: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let mut out = Vec::with_capacity(self.reserve_hint::<T>(count));
        for _ in 0..count {
            out.push(decode(self)?);
        }
        Ok(out)
    }

    /// Elements to reserve up front for a declared `count`. Every element
    /// takes at least one byte, and the reservation never exceeds
    /// [`MAX_PREALLOC_BYTES`] however large the element type is.
    fn reserve_hint<T>(&self, count: usize) -> usize {
        let budget = MAX_PREALLOC_BYTES / std::mem::size_of::<T>().max(1);
        count.min(self.remaining()).min(budget)
    }

    /// `i32` count followed by that many elements.
    pub fn read_bulk_array<T, F>(&mut self, decode: F) -> Result<Vec<T>>
    where
        F: FnMut(&mut Self) -> Result<T>,
    {
        let count = self.read_count()?;
        self.read_array(count, decode)
    }
}

impl std::fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("offset", &self.start)
            .field("len", &self.len())
            .field("position", &self.position())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(bytes: &[u8]) -> ArchiveReader {
        ArchiveReader::new(bytes)
    }

    #[test]
    fn test_primitives() {
        let mut bytes = Vec::new();
        bytes.push(7u8);
        bytes.push(2u8);
        bytes.extend_from_slice(&(-2i16).to_le_bytes());
        bytes.extend_from_slice(&123456i32.to_le_bytes());
        bytes.extend_from_slice(&1.5f32.to_le_bytes());

        let mut r = reader(&bytes);
        assert_eq!(r.read_u8().unwrap(), 7);
        assert!(r.read_bool().unwrap());
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_i32().unwrap(), 123456);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert!(r.is_eof());
    }

    #[test]
    fn test_read_past_end() {
        let mut r = reader(&[1, 2, 3]);
        let err = r.read_i32().unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { pos: 0, wanted: 4, available: 3 }));
        // Failed reads don't move the cursor
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_fstring() {
        let mut bytes = 5i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(b"hello");
        let mut r = reader(&bytes);
        assert_eq!(r.read_fstring().unwrap(), "hello");
        assert!(r.is_eof());
    }

    #[test]
    fn test_invalid_utf8() {
        let mut bytes = 2i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0xC3, 0x28]);
        let err = reader(&bytes).read_fstring().unwrap_err();
        assert!(matches!(err, Error::Utf8 { pos: 4, .. }));
    }

    #[test]
    fn test_negative_string_length() {
        let bytes = (-1i32).to_le_bytes();
        let err = reader(&bytes).read_fstring().unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));
    }

    #[test]
    fn test_vectors() {
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut r = reader(&bytes);
        assert!(r.read_f32_vec(0).unwrap().is_empty());
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_f32_vec(3).unwrap(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_vector_count_exceeds_data() {
        let mut r = reader(&[0u8; 8]);
        assert!(matches!(r.read_i32_vec(i32::MAX as usize), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_chunk_is_bounded() {
        let mut r = reader(&[1, 2, 3, 4, 5, 6]);
        r.read_u8().unwrap();
        let mut chunk = r.chunk(3).unwrap();
        assert_eq!(r.position(), 4);

        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.position(), 0);
        assert_eq!(chunk.buffer_offset(), 1);
        assert_eq!(chunk.read_bytes(3).unwrap(), vec![2, 3, 4]);
        assert!(chunk.is_eof());
        assert!(chunk.read_u8().is_err());

        assert_eq!(r.read_u8().unwrap(), 5);
    }

    #[test]
    fn test_chunk_past_end() {
        let mut r = reader(&[1, 2]);
        assert!(matches!(r.chunk(3), Err(Error::UnexpectedEof { .. })));
    }

    #[test]
    fn test_seek() {
        let mut r = reader(&[0, 1, 2, 3]);
        r.seek(3).unwrap();
        assert_eq!(r.read_u8().unwrap(), 3);
        r.seek(4).unwrap();
        assert!(r.is_eof());
        assert!(r.seek(5).is_err());
        r.seek(2).unwrap();
        assert_eq!(r.read_u8().unwrap(), 2);
    }

    #[test]
    fn test_reserve_hint_is_bounded() {
        let r = reader(&vec![0u8; 4 << 20]);
        assert_eq!(r.reserve_hint::<u8>(16), 16);
        assert_eq!(r.reserve_hint::<u8>(usize::MAX), MAX_PREALLOC_BYTES);
        assert_eq!(r.reserve_hint::<[u8; 4096]>(usize::MAX), MAX_PREALLOC_BYTES / 4096);
        assert_eq!(reader(&[0u8; 3]).reserve_hint::<u8>(100), 3);
    }

    #[test]
    fn test_read_array_count_exceeds_data() {
        let mut r = reader(&[1, 2, 3]);
        let err = r.read_array(i32::MAX as usize, |r| r.read_u8()).unwrap_err();
        assert!(matches!(err, Error::UnexpectedEof { .. }));
    }

    #[test]
    fn test_read_array_variable_length() {
        // Two length-prefixed strings of different sizes
        let mut bytes = Vec::new();
        for s in ["a", "bcd"] {
            bytes.extend_from_slice(&(s.len() as i32).to_le_bytes());
            bytes.extend_from_slice(s.as_bytes());
        }
        let mut r = reader(&bytes);
        let names = r.read_array(2, |r| r.read_fstring()).unwrap();
        assert_eq!(names, vec!["a", "bcd"]);
    }

    #[test]
    fn test_read_bulk_array() {
        let mut bytes = 2i32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&10i32.to_le_bytes());
        bytes.extend_from_slice(&20i32.to_le_bytes());
        let values = reader(&bytes).read_bulk_array(|r| r.read_i32()).unwrap();
        assert_eq!(values, vec![10, 20]);
    }
}
