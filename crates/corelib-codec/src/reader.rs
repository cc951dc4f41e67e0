use crate::error::CodecError;

/// A cursor over a byte slice that reads fixed-width big-endian (network byte order) integers
/// and floats, matching the source format regardless of host endianness.
#[derive(Debug)]
pub struct BigEndianReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BigEndianReader<'a> {
    /// Wrap a byte slice for sequential big-endian reads starting at offset zero.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if self.remaining() < n {
            return Err(CodecError::Corrupt {
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a big-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        let chunk: [u8; 4] = self.take(4)?.try_into().expect("length checked above; qed");
        Ok(i32::from_be_bytes(chunk))
    }

    /// Read a big-endian `i64`.
    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        let chunk: [u8; 8] = self.take(8)?.try_into().expect("length checked above; qed");
        Ok(i64::from_be_bytes(chunk))
    }

    /// Read a big-endian `f64`, bit pattern preserved verbatim (including NaN payloads).
    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        let chunk: [u8; 8] = self.take(8)?.try_into().expect("length checked above; qed");
        Ok(f64::from_bits(u64::from_be_bytes(chunk)))
    }
}
