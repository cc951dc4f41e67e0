/// Appends fixed-width big-endian (network byte order) integers and floats to a growable
/// buffer, matching the source format regardless of host endianness.
#[derive(Debug)]
pub struct BigEndianWriter<'a> {
    out: &'a mut Vec<u8>,
}

impl<'a> BigEndianWriter<'a> {
    /// Wrap a buffer for sequential big-endian writes, appending after whatever it already
    /// contains.
    pub fn new(out: &'a mut Vec<u8>) -> Self {
        Self { out }
    }

    /// Write a big-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.out.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a big-endian `f64`, bit pattern preserved verbatim (including NaN payloads).
    pub fn write_f64(&mut self, value: f64) {
        self.out.extend_from_slice(&value.to_bits().to_be_bytes());
    }
}
