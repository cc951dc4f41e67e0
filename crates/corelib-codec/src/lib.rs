//! Shared binary layout for the coalesced-segment set and sparse-vector crates.
//!
//! Every serializable type in this workspace uses the same tagged shape: a big-endian `i32`
//! element count followed by that many fixed-width elements, all encoded big-endian (network
//! byte order) regardless of host endianness. This crate owns that shape plus the shared
//! [`CodecError`] so each data structure crate only has to describe its own element layout.

mod error;
mod reader;
mod writer;

pub use error::CodecError;
pub use reader::BigEndianReader;
pub use writer::BigEndianWriter;

use std::collections::BTreeMap;

/// A type that can be serialized to and deserialized from the workspace's shared big-endian
/// tagged binary layout.
///
/// Implementors only need to describe a single element's shape; the `i32` count header is
/// handled once by [`encode_elements`] and [`decode_elements`].
pub trait Codec: Sized {
    /// Append this value's elements (not the header) to `writer`.
    fn encode_elements(&self, writer: &mut BigEndianWriter<'_>);

    /// Number of elements this value would encode, i.e. the header value.
    fn element_count(&self) -> usize;

    /// Decode exactly `count` elements from `reader` into a fresh value.
    fn decode_elements(reader: &mut BigEndianReader<'_>, count: usize) -> Result<Self, CodecError>;
}

/// Serialize `value` using the shared `i32` count + elements shape.
pub fn encode<T: Codec>(value: &T) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + value.element_count() * 16);
    let mut writer = BigEndianWriter::new(&mut out);
    writer.write_i32(
        i32::try_from(value.element_count()).expect("element count fits in i32 by construction"),
    );
    value.encode_elements(&mut writer);
    out
}

/// Deserialize a value previously produced by [`encode`].
///
/// A zero-byte input is `Err(CodecError::Corrupt)` — it's missing even the `i32` count header, so
/// there's nothing to decode. The source's "null/empty input maps to null" contract lives one
/// layer up, in the caller's own `Option` wrapper: a caller distinguishes "no value" from "empty
/// value" before ever reaching here, and only calls this function once it has bytes to decode.
pub fn decode<T: Codec>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut reader = BigEndianReader::new(bytes);
    let count = reader.read_i32()?;
    let count = usize::try_from(count).map_err(|_| CodecError::Corrupt {
        needed: 4,
        available: bytes.len(),
    })?;
    T::decode_elements(&mut reader, count)
}

/// Serialize a plain sorted `i64 -> i64` map using the shared layout (the source's
/// `TreeMap<Long,Long>` codec), independent of any segment-adjacency invariant.
pub fn encode_treemap(map: &BTreeMap<i64, i64>) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + map.len() * 16);
    let mut writer = BigEndianWriter::new(&mut out);
    writer.write_i32(i32::try_from(map.len()).expect("map length fits in i32 by construction"));
    for (&key, &value) in map {
        writer.write_i64(key);
        writer.write_i64(value);
    }
    out
}

/// Deserialize a plain sorted `i64 -> i64` map previously produced by [`encode_treemap`].
pub fn decode_treemap(bytes: &[u8]) -> Result<BTreeMap<i64, i64>, CodecError> {
    let mut reader = BigEndianReader::new(bytes);
    let count = reader.read_i32()?;
    let count = usize::try_from(count).map_err(|_| CodecError::Corrupt {
        needed: 4,
        available: bytes.len(),
    })?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let key = reader.read_i64()?;
        let value = reader.read_i64()?;
        map.insert(key, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treemap_round_trip() {
        let mut map = BTreeMap::new();
        map.insert(10, 20);
        map.insert(-5, i64::MIN);
        map.insert(i64::MAX, 0);

        let bytes = encode_treemap(&map);
        assert_eq!(bytes.len(), 4 + map.len() * 16);
        assert_eq!(decode_treemap(&bytes).unwrap(), map);
    }

    #[test]
    fn empty_treemap_round_trips_to_empty() {
        let map = BTreeMap::new();
        let bytes = encode_treemap(&map);
        assert_eq!(bytes, 0i32.to_be_bytes());
        assert_eq!(decode_treemap(&bytes).unwrap(), map);
    }

    #[test]
    fn truncated_header_is_corrupt() {
        assert!(matches!(
            decode_treemap(&[0, 0]),
            Err(CodecError::Corrupt { .. })
        ));
    }

    #[test]
    fn truncated_element_is_corrupt() {
        let mut bytes = 1i32.to_be_bytes().to_vec();
        bytes.extend_from_slice(&42i64.to_be_bytes());
        // Missing the value half of the pair.
        assert!(matches!(
            decode_treemap(&bytes),
            Err(CodecError::Corrupt { .. })
        ));
    }
}
