//! Binary layout for [`crate::MutableSegmentedBitSet`]: the first row of spec §4.3's
//! serialization table — `int32 count` followed by `count` pairs of `(int64 start, int64 end)`.

use corelib_codec::{BigEndianReader, BigEndianWriter, Codec, CodecError};

use crate::MutableSegmentedBitSet;

pub use corelib_codec::{decode_treemap, encode_treemap};

impl Codec for MutableSegmentedBitSet {
    fn encode_elements(&self, writer: &mut BigEndianWriter<'_>) {
        self.for_each_range(|start, end| {
            writer.write_i64(start);
            writer.write_i64(end);
        });
    }

    fn element_count(&self) -> usize {
        self.segment_count()
    }

    /// Builds the result via [`MutableSegmentedBitSet::add_all`] rather than
    /// [`MutableSegmentedBitSet::from_segments`]'s strict validation: spec §4.3 requires
    /// deserialization to tolerate (without requiring) non-canonical input — overlapping,
    /// touching, or out-of-order segment pairs all coalesce silently instead of failing. Only a
    /// truncated byte stream produces [`CodecError::Corrupt`]; an inverted pair (`start > end`) is
    /// treated the same way [`MutableSegmentedBitSet::add_all`] treats an empty range: a no-op.
    fn decode_elements(reader: &mut BigEndianReader<'_>, count: usize) -> Result<Self, CodecError> {
        let mut set = MutableSegmentedBitSet::new();
        for _ in 0..count {
            let start = reader.read_i64()?;
            let end = reader.read_i64()?;
            set.add_all(start, end);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_round_trip() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(10, 20);
        set.add_all(40, 50);
        set.add_all(100, 200);

        let bytes = corelib_codec::encode(&set);
        let mut expected = 3i32.to_be_bytes().to_vec();
        for (s, e) in [(10i64, 20i64), (40, 50), (100, 200)] {
            expected.extend_from_slice(&s.to_be_bytes());
            expected.extend_from_slice(&e.to_be_bytes());
        }
        assert_eq!(bytes, expected);

        let decoded: MutableSegmentedBitSet = corelib_codec::decode(&bytes).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn empty_set_round_trip() {
        let set = MutableSegmentedBitSet::new();
        let bytes = corelib_codec::encode(&set);
        assert_eq!(bytes, 0i32.to_be_bytes());
        let decoded: MutableSegmentedBitSet = corelib_codec::decode(&bytes).unwrap();
        assert_eq!(decoded, set);
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(0, 1);
        let mut bytes = corelib_codec::encode(&set);
        bytes.truncate(bytes.len() - 1);
        let result: Result<MutableSegmentedBitSet, _> = corelib_codec::decode(&bytes);
        assert!(matches!(result, Err(CodecError::Corrupt { .. })));
    }

    #[test]
    fn decode_tolerates_overlapping_and_adjacent_segments() {
        let mut bytes = 3i32.to_be_bytes().to_vec();
        // Adjacent to the first, overlapping the second; out of start order too.
        for (s, e) in [(0i64, 10i64), (11, 20), (15, 25)] {
            bytes.extend_from_slice(&s.to_be_bytes());
            bytes.extend_from_slice(&e.to_be_bytes());
        }

        let decoded: MutableSegmentedBitSet = corelib_codec::decode(&bytes).unwrap();
        assert_eq!(decoded.segment_count(), 1);
        assert!(decoded.contains_all(0, 25));
    }

    #[test]
    fn decode_tolerates_inverted_segment_as_no_op() {
        let mut bytes = 2i32.to_be_bytes().to_vec();
        for (s, e) in [(5i64, 0i64), (10, 20)] {
            bytes.extend_from_slice(&s.to_be_bytes());
            bytes.extend_from_slice(&e.to_be_bytes());
        }

        let decoded: MutableSegmentedBitSet = corelib_codec::decode(&bytes).unwrap();
        assert_eq!(decoded.segment_count(), 1);
        assert!(decoded.contains_all(10, 20));
        assert!(!decoded.contains(5));
    }
}
