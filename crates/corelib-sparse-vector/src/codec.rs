//! Binary layout for the sparse vector types: spec §4.3's second and third serialization rows —
//! `int32 count` followed by `count` pairs of `(int32 index, float64 value)` or
//! `(int32 index, int32 value)`.

use corelib_codec::{BigEndianReader, BigEndianWriter, Codec, CodecError};

use crate::{MutableIntSparseVector, MutableSparseVector};

impl Codec for MutableSparseVector {
    fn encode_elements(&self, writer: &mut BigEndianWriter<'_>) {
        self.for_each_non_zero(|index, value| {
            writer.write_i32(index);
            writer.write_f64(value);
        });
    }

    fn element_count(&self) -> usize {
        self.non_zero_count()
    }

    fn decode_elements(reader: &mut BigEndianReader<'_>, count: usize) -> Result<Self, CodecError> {
        let mut vector = MutableSparseVector::new();
        for _ in 0..count {
            let index = reader.read_i32()?;
            let value = reader.read_f64()?;
            vector.set(index, value);
        }
        Ok(vector)
    }
}

impl Codec for MutableIntSparseVector {
    fn encode_elements(&self, writer: &mut BigEndianWriter<'_>) {
        self.for_each_non_zero(|index, value| {
            writer.write_i32(index);
            writer.write_i32(value);
        });
    }

    fn element_count(&self) -> usize {
        self.non_zero_count()
    }

    fn decode_elements(reader: &mut BigEndianReader<'_>, count: usize) -> Result<Self, CodecError> {
        let mut vector = MutableIntSparseVector::new();
        for _ in 0..count {
            let index = reader.read_i32()?;
            let value = reader.read_i32()?;
            vector.set(index, value);
        }
        Ok(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_vector_round_trip_preserves_nan_bits() {
        let mut v = MutableSparseVector::new();
        v.set(-5, f64::NAN);
        v.set(10, 3.5);

        let bytes = corelib_codec::encode(&v);
        let decoded: MutableSparseVector = corelib_codec::decode(&bytes).unwrap();

        assert_eq!(decoded.get(10), 3.5);
        assert!(decoded.get(-5).is_nan());
        assert_eq!(decoded.get(-5).to_bits(), f64::NAN.to_bits());
    }

    #[test]
    fn int_sparse_vector_round_trip() {
        let mut v = MutableIntSparseVector::new();
        v.set(0, 10);
        v.set(-7, -3);

        let bytes = corelib_codec::encode(&v);
        let decoded: MutableIntSparseVector = corelib_codec::decode(&bytes).unwrap();
        assert_eq!(decoded, v);
    }

    #[test]
    fn truncated_vector_stream_is_corrupt() {
        let mut v = MutableSparseVector::new();
        v.set(0, 1.0);
        let mut bytes = corelib_codec::encode(&v);
        bytes.truncate(bytes.len() - 1);
        let result: Result<MutableSparseVector, _> = corelib_codec::decode(&bytes);
        assert!(matches!(result, Err(CodecError::Corrupt { .. })));
    }
}
