/// Error returned when a serialized byte stream cannot be decoded.
#[derive(Debug, Clone, Copy, thiserror::Error)]
pub enum CodecError {
    /// The stream ended before the declared element count was satisfied, or was too short to
    /// even hold the header.
    #[error("corrupt stream: needed at least {needed} bytes, only {available} available")]
    Corrupt {
        /// Minimum number of bytes required to decode the next field
        needed: usize,
        /// Number of bytes actually remaining in the stream
        available: usize,
    },
}
