/// Error returned by [`crate::MutableSegmentedBitSet`] and its read-only facades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitSetError {
    /// A segment list passed to a constructor had `start > end` for some entry.
    #[error("invalid segment: start ({start}) must be <= end ({end})")]
    InvalidSegment {
        /// The segment's start
        start: i64,
        /// The segment's end
        end: i64,
    },
    /// Two segments in a constructor's input overlap or are adjacent (would have coalesced).
    #[error(
        "overlapping or adjacent segments: [{a_start}, {a_end}] and [{b_start}, {b_end}]"
    )]
    OverlappingSegments {
        /// Start of the first segment
        a_start: i64,
        /// End of the first segment
        a_end: i64,
        /// Start of the second segment
        b_start: i64,
        /// End of the second segment
        b_end: i64,
    },
    /// A navigation query found no matching element.
    #[error("no such element")]
    NotFound,
    /// The operation is disallowed by contract, independent of the set's contents.
    #[error("operation not supported: {reason}")]
    Unsupported {
        /// Human-readable reason, including the documented workaround where one exists
        reason: &'static str,
    },
}
