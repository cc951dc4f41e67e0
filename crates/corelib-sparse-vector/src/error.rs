/// Error returned by the sparse vector types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    /// A caller-supplied value violates a precondition, e.g. division by zero.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Human-readable reason
        reason: &'static str,
    },
    /// The operation is illegal given the vector's current contents, e.g. normalizing a zero
    /// vector.
    #[error("invalid state: {reason}")]
    InvalidState {
        /// Human-readable reason
        reason: &'static str,
    },
}
