use thiserror::Error;

/// Recoverable failure of [`copy`](crate::copy).
///
/// Every variant leaves both the source and the destination exactly as they were
/// before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CopyError {
    /// `length * item_size` of the source does not fit in `usize`.
    #[error("copy size overflowed: {length} items of {item_size} bytes")]
    SizeOverflow { length: usize, item_size: usize },

    /// The destination had to grow and its allocator could not supply the block.
    #[error("failed to allocate {requested} bytes for the copy destination")]
    AllocationFailed { requested: usize },

    /// The destination is fixed and smaller than the source content.
    #[error("fixed destination too small: {required} bytes required, {capacity} available")]
    DestinationTooSmall { required: usize, capacity: usize },
}

impl From<CopyError> for dynarray_common::error::Error {
    fn from(e: CopyError) -> Self {
        use dynarray_common::error::Error;
        match e {
            CopyError::SizeOverflow { .. } => Error::size_overflow(),
            CopyError::AllocationFailed { requested } => Error::allocation_failed(requested),
            CopyError::DestinationTooSmall { required, capacity } => {
                Error::capacity_exceeded(required, capacity)
            }
        }
    }
}
