use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn size_overflow() -> Error {
        Error(ErrorKind::SizeOverflow.into())
    }

    pub fn allocation_failed(size: usize) -> Error {
        Error(ErrorKind::AllocationFailed { size }.into())
    }

    pub fn capacity_exceeded(required: usize, capacity: usize) -> Error {
        Error(ErrorKind::CapacityExceeded { required, capacity }.into())
    }

    /// Returns `true` if this error reports an arithmetic overflow of a size computation.
    pub fn is_size_overflow(&self) -> bool {
        matches!(self.kind(), ErrorKind::SizeOverflow)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("size computation overflowed")]
    SizeOverflow,

    #[error("failed to allocate {size} bytes")]
    AllocationFailed { size: usize },

    #[error("capacity exceeded: {required} bytes required, {capacity} available")]
    CapacityExceeded { required: usize, capacity: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_operation("conversion")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_roundtrip() {
        let e = Error::capacity_exceeded(32, 16);
        assert_eq!(
            e.kind(),
            &ErrorKind::CapacityExceeded {
                required: 32,
                capacity: 16
            }
        );
        assert_eq!(
            e.to_string(),
            "capacity exceeded: 32 bytes required, 16 available"
        );
        assert!(matches!(
            e.into_kind(),
            ErrorKind::CapacityExceeded { required: 32, .. }
        ));
    }

    #[test]
    fn test_size_overflow_predicate() {
        assert!(Error::size_overflow().is_size_overflow());
        assert!(!Error::allocation_failed(8).is_size_overflow());
    }

    #[test]
    fn test_invalid_arg_message() {
        let e = Error::invalid_arg("item_size", "item_size > 0");
        assert_eq!(e.to_string(), "invalid argument item_size: item_size > 0");
    }
}
