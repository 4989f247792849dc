pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Returns an `InvalidArgument` error from the enclosing function when the condition
/// does not hold. The error message is the stringified condition.
#[macro_export]
macro_rules! verify_arg {
    ($name:expr, $expr:expr) => {{
        let result = $expr;
        $crate::result::verify_arg(result, stringify!($name), stringify!($expr))?;
    }};
}

#[inline]
pub fn verify_arg(predicate: bool, name: &str, condition: &str) -> Result<()> {
    if predicate {
        Ok(())
    } else {
        invalid_arg(name, condition)
    }
}

#[cold]
pub fn invalid_arg(name: &str, condition: &str) -> Result<()> {
    Err(crate::error::ErrorKind::InvalidArgument {
        name: name.to_string(),
        message: condition.to_string(),
    }
    .into())
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;

    fn checked_item_size(item_size: usize) -> super::Result<usize> {
        verify_arg!(item_size, item_size > 0);
        Ok(item_size)
    }

    #[test]
    fn test_verify_arg_passes() {
        assert_eq!(checked_item_size(4).unwrap(), 4);
    }

    #[test]
    fn test_verify_arg_fails_with_condition() {
        let err = checked_item_size(0).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::InvalidArgument {
                name: "item_size".to_string(),
                message: "item_size > 0".to_string(),
            }
        );
    }
}
