use std::convert::Infallible;

use thiserror::Error;

/// Failure to derive a cache key from a call's arguments.
///
/// Only fallible key strategies ([`JsonKey`](crate::JsonKey),
/// [`FallibleKey`](crate::FallibleKey)) produce this error. The default
/// strategy cannot fail.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The arguments could not be serialized (e.g. a map with non-string keys).
    #[error("failed to serialize cache key: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A caller-supplied key function rejected the arguments.
    #[error("unsupported cache key: {0}")]
    Unsupported(String),
}

impl KeyError {
    /// Shorthand for [`KeyError::Unsupported`].
    pub fn unsupported(reason: impl Into<String>) -> Self {
        KeyError::Unsupported(reason.into())
    }
}

/// Conversion of a key-derivation error into the error type of a fallible
/// computation.
///
/// Implemented for [`Infallible`] (for every `E`) and for [`KeyError`] (for
/// every `E: From<KeyError>`), so `try_call` works with any error type when
/// the key strategy cannot fail.
pub trait IntoCallError<E> {
    fn into_call_error(self) -> E;
}

impl<E> IntoCallError<E> for Infallible {
    fn into_call_error(self) -> E {
        match self {}
    }
}

impl<E: From<KeyError>> IntoCallError<E> for KeyError {
    fn into_call_error(self) -> E {
        E::from(self)
    }
}

/// Unwraps a result that cannot fail.
pub fn into_ok<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(value) => value,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum AppError {
        Key(String),
    }

    impl From<KeyError> for AppError {
        fn from(e: KeyError) -> Self {
            AppError::Key(e.to_string())
        }
    }

    #[test]
    fn test_unsupported_message() {
        let err = KeyError::unsupported("closures cannot be keyed");
        assert_eq!(
            err.to_string(),
            "unsupported cache key: closures cannot be keyed"
        );
    }

    #[test]
    fn test_key_error_converts_into_caller_error() {
        let err: AppError = KeyError::unsupported("nope").into_call_error();
        assert_eq!(err, AppError::Key("unsupported cache key: nope".to_string()));
    }
}
