use std::convert::Infallible;
use std::hash::Hash;

use serde::Serialize;

use crate::{KeyArgs, KeyError};

/// Strategy deriving a cache key from a call's full argument list.
///
/// `A` is the argument type of the wrapped function (a bare value for one
/// argument, a tuple for several). Keys must be equal for arguments that
/// should share a result and differ otherwise.
///
/// Provided strategies:
///
/// | Strategy          | Key            | Fails?  |
/// |-------------------|----------------|---------|
/// | [`DefaultKey`]    | `String`       | never   |
/// | [`JsonKey`]       | `String`       | on serialization errors |
/// | `Fn(&A) -> K`     | `K`            | never   |
/// | [`FallibleKey`]   | `K`            | when the closure says so |
/// | [`ByIdentity`](crate::ByIdentity) | [`IdentityKey`](crate::IdentityKey) | never |
///
/// Strategies whose `Error` is [`Infallible`] work with `call`; every strategy
/// works with `try_call`.
pub trait KeyFn<A: ?Sized> {
    type Key: Eq + Hash + Clone;
    type Error;

    fn derive_key(&self, args: &A) -> Result<Self::Key, Self::Error>;
}

/// Default policy: render each argument with [`CacheableKey`](crate::CacheableKey)
/// and join the parts with [`KEY_SEPARATOR`](crate::KEY_SEPARATOR).
///
/// ```
/// use memento_core::{DefaultKey, KeyFn};
///
/// let a = DefaultKey.derive_key(&(12, 3)).unwrap();
/// let b = DefaultKey.derive_key(&(1, 23)).unwrap();
/// assert_ne!(a, b);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultKey;

impl<A: KeyArgs + ?Sized> KeyFn<A> for DefaultKey {
    type Key = String;
    type Error = Infallible;

    fn derive_key(&self, args: &A) -> Result<String, Infallible> {
        Ok(args.to_args_key())
    }
}

/// Keys by the compact JSON rendering of the arguments (`serde_json`).
///
/// Tuples become JSON arrays, so argument boundaries are unambiguous. Fails
/// with [`KeyError::Serialize`] for values JSON cannot represent, such as maps
/// with non-string keys. Note that JSON does not distinguish every Rust value
/// (`Option<()>` renders `None` and `Some(())` both as `null`).
///
/// ```
/// use memento_core::{JsonKey, KeyFn};
///
/// assert_eq!(JsonKey.derive_key(&(12, "x")).unwrap(), "[12,\"x\"]");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonKey;

impl<A: Serialize + ?Sized> KeyFn<A> for JsonKey {
    type Key = String;
    type Error = KeyError;

    fn derive_key(&self, args: &A) -> Result<String, KeyError> {
        Ok(serde_json::to_string(args)?)
    }
}

/// Any closure over the borrowed arguments is a key strategy.
///
/// ```
/// use memento_core::KeyFn;
///
/// let by_len = |s: &String| s.len();
/// assert_eq!(by_len.derive_key(&"abc".to_string()), Ok(3));
/// ```
impl<A, K, F> KeyFn<A> for F
where
    A: ?Sized,
    K: Eq + Hash + Clone,
    F: Fn(&A) -> K,
{
    type Key = K;
    type Error = Infallible;

    fn derive_key(&self, args: &A) -> Result<K, Infallible> {
        Ok(self(args))
    }
}

/// Wraps a closure that may reject arguments.
///
/// ```
/// use memento_core::{FallibleKey, KeyError, KeyFn};
///
/// let positive = FallibleKey(|n: &i64| {
///     if *n >= 0 {
///         Ok(*n as u64)
///     } else {
///         Err(KeyError::unsupported("negative input"))
///     }
/// });
/// assert_eq!(positive.derive_key(&4).unwrap(), 4);
/// assert!(positive.derive_key(&-1).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FallibleKey<F>(pub F);

impl<A, K, F> KeyFn<A> for FallibleKey<F>
where
    A: ?Sized,
    K: Eq + Hash + Clone,
    F: Fn(&A) -> Result<K, KeyError>,
{
    type Key = K;
    type Error = KeyError;

    fn derive_key(&self, args: &A) -> Result<K, KeyError> {
        (self.0)(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_key_matches_key_args() {
        assert_eq!(DefaultKey.derive_key(&7u8).unwrap(), "7");
        assert_eq!(DefaultKey.derive_key(&("a", 'b')).unwrap(), "\"a\"\u{1f}'b'");
    }

    #[test]
    fn test_json_key_separates_arguments() {
        let a = JsonKey.derive_key(&(12, 3)).unwrap();
        let b = JsonKey.derive_key(&(1, 23)).unwrap();
        assert_eq!(a, "[12,3]");
        assert_eq!(b, "[1,23]");
    }

    #[test]
    fn test_json_key_rejects_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        let err = JsonKey.derive_key(&map).unwrap_err();
        assert!(matches!(err, KeyError::Serialize(_)));
    }

    #[test]
    fn test_closure_key() {
        let first_word = |s: &str| s.split_whitespace().next().unwrap_or("").to_string();
        assert_eq!(first_word.derive_key("hello world").unwrap(), "hello");
    }
}
