/// Integration tests for failing computations: nothing is cached, errors pass
/// through unchanged
use memento::{try_memoize, try_wrap, FallibleKey, KeyError, MemoOptions};
use std::cell::{Cell, RefCell};
use std::fmt;

#[derive(Debug, PartialEq)]
enum FetchError {
    Timeout(u32),
    BadKey(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Timeout(attempt) => write!(f, "timed out on attempt {attempt}"),
            FetchError::BadKey(reason) => write!(f, "bad key: {reason}"),
        }
    }
}

impl From<KeyError> for FetchError {
    fn from(err: KeyError) -> Self {
        FetchError::BadKey(err.to_string())
    }
}

#[test]
fn test_error_returned_unmodified_and_retried() {
    let attempt = Cell::new(0);
    let fetch = try_memoize(|url: String| {
        attempt.set(attempt.get() + 1);
        if attempt.get() < 3 {
            Err(FetchError::Timeout(attempt.get()))
        } else {
            Ok(format!("body of {url}"))
        }
    });

    let url = "https://example.org".to_string();
    assert_eq!(fetch.try_call(url.clone()), Err(FetchError::Timeout(1)));
    assert_eq!(fetch.try_call(url.clone()), Err(FetchError::Timeout(2)));
    assert!(fetch.is_empty());

    assert_eq!(fetch.try_call(url.clone()), Ok("body of https://example.org".to_string()));
    assert_eq!(fetch.try_call(url), Ok("body of https://example.org".to_string()));
    assert_eq!(attempt.get(), 3);
}

#[test]
fn test_failure_does_not_disturb_other_keys() {
    let divide = try_memoize(|(a, b): (i32, i32)| a.checked_div(b).ok_or("division by zero"));

    assert_eq!(divide.try_call((10, 2)), Ok(5));
    assert_eq!(divide.try_call((10, 0)), Err("division by zero"));
    assert!(divide.contains(&(10, 2)));
    assert!(!divide.contains(&(10, 0)));
    assert_eq!(divide.len(), 1);
}

#[test]
fn test_key_error_skips_function() {
    let seen = RefCell::new(Vec::new());
    let lookup = try_wrap(
        |name: String| {
            seen.borrow_mut().push(name.clone());
            Ok::<_, FetchError>(name.len())
        },
        MemoOptions::new().key_fn(FallibleKey(|name: &String| {
            if name.is_empty() {
                Err(KeyError::unsupported("empty name"))
            } else {
                Ok(name.clone())
            }
        })),
    );

    assert_eq!(
        lookup.try_call(String::new()),
        Err(FetchError::BadKey("unsupported cache key: empty name".to_string()))
    );
    assert!(seen.borrow().is_empty());
    assert_eq!(lookup.try_call("bob".to_string()), Ok(3));
    assert_eq!(seen.borrow().as_slice(), ["bob".to_string()]);
}

#[test]
fn test_json_key_serialization_failure() {
    use std::collections::HashMap;

    // JSON object keys must be strings.
    let total = try_wrap(
        |m: HashMap<(u8, u8), u32>| Ok::<_, KeyError>(m.values().sum::<u32>()),
        MemoOptions::new().key_fn(memento::JsonKey),
    );

    let mut input = HashMap::new();
    input.insert((1, 2), 5);
    assert!(matches!(total.try_call(input), Err(KeyError::Serialize(_))));
    assert!(total.is_empty());
}

#[test]
fn test_panic_propagates_and_caches_nothing() {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    let armed = Cell::new(true);
    let risky = memento::memoize(|n: u32| {
        if armed.get() {
            panic!("unexpected input {n}");
        }
        n * 2
    });

    assert!(catch_unwind(AssertUnwindSafe(|| risky.call(4))).is_err());
    assert!(risky.is_empty());
    armed.set(false);
    assert_eq!(risky.call(4), 8);
}

#[cfg(feature = "stats")]
#[test]
fn test_failures_counted() {
    let parse = try_memoize(|s: &'static str| s.parse::<u8>());
    let _ = parse.try_call("1");
    let _ = parse.try_call("x");
    let _ = parse.try_call("x");
    let _ = parse.try_call("1");

    let stats = parse.stats();
    assert_eq!(stats.failures(), 2);
    assert_eq!(stats.misses(), 3);
    assert_eq!(stats.hits(), 1);
}
