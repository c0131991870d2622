use std::fmt::Debug;

/// Separator placed between the rendered arguments of a multi-argument key.
///
/// U+001F (INFORMATION SEPARATOR ONE). `Debug` output of strings and chars
/// escapes control characters, so the separator never appears raw in the
/// rendering of a [`DefaultCacheableKey`] type. Custom [`CacheableKey`]
/// renderings are escaped with [`KEY_ESCAPE`] before joining anyway.
pub const KEY_SEPARATOR: char = '\u{1f}';

/// Escape prefix for [`KEY_SEPARATOR`] and itself inside a rendered argument.
pub const KEY_ESCAPE: char = '\u{10}';

/// Trait for rendering a single argument as a canonical cache-key string.
///
/// Two values that should share a cache entry must render identically, and
/// values that should not must render differently.
///
/// # Examples
///
/// ```
/// use memento_core::CacheableKey;
///
/// struct UserId {
///     id: u64,
///     display_name: String,
/// }
///
/// // The display name does not affect lookups, only the id does.
/// impl CacheableKey for UserId {
///     fn to_cache_key(&self) -> String {
///         format!("user:{}", self.id)
///     }
/// }
///
/// let a = UserId { id: 7, display_name: "ana".into() };
/// let b = UserId { id: 7, display_name: "Ana".into() };
/// assert_eq!(a.to_cache_key(), b.to_cache_key());
/// ```
pub trait CacheableKey {
    fn to_cache_key(&self) -> String;
}

/// Marker trait opting a type into the `Debug`-based default key rendering.
///
/// Implement either this trait or [`CacheableKey`] for a type, not both.
///
/// ```
/// use memento_core::{CacheableKey, DefaultCacheableKey};
///
/// #[derive(Debug)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl DefaultCacheableKey for Point {}
///
/// assert_eq!(Point { x: 1, y: 2 }.to_cache_key(), "Point { x: 1, y: 2 }");
/// ```
pub trait DefaultCacheableKey: Debug {}

impl<T: DefaultCacheableKey + ?Sized> CacheableKey for T {
    fn to_cache_key(&self) -> String {
        format!("{:?}", self)
    }
}

macro_rules! default_cacheable {
    ($($ty:ty),* $(,)?) => {
        $(impl DefaultCacheableKey for $ty {})*
    };
}

default_cacheable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, str,
    String, ()
);

impl<T: DefaultCacheableKey + ?Sized> DefaultCacheableKey for &T {}
impl<T: DefaultCacheableKey> DefaultCacheableKey for Option<T> {}
impl<T: DefaultCacheableKey> DefaultCacheableKey for Vec<T> {}
impl<T: DefaultCacheableKey> DefaultCacheableKey for [T] {}
impl<T: DefaultCacheableKey + ?Sized> DefaultCacheableKey for Box<T> {}

/// The full argument list of a call, rendered into one cache key.
///
/// A single argument renders as its own [`CacheableKey`]. A tuple of up to
/// eight arguments renders each element, escapes any [`KEY_SEPARATOR`] or
/// [`KEY_ESCAPE`] inside it, and joins the parts with [`KEY_SEPARATOR`], so
/// `(12, 3)` and `(1, 23)` never collide. `()` is the key of a call with no
/// arguments.
///
/// Bare values are covered for primitives, `String`, `Option`, `Vec`, `Box`
/// and references. A user type that implements [`CacheableKey`] is taken by
/// reference (`|p: &Point|`), inside a tuple (`|(p,): (Point,)|`), or gets a
/// one-line `KeyArgs` impl of its own:
///
/// ```
/// use memento_core::{CacheableKey, KeyArgs};
///
/// struct Point(i64, i64);
///
/// impl CacheableKey for Point {
///     fn to_cache_key(&self) -> String {
///         format!("{}:{}", self.0, self.1)
///     }
/// }
///
/// impl KeyArgs for Point {
///     fn write_key(&self, out: &mut String) {
///         out.push_str(&self.to_cache_key());
///     }
/// }
///
/// assert_eq!(Point(3, -4).to_args_key(), "3:-4");
/// ```
///
/// ```
/// use memento_core::KeyArgs;
///
/// assert_ne!((12, 3).to_args_key(), (1, 23).to_args_key());
/// assert_eq!(42u32.to_args_key(), "42");
/// assert_eq!(("a", 1).to_args_key(), "\"a\"\u{1f}1");
/// ```
pub trait KeyArgs {
    fn write_key(&self, out: &mut String);

    fn to_args_key(&self) -> String {
        let mut out = String::new();
        self.write_key(&mut out);
        out
    }
}

/// Appends `part` to `out`, escaping the separator and escape characters.
pub fn push_escaped(out: &mut String, part: &str) {
    if !part.contains(|c: char| c == KEY_SEPARATOR || c == KEY_ESCAPE) {
        out.push_str(part);
        return;
    }
    for c in part.chars() {
        if c == KEY_SEPARATOR || c == KEY_ESCAPE {
            out.push(KEY_ESCAPE);
        }
        out.push(c);
    }
}

fn join_parts(out: &mut String, parts: &[String]) {
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(KEY_SEPARATOR);
        }
        push_escaped(out, part);
    }
}

macro_rules! single_arg_key {
    ($($ty:ty),* $(,)?) => {
        $(
            impl KeyArgs for $ty {
                fn write_key(&self, out: &mut String) {
                    out.push_str(&self.to_cache_key());
                }
            }
        )*
    };
}

single_arg_key!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String
);

impl KeyArgs for () {
    fn write_key(&self, _out: &mut String) {}
}

impl<T: CacheableKey + ?Sized> KeyArgs for &T {
    fn write_key(&self, out: &mut String) {
        out.push_str(&(**self).to_cache_key());
    }
}

impl<T: CacheableKey + ?Sized> KeyArgs for Box<T> {
    fn write_key(&self, out: &mut String) {
        out.push_str(&(**self).to_cache_key());
    }
}

impl<T> KeyArgs for Option<T>
where
    Option<T>: CacheableKey,
{
    fn write_key(&self, out: &mut String) {
        out.push_str(&self.to_cache_key());
    }
}

impl<T> KeyArgs for Vec<T>
where
    Vec<T>: CacheableKey,
{
    fn write_key(&self, out: &mut String) {
        out.push_str(&self.to_cache_key());
    }
}

macro_rules! tuple_key_args {
    ($($name:ident),+) => {
        impl<$($name: CacheableKey),+> KeyArgs for ($($name,)+) {
            #[allow(non_snake_case)]
            fn write_key(&self, out: &mut String) {
                let ($($name,)+) = self;
                join_parts(out, &[$($name.to_cache_key()),+]);
            }
        }
    };
}

tuple_key_args!(A);
tuple_key_args!(A, B);
tuple_key_args!(A, B, C);
tuple_key_args!(A, B, C, D);
tuple_key_args!(A, B, C, D, E);
tuple_key_args!(A, B, C, D, E, F);
tuple_key_args!(A, B, C, D, E, F, G);
tuple_key_args!(A, B, C, D, E, F, G, H);
