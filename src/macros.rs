/// Builds a [`Value`](crate::Value) from a literal-like description.
///
/// - `{}` and `{ "key": value, ... }` build maps; values nest.
/// - `[a, b, c]` builds a vector; the element type comes from the
///   expressions, so suffix literals (`[1u8, 2, 3]`).
/// - Anything else is converted with `Value::from`.
///
/// Vectors go through `Value::from`, which panics if the encoded block would
/// exceed the `u32` size field. Build very large vectors with
/// [`Value::try_from_slice`](crate::Value::try_from_slice) instead.
///
/// Map values are single token trees, so negative numbers and other
/// compound expressions need parentheses: `{ "t": (-4i32) }`.
///
/// ```rust
/// use polyvalue::value;
///
/// let v = value!({
///     "id": 7u32,
///     "gain": (-1.5f64),
///     "samples": [1i16, 2, 3],
///     "meta": { "ok": 1u8 }
/// });
/// assert_eq!(v.to_string(), "{ gain: -1.5, id: 7, meta: { ok: 1 }, samples: [1, 2, 3] }");
/// ```
#[macro_export]
macro_rules! value {
    ({}) => {
        $crate::Value::map()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut entries = $crate::ValueMap::new();
        $(
            entries.insert($key, $crate::value!($value));
        )*
        $crate::Value::from(entries)
    }};

    ([ $($elem:expr),+ $(,)? ]) => {
        $crate::Value::from(vec![$($elem),+])
    };

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
