//! Safety limits for the wire codec.
//!
//! [`WireOptions`] bounds everything an untrusted stream could use to make
//! the reader allocate or recurse without limit. The serializer applies the
//! same bounds so that anything it writes can be read back with the same
//! options.
//!
//! ## Examples
//!
//! ```rust
//! use polyvalue::{from_slice_with_options, to_vec, value, Error, WireOptions};
//!
//! let nested = value!({ "a": { "b": { "c": 1i32 } } });
//! let bytes = to_vec(&nested).unwrap();
//!
//! let shallow = WireOptions::new().with_max_depth(2);
//! assert!(matches!(
//!     from_slice_with_options(&bytes, shallow),
//!     Err(Error::ResourceLimitExceeded { what: "nesting depth", .. })
//! ));
//! ```

/// Default maximum map nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum number of entries in one map.
pub const DEFAULT_MAX_MAP_ENTRIES: u32 = 1 << 20;

/// Default maximum length of a map key in bytes.
pub const DEFAULT_MAX_KEY_LEN: u32 = 64 * 1024;

/// Default maximum declared size of one frame in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Bounds applied while reading and writing streams.
///
/// The top-level value sits at depth 0; each map level below it adds one.
///
/// # Examples
///
/// ```rust
/// use polyvalue::WireOptions;
///
/// let options = WireOptions::new()
///     .with_max_depth(8)
///     .with_max_map_entries(1024)
///     .with_max_key_len(256)
///     .with_max_frame_size(1 << 20);
/// assert_eq!(options.max_depth, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireOptions {
    pub max_depth: usize,
    pub max_map_entries: u32,
    pub max_key_len: u32,
    pub max_frame_size: u32,
}

impl Default for WireOptions {
    fn default() -> Self {
        WireOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            max_map_entries: DEFAULT_MAX_MAP_ENTRIES,
            max_key_len: DEFAULT_MAX_KEY_LEN,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl WireOptions {
    /// Creates the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_map_entries(mut self, entries: u32) -> Self {
        self.max_map_entries = entries;
        self
    }

    #[must_use]
    pub fn with_max_key_len(mut self, len: u32) -> Self {
        self.max_key_len = len;
        self
    }

    /// Sets the largest accepted `TotalSize` prefix.
    #[must_use]
    pub fn with_max_frame_size(mut self, size: u32) -> Self {
        self.max_frame_size = size;
        self
    }
}
