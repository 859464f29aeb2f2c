//! Growable byte buffer and path/tempfile utilities.
//!
//! [`StringBuf`] is the workhorse accumulator used throughout the build
//! core for assembling spec-file sections, script bodies, and changelog
//! text before they are macro-expanded or handed to a child process. It
//! grows by reallocation like a normal `Vec<u8>` — there is no chunked
//! free list here, unlike the original C implementation, because Rust's
//! allocator already amortizes growth and a hand-rolled chunk list would
//! just be slower and harder to reason about.
//!
//! The only failure mode for buffer operations is allocation failure,
//! which Rust treats as fatal (abort) rather than a recoverable error,
//! matching the original's "No errors except allocation failure (fatal)"
//! contract.

mod path;

pub use path::{TempFile, TempFileError, join};

/// A growable, appendable byte buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuf {
    data: Vec<u8>,
}

impl StringBuf {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an empty buffer with room for at least `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Appends `bytes` verbatim.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Appends `bytes` followed by a single `\n`.
    pub fn append_line(&mut self, bytes: &[u8]) {
        self.append(bytes);
        self.data.push(b'\n');
    }

    /// Returns the buffer's current contents.
    pub fn get(&self) -> &[u8] {
        &self.data
    }

    /// Returns the buffer's contents as `str`, if valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Empties the buffer without releasing its allocation.
    pub fn truncate(&mut self) {
        self.data.clear();
    }

    /// Removes trailing space, tab, `\r`, and `\n` bytes.
    pub fn strip_trailing_whitespace(&mut self) {
        while matches!(self.data.last(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.data.pop();
        }
    }

    /// Returns `true` if the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the number of bytes currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

impl From<&[u8]> for StringBuf {
    fn from(bytes: &[u8]) -> Self {
        let mut sb = Self::new();
        sb.append(bytes);
        sb
    }
}

impl From<&str> for StringBuf {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes())
    }
}
