// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use bytes::Bytes;

use crate::OutOfRange;

/// An immutable view over cached bytes.
///
/// `ByteView` is the value type stored in and returned by a cache group. Its contents never
/// change after construction. Accessors that hand out owned bytes return a copy, so a caller
/// can never modify cached data through a value it received. Cloning is cheap: clones share
/// the same underlying buffer.
///
/// # Examples
///
/// ```
/// use peercache_store::ByteView;
///
/// let view = ByteView::from("630");
/// assert_eq!(view.len(), 3);
/// assert_eq!(view.as_string(), "630");
///
/// let mut copy = view.bytes();
/// copy[0] = b'9';
/// assert_eq!(view.as_string(), "630");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    bytes: Bytes,
}

impl ByteView {
    /// Creates a view by copying `data`.
    #[must_use]
    pub fn copy_from_slice(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    /// Returns the number of bytes in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the view holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns a copy of the viewed bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }

    /// Returns the byte at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange`] if `index` is not below [`len`](Self::len).
    pub fn byte_at(&self, index: usize) -> Result<u8, OutOfRange> {
        self.bytes
            .get(index)
            .copied()
            .ok_or_else(|| OutOfRange::new(index, self.bytes.len()))
    }

    /// Returns a copy of the bytes interpreted as UTF-8 text.
    ///
    /// Invalid sequences are replaced with `U+FFFD`.
    #[must_use]
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

impl AsRef<[u8]> for ByteView {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl From<Vec<u8>> for ByteView {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes: bytes.into() }
    }
}

impl From<Bytes> for ByteView {
    fn from(bytes: Bytes) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for ByteView {
    fn from(bytes: &[u8]) -> Self {
        Self::copy_from_slice(bytes)
    }
}

impl From<String> for ByteView {
    fn from(text: String) -> Self {
        Self::from(text.into_bytes())
    }
}

impl From<&str> for ByteView {
    fn from(text: &str) -> Self {
        Self::copy_from_slice(text.as_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Debug for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteView").field("len", &self.bytes.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_at_checks_bounds() {
        let view = ByteView::from("ab");
        assert_eq!(view.byte_at(0), Ok(b'a'));
        assert_eq!(view.byte_at(1), Ok(b'b'));
        assert_eq!(view.byte_at(2), Err(OutOfRange::new(2, 2)));
    }

    #[test]
    fn byte_at_on_empty_view() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert!(view.byte_at(0).expect_err("empty view has no bytes").is_empty());
    }

    #[test]
    fn copy_from_slice_detaches_from_source() {
        let mut source = vec![1_u8, 2, 3];
        let view = ByteView::copy_from_slice(&source);
        source[0] = 9;
        assert_eq!(view.bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn debug_does_not_dump_contents() {
        let view = ByteView::from("secret-token");
        let debug_str = format!("{view:?}");
        assert!(debug_str.contains("len: 12"));
        assert!(!debug_str.contains("secret"));
    }
}
