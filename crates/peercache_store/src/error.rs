// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for value access.

/// Returned by [`ByteView::byte_at`](crate::ByteView::byte_at) when the index is past the end.
///
/// # Example
///
/// ```
/// use peercache_store::ByteView;
///
/// let view = ByteView::from("abc");
/// let error = view.byte_at(3).unwrap_err();
/// assert_eq!(error.index(), 3);
/// assert_eq!(error.len(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("index {index} is out of range for a view of {len} bytes")]
pub struct OutOfRange {
    index: usize,
    len: usize,
}

impl OutOfRange {
    pub(crate) fn new(index: usize, len: usize) -> Self {
        Self { index, len }
    }

    /// The index that was requested.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The length of the view at the time of the request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the view was empty, in which case every index is out of range.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
