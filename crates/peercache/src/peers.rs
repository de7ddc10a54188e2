// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Peer capabilities consumed by a group.
//!
//! A group never talks to the network itself. It asks a [`PeerPicker`] which peer owns a
//! key and then calls that [`Peer`]. How peers are chosen (consistent hashing, static
//! tables) and how requests travel (HTTP, gRPC, in-process) belongs to the implementations.

use std::{fmt, sync::Arc};

use crate::BoxError;

/// A request for one key of one group, sent to a peer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    group: String,
    key: String,
}

impl FetchRequest {
    /// Creates a request for `key` in `group`.
    #[must_use]
    pub fn new(group: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            key: key.into(),
        }
    }

    /// The name of the group the key belongs to.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The requested key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A peer's answer to a [`FetchRequest`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FetchResponse {
    value: Vec<u8>,
}

impl FetchResponse {
    /// Creates a response carrying `value`.
    #[must_use]
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self { value: value.into() }
    }

    /// The returned bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consumes the response and returns its bytes.
    #[must_use]
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }
}

/// Remote-call abstraction for a single peer.
///
/// Implementations own transport concerns, including timeouts: a group awaits the call
/// without imposing a deadline of its own.
#[dynosaur::dynosaur(pub(crate) DynPeerGetter = dyn(box) PeerGetter, bridge(none))]
pub trait PeerGetter: Send + Sync {
    /// Fetches the value described by `request` from the peer.
    fn get(&self, request: &FetchRequest) -> impl Future<Output = Result<FetchResponse, BoxError>> + Send;
}

/// A clonable, type-erased handle to a peer.
///
/// # Examples
///
/// ```
/// use peercache::{BoxError, FetchRequest, FetchResponse, Peer, PeerGetter};
///
/// struct Echo;
///
/// impl PeerGetter for Echo {
///     async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, BoxError> {
///         Ok(FetchResponse::new(request.key().as_bytes()))
///     }
/// }
///
/// let peer = Peer::new("http://10.0.0.2:8001", Echo);
/// assert_eq!(peer.name(), "http://10.0.0.2:8001");
/// ```
#[derive(Clone)]
pub struct Peer {
    name: Arc<str>,
    getter: Arc<DynPeerGetter<'static>>,
}

impl Peer {
    /// Wraps `getter` as a peer identified by `name` (typically its address).
    pub fn new(name: impl Into<Arc<str>>, getter: impl PeerGetter + 'static) -> Self {
        Self {
            name: name.into(),
            getter: DynPeerGetter::new_arc(getter),
        }
    }

    /// The peer's name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches the value described by `request` from this peer.
    ///
    /// # Errors
    ///
    /// Returns whatever error the peer's transport reports.
    pub async fn get(&self, request: &FetchRequest) -> Result<FetchResponse, BoxError> {
        self.getter.get(request).await
    }
}

impl fmt::Debug for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Selects the peer responsible for a key.
///
/// Returning `None` means no remote peer owns the key (for example, it is owned by this
/// process) and the group should load it locally.
pub trait PeerPicker: Send + Sync {
    /// Returns the peer that owns `key`, if it is not this process.
    fn pick_peer(&self, key: &str) -> Option<Peer>;
}

impl<P> PeerPicker for Arc<P>
where
    P: PeerPicker + ?Sized,
{
    fn pick_peer(&self, key: &str) -> Option<Peer> {
        (**self).pick_peer(key)
    }
}
