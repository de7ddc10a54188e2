// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for group operations and group configuration.

use std::sync::Arc;

use uniflight::LeaderPanicked;

/// Boxed error returned by getters and peers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error from [`Group::get`](crate::Group::get).
///
/// Errors are `Clone` because a single failed load is reported to every caller that was
/// waiting on it.
#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested key was empty.
    #[error("key is required")]
    EmptyKey,

    /// The group's getter failed to produce a value. The getter's error is carried verbatim.
    #[error(transparent)]
    Getter(Arc<dyn std::error::Error + Send + Sync>),

    /// The getter or a peer panicked while loading the value.
    #[error(transparent)]
    Panicked(#[from] LeaderPanicked),
}

impl Error {
    pub(crate) fn getter(source: BoxError) -> Self {
        Self::Getter(Arc::from(source))
    }

    /// Returns the getter's error if this is a [`Error::Getter`].
    ///
    /// # Example
    ///
    /// ```
    /// use peercache::Error;
    ///
    /// assert!(Error::EmptyKey.getter_error().is_none());
    /// ```
    #[must_use]
    pub fn getter_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Getter(source) => Some(&**source),
            _ => None,
        }
    }
}

/// A wiring mistake detected while configuring groups.
///
/// These represent programmer misuse rather than runtime conditions. They are returned
/// instead of panicking so the composition root decides how to fail; usually it aborts.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A group was built without a getter.
    #[error("group `{0}` has no getter")]
    MissingGetter(String),

    /// A group with this name is already registered.
    #[error("group `{0}` already exists")]
    DuplicateGroup(String),

    /// Peers were already registered for this group.
    #[error("peers are already registered for group `{0}`")]
    PeersAlreadyRegistered(String),
}
