// Copyright 2025 the ScrollStory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy shared by every ScrollStory crate.
//!
//! Lookups never fail with an error: a missing id or index is reported as
//! `None`. Only structural problems found while ingesting content or parsing
//! configuration surface here.

/// Errors raised while building or configuring a story.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Malformed input: duplicate ids, unparsable offsets, wrongly typed
    /// categories or tags, and similar caller mistakes.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Content ingestion resolved to zero items.
    #[error("misconfigured content: no items were found")]
    MisconfiguredContent,
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }
}

/// Result alias using [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;
