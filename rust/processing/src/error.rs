// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for building conversion.

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole conversion.
///
/// Failures of individual walls, openings or stairs never surface here; they
/// are recorded as [`Unparsable`](crate::building::Unparsable) entries.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The building has no storeys to convert.
    #[error("building has no storeys")]
    NoStoreys,

    /// A storey elevation is NaN or infinite.
    #[error("storey {index} has a non-finite elevation")]
    InvalidElevation { index: usize },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
