// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use thiserror::Error;

/// The library's error type
///
/// Each variant is one error kind of the PSA driver taxonomy. No message
/// carries key material or names the internal check that failed.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PakeError {
    /// The algorithm, primitive or hash in the cipher suite is not supported,
    /// or the combination is incompatible
    #[error("Unsupported cipher suite or parameter")]
    NotSupported,
    /// An internal buffer could not be allocated
    #[error("Insufficient memory")]
    InsufficientMemory,
    /// An internal invariant was violated; the operation has been wiped
    #[error("Internal corruption detected")]
    CorruptionDetected,
    /// The caller-supplied output buffer is too small; nothing was written
    #[error("Output buffer too small, {required} bytes required")]
    BufferTooSmall {
        /// The exact number of bytes the call needs
        required: usize,
    },
    /// The random source failed to produce output
    #[error("Insufficient entropy")]
    InsufficientEntropy,
    /// The call does not match the step expected by the operation
    #[error("Operation is not in a state that permits this call")]
    BadState,
    /// A zero-knowledge proof or key confirmation tag failed to verify
    #[error("Verification failed")]
    InvalidSignature,
    /// A caller-supplied argument is invalid
    #[error("Invalid argument")]
    InvalidArgument,
    /// The key policy of the password does not permit this use
    #[error("Not permitted by key policy")]
    NotPermitted,
    /// Input decoded correctly but is not a valid value for the group
    #[error("Data corrupt")]
    DataCorrupt,
    /// Input is not a well-formed encoding
    #[error("Data invalid")]
    DataInvalid,
}

impl PakeError {
    /// Whether this error means the peer's data was rejected, as opposed to a
    /// caller or resource problem
    pub fn is_integrity_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidSignature | Self::DataCorrupt | Self::DataInvalid
        )
    }
}

impl From<hmac::digest::InvalidLength> for PakeError {
    fn from(_: hmac::digest::InvalidLength) -> Self {
        Self::CorruptionDetected
    }
}

impl From<hkdf::InvalidLength> for PakeError {
    fn from(_: hkdf::InvalidLength) -> Self {
        Self::CorruptionDetected
    }
}

impl From<hmac::digest::MacError> for PakeError {
    fn from(_: hmac::digest::MacError) -> Self {
        Self::InvalidSignature
    }
}

impl From<rand_core::Error> for PakeError {
    fn from(_: rand_core::Error) -> Self {
        Self::InsufficientEntropy
    }
}

impl From<std::collections::TryReserveError> for PakeError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::InsufficientMemory
    }
}
