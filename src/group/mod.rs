// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Includes the `JpakeGroup` trait and the groups J-PAKE runs over

#[cfg(feature = "ristretto255")]
mod ristretto255;
mod secp256r1;
#[cfg(test)]
mod tests;

use core::ops::{Add, Mul, Sub};

#[cfg(feature = "ristretto255")]
pub(crate) use ristretto255::Ristretto255;
pub(crate) use secp256r1::Secp256r1;
use sha2::digest::core_api::BlockSizeUser;
use sha2::Digest;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::PakeError;

/// A prime-order group together with the hash J-PAKE uses over it
pub(crate) trait JpakeGroup {
    /// Element of the scalar field
    type Scalar: Copy
        + Zeroize
        + ConstantTimeEq
        + From<u64>
        + Add<Output = Self::Scalar>
        + Sub<Output = Self::Scalar>
        + Mul<Output = Self::Scalar>;
    /// Group element
    type Element: Copy
        + ConstantTimeEq
        + Add<Output = Self::Element>
        + Sub<Output = Self::Element>
        + Mul<Self::Scalar, Output = Self::Element>;
    /// Hash used for proofs, key confirmation and the transcript
    type Hash: Digest + BlockSizeUser + Clone;

    /// Length of an encoded element
    const ELEMENT_LEN: usize;
    /// Length of an encoded scalar
    const SCALAR_LEN: usize;
    /// Output length of [`Self::Hash`]
    const TAG_LEN: usize;

    /// The fixed base point
    fn generator() -> Self::Element;

    /// The neutral element
    fn identity() -> Self::Element;

    /// Write the canonical encoding of `element` into `out`, which must be
    /// exactly [`Self::ELEMENT_LEN`] bytes
    fn encode_element(element: &Self::Element, out: &mut [u8]) -> Result<(), PakeError>;

    /// Parse an element. Wrong length or format is `DataInvalid`; a point
    /// that is not in the group, or the identity, is `DataCorrupt`.
    fn decode_element(bytes: &[u8]) -> Result<Self::Element, PakeError>;

    /// Write the canonical encoding of `scalar` into `out`, which must be
    /// exactly [`Self::SCALAR_LEN`] bytes
    fn encode_scalar(scalar: &Self::Scalar, out: &mut [u8]) -> Result<(), PakeError>;

    /// Parse a proof response
    fn decode_scalar(bytes: &[u8]) -> Result<Self::Scalar, PakeError>;

    /// The additive identity of the scalar field
    fn zero() -> Self::Scalar {
        Self::Scalar::from(0u64)
    }

    /// Interpret `bytes` as a big-endian integer and reduce it modulo the
    /// group order
    fn reduce_be_bytes(bytes: &[u8]) -> Self::Scalar {
        let radix = Self::Scalar::from(256u64);
        bytes.iter().fold(Self::zero(), |acc, byte| {
            acc * radix + Self::Scalar::from(u64::from(*byte))
        })
    }

    /// Sample a non-zero scalar from 64 bytes of `rng` output
    fn random_scalar<R: rand_core::RngCore + rand_core::CryptoRng>(
        rng: &mut R,
    ) -> Result<Self::Scalar, PakeError> {
        let mut wide = Zeroizing::new([0u8; 64]);
        rng.try_fill_bytes(&mut wide[..])?;
        let scalar = Self::reduce_be_bytes(&wide[..]);
        if Self::is_zero_scalar(&scalar) {
            return Err(PakeError::InsufficientEntropy);
        }
        Ok(scalar)
    }

    /// Whether `scalar` is zero, in constant time
    fn is_zero_scalar(scalar: &Self::Scalar) -> bool {
        bool::from(scalar.ct_eq(&Self::zero()))
    }

    /// Whether `element` is the identity, in constant time
    fn is_identity(element: &Self::Element) -> bool {
        bool::from(element.ct_eq(&Self::identity()))
    }
}
