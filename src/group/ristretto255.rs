// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::traits::Identity;
use curve25519_dalek::Scalar;

use super::JpakeGroup;
use crate::errors::PakeError;
use crate::sizes::{RISTRETTO255_ELEMENT_LEN, RISTRETTO255_SCALAR_LEN, RISTRETTO255_TAG_LEN};

/// The ristretto255 group with SHA-512
pub(crate) struct Ristretto255;

impl JpakeGroup for Ristretto255 {
    type Scalar = Scalar;
    type Element = RistrettoPoint;
    type Hash = sha2::Sha512;

    const ELEMENT_LEN: usize = RISTRETTO255_ELEMENT_LEN;
    const SCALAR_LEN: usize = RISTRETTO255_SCALAR_LEN;
    const TAG_LEN: usize = RISTRETTO255_TAG_LEN;

    fn generator() -> RistrettoPoint {
        RISTRETTO_BASEPOINT_POINT
    }

    fn identity() -> RistrettoPoint {
        RistrettoPoint::identity()
    }

    fn encode_element(element: &RistrettoPoint, out: &mut [u8]) -> Result<(), PakeError> {
        if out.len() != Self::ELEMENT_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(element.compress().as_bytes());
        Ok(())
    }

    fn decode_element(bytes: &[u8]) -> Result<RistrettoPoint, PakeError> {
        let point = CompressedRistretto::from_slice(bytes)
            .map_err(|_| PakeError::DataInvalid)?
            .decompress()
            .ok_or(PakeError::DataInvalid)?;
        if Self::is_identity(&point) {
            return Err(PakeError::DataCorrupt);
        }
        Ok(point)
    }

    fn encode_scalar(scalar: &Scalar, out: &mut [u8]) -> Result<(), PakeError> {
        if out.len() != Self::SCALAR_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(scalar.as_bytes());
        Ok(())
    }

    fn decode_scalar(bytes: &[u8]) -> Result<Scalar, PakeError> {
        let bytes: [u8; RISTRETTO255_SCALAR_LEN] =
            bytes.try_into().map_err(|_| PakeError::DataInvalid)?;
        Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(PakeError::DataCorrupt)
    }
}
