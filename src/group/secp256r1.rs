// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::PrimeField;
use p256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar};

use super::JpakeGroup;
use crate::errors::PakeError;
use crate::sizes::{SECP256R1_ELEMENT_LEN, SECP256R1_SCALAR_LEN, SECP256R1_TAG_LEN};

/// SEC1 tag of an uncompressed point
const UNCOMPRESSED_TAG: u8 = 0x04;

/// The NIST P-256 curve with SHA-256.
///
/// Elements travel as uncompressed SEC1 points and scalars as 32-byte
/// big-endian integers, the encoding used by TLS and Thread EC J-PAKE.
pub(crate) struct Secp256r1;

impl JpakeGroup for Secp256r1 {
    type Scalar = Scalar;
    type Element = ProjectivePoint;
    type Hash = sha2::Sha256;

    const ELEMENT_LEN: usize = SECP256R1_ELEMENT_LEN;
    const SCALAR_LEN: usize = SECP256R1_SCALAR_LEN;
    const TAG_LEN: usize = SECP256R1_TAG_LEN;

    fn generator() -> ProjectivePoint {
        ProjectivePoint::GENERATOR
    }

    fn identity() -> ProjectivePoint {
        ProjectivePoint::IDENTITY
    }

    fn encode_element(element: &ProjectivePoint, out: &mut [u8]) -> Result<(), PakeError> {
        let encoded = element.to_affine().to_encoded_point(false);
        let bytes = encoded.as_bytes();
        // The identity encodes to a single byte and is never a valid public value
        if bytes.len() != Self::ELEMENT_LEN || out.len() != Self::ELEMENT_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(bytes);
        Ok(())
    }

    fn decode_element(bytes: &[u8]) -> Result<ProjectivePoint, PakeError> {
        if bytes.len() != Self::ELEMENT_LEN || bytes[0] != UNCOMPRESSED_TAG {
            return Err(PakeError::DataInvalid);
        }
        let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| PakeError::DataInvalid)?;
        let point = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
            .map(ProjectivePoint::from)
            .ok_or(PakeError::DataCorrupt)?;
        if Self::is_identity(&point) {
            return Err(PakeError::DataCorrupt);
        }
        Ok(point)
    }

    fn encode_scalar(scalar: &Scalar, out: &mut [u8]) -> Result<(), PakeError> {
        if out.len() != Self::SCALAR_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(&scalar.to_repr());
        Ok(())
    }

    // Leading zero bytes may be stripped by the sender, so anything from one
    // to 32 bytes is left-padded before the range check.
    fn decode_scalar(bytes: &[u8]) -> Result<Scalar, PakeError> {
        if bytes.is_empty() || bytes.len() > Self::SCALAR_LEN {
            return Err(PakeError::DataInvalid);
        }
        let mut repr = FieldBytes::default();
        repr[Self::SCALAR_LEN - bytes.len()..].copy_from_slice(bytes);
        Option::from(Scalar::from_repr(repr)).ok_or(PakeError::DataCorrupt)
    }
}
