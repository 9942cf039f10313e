// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use super::*;
use crate::errors::PakeError;
use rand_core::OsRng;

/// Uncompressed encoding of the P-256 base point, from SEC 2
const P256_GENERATOR: &str = "046b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c2964fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5";
/// Order of the P-256 group
const P256_ORDER: &str = "ffffffff00000000ffffffffffffffffbce6faada7179e84f3b9cac2fc632551";

fn encode_element<G: JpakeGroup>(element: &G::Element) -> Vec<u8> {
    let mut out = vec![0u8; G::ELEMENT_LEN];
    G::encode_element(element, &mut out).expect("Could not encode element");
    out
}

fn encode_scalar<G: JpakeGroup>(scalar: &G::Scalar) -> Vec<u8> {
    let mut out = vec![0u8; G::SCALAR_LEN];
    G::encode_scalar(scalar, &mut out).expect("Could not encode scalar");
    out
}

#[test]
fn test_secp256r1_generator_encoding() {
    let encoded = encode_element::<Secp256r1>(&Secp256r1::generator());
    assert_eq!(P256_GENERATOR, hex::encode(&encoded));
    let decoded = Secp256r1::decode_element(&encoded).expect("Could not decode generator");
    assert!(bool::from(decoded.ct_eq(&Secp256r1::generator())));
}

#[test]
fn test_secp256r1_reduce_be_bytes() {
    let order = hex::decode(P256_ORDER).unwrap();
    assert!(Secp256r1::is_zero_scalar(&Secp256r1::reduce_be_bytes(&order)));

    let one_more = Secp256r1::reduce_be_bytes(&[0x01, 0x00]);
    assert_eq!(encode_scalar::<Secp256r1>(&one_more)[30..], [0x01, 0x00]);

    // Leading zeros do not change the value
    let padded = Secp256r1::reduce_be_bytes(&[0, 0, 0, 0x01, 0x00]);
    assert!(bool::from(padded.ct_eq(&one_more)));
}

#[test]
fn test_secp256r1_element_rejections() {
    let mut encoded = hex::decode(P256_GENERATOR).unwrap();

    assert_eq!(
        Secp256r1::decode_element(&encoded[..64]).err(),
        Some(PakeError::DataInvalid)
    );
    assert_eq!(Secp256r1::decode_element(&[]).err(), Some(PakeError::DataInvalid));

    // Compressed form is not accepted
    let mut compressed = encoded[..33].to_vec();
    compressed[0] = 0x03;
    assert_eq!(
        Secp256r1::decode_element(&compressed).err(),
        Some(PakeError::DataInvalid)
    );

    // Flip a bit of y: the point leaves the curve
    encoded[64] ^= 0x01;
    assert_eq!(
        Secp256r1::decode_element(&encoded).err(),
        Some(PakeError::DataCorrupt)
    );
}

#[test]
fn test_secp256r1_scalar_decoding() {
    let short = Secp256r1::decode_scalar(&[0x01, 0x00]).expect("Short scalar must be accepted");
    assert!(bool::from(short.ct_eq(&p256::Scalar::from(256u64))));

    assert_eq!(Secp256r1::decode_scalar(&[]).err(), Some(PakeError::DataInvalid));
    assert_eq!(
        Secp256r1::decode_scalar(&[0u8; 33]).err(),
        Some(PakeError::DataInvalid)
    );
    let order = hex::decode(P256_ORDER).unwrap();
    assert_eq!(
        Secp256r1::decode_scalar(&order).err(),
        Some(PakeError::DataCorrupt)
    );
}

#[test]
fn test_secp256r1_identity_is_not_encodable() {
    let mut out = [0u8; 65];
    assert_eq!(
        Secp256r1::encode_element(&Secp256r1::identity(), &mut out),
        Err(PakeError::CorruptionDetected)
    );
}

#[test]
fn test_random_scalars_are_distinct() {
    let a = Secp256r1::random_scalar(&mut OsRng).unwrap();
    let b = Secp256r1::random_scalar(&mut OsRng).unwrap();
    assert!(!Secp256r1::is_zero_scalar(&a));
    assert!(!bool::from(a.ct_eq(&b)));
}

#[test]
fn test_group_law_round_trip() {
    let x = Secp256r1::random_scalar(&mut OsRng).unwrap();
    let y = Secp256r1::random_scalar(&mut OsRng).unwrap();
    let g = Secp256r1::generator();
    let lhs = g * (x + y);
    let rhs = g * x + g * y;
    assert_eq!(
        encode_element::<Secp256r1>(&lhs),
        encode_element::<Secp256r1>(&rhs)
    );
    assert!(Secp256r1::is_identity(&(lhs - rhs)));
}

#[cfg(feature = "ristretto255")]
mod ristretto {
    use super::*;

    /// Compressed ristretto255 base point, from RFC 9496
    const RISTRETTO_GENERATOR: &str =
        "e2f2ae0a6abc4e71a884a961c500515f58e30b6aa582dd8db6a65945e08d2d76";
    /// Order of the ristretto255 group, big-endian
    const RISTRETTO_ORDER: &str =
        "1000000000000000000000000000000014def9dea2f79cd65812631a5cf5d3ed";

    #[test]
    fn test_ristretto255_generator_encoding() {
        let encoded = encode_element::<Ristretto255>(&Ristretto255::generator());
        assert_eq!(RISTRETTO_GENERATOR, hex::encode(&encoded));
        let decoded = Ristretto255::decode_element(&encoded).unwrap();
        assert!(bool::from(decoded.ct_eq(&Ristretto255::generator())));
    }

    #[test]
    fn test_ristretto255_reduce_be_bytes() {
        let order = hex::decode(RISTRETTO_ORDER).unwrap();
        assert!(Ristretto255::is_zero_scalar(&Ristretto255::reduce_be_bytes(
            &order
        )));

        // Scalars are encoded little-endian
        let value = Ristretto255::reduce_be_bytes(&[0x01, 0x02]);
        let encoded = encode_scalar::<Ristretto255>(&value);
        assert_eq!(encoded[..2], [0x02, 0x01]);
        assert!(encoded[2..].iter().all(|byte| *byte == 0));
    }

    #[test]
    fn test_ristretto255_rejections() {
        assert_eq!(
            Ristretto255::decode_element(&[0u8; 32]).err(),
            Some(PakeError::DataCorrupt)
        );
        assert_eq!(
            Ristretto255::decode_element(&[0u8; 31]).err(),
            Some(PakeError::DataInvalid)
        );
        // Not a canonical field element
        assert_eq!(
            Ristretto255::decode_element(&[0xff; 32]).err(),
            Some(PakeError::DataInvalid)
        );

        assert_eq!(
            Ristretto255::decode_scalar(&[0u8; 31]).err(),
            Some(PakeError::DataInvalid)
        );
        assert_eq!(
            Ristretto255::decode_scalar(&[0xff; 32]).err(),
            Some(PakeError::DataCorrupt)
        );
    }
}
