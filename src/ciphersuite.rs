// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The cipher suite descriptor: which PAKE algorithm runs over which group
//! with which hash

use crate::errors::PakeError;

/// A PAKE algorithm identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// J-PAKE (RFC 8236) with Schnorr proofs (RFC 8235) and explicit key
    /// confirmation
    Jpake,
    /// SPAKE2+; recognized but not implemented by this driver
    Spake2Plus,
}

/// The kind of algebraic structure a primitive lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// An elliptic curve group
    Ecc,
    /// A finite-field Diffie-Hellman group
    Dh,
}

/// The family a primitive belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// NIST prime-field Weierstrass curves (secp256r1, secp384r1, ...)
    SecpR1,
    /// Brainpool curves
    BrainpoolR1,
    /// The ristretto prime-order group over Curve25519
    Ristretto,
    /// RFC 7919 finite-field groups
    Ffdhe,
}

/// The group a PAKE operates in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Primitive {
    /// Curve or finite-field
    pub primitive_type: PrimitiveType,
    /// Family within the type
    pub family: Family,
    /// Group size in bits
    pub bits: u16,
}

impl Primitive {
    /// secp256r1, also known as P-256
    pub const SECP256R1: Self = Self::new(PrimitiveType::Ecc, Family::SecpR1, 256);
    /// ristretto255
    pub const RISTRETTO255: Self = Self::new(PrimitiveType::Ecc, Family::Ristretto, 255);

    /// Create a new [`Primitive`]
    pub const fn new(primitive_type: PrimitiveType, family: Family, bits: u16) -> Self {
        Self {
            primitive_type,
            family,
            bits,
        }
    }
}

/// A hash algorithm identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// The groups this driver has arithmetic for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GroupId {
    Secp256r1,
    #[cfg(feature = "ristretto255")]
    Ristretto255,
}

impl GroupId {
    /// Map a primitive to a supported group, if any
    pub(crate) const fn from_primitive(primitive: Primitive) -> Option<Self> {
        match (primitive.primitive_type, primitive.family, primitive.bits) {
            (PrimitiveType::Ecc, Family::SecpR1, 256) => Some(Self::Secp256r1),
            #[cfg(feature = "ristretto255")]
            (PrimitiveType::Ecc, Family::Ristretto, 255) => Some(Self::Ristretto255),
            _ => None,
        }
    }

    /// The only hash this group is paired with
    pub(crate) const fn hash(self) -> HashAlgorithm {
        match self {
            Self::Secp256r1 => HashAlgorithm::Sha256,
            #[cfg(feature = "ristretto255")]
            Self::Ristretto255 => HashAlgorithm::Sha512,
        }
    }
}

/// Describes the algorithm, primitive and hash used by an operation.
///
/// The descriptor is plain data: any combination can be built, and
/// compatibility is checked once, when the operation is set up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CipherSuite {
    algorithm: Algorithm,
    primitive: Primitive,
    hash: HashAlgorithm,
}

impl CipherSuite {
    /// Create a new [`CipherSuite`]
    pub const fn new(algorithm: Algorithm, primitive: Primitive, hash: HashAlgorithm) -> Self {
        Self {
            algorithm,
            primitive,
            hash,
        }
    }

    /// J-PAKE over secp256r1 with SHA-256, the suite used by Thread and TLS
    /// EC J-PAKE
    pub const fn jpake_secp256r1_sha256() -> Self {
        Self::new(Algorithm::Jpake, Primitive::SECP256R1, HashAlgorithm::Sha256)
    }

    /// J-PAKE over ristretto255 with SHA-512
    #[cfg(feature = "ristretto255")]
    pub const fn jpake_ristretto255_sha512() -> Self {
        Self::new(
            Algorithm::Jpake,
            Primitive::RISTRETTO255,
            HashAlgorithm::Sha512,
        )
    }

    /// The PAKE algorithm
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// The group
    pub const fn primitive(&self) -> Primitive {
        self.primitive
    }

    /// The hash used for proofs, confirmation and the transcript
    pub const fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Check that algorithm, primitive and hash are supported together
    pub(crate) fn resolve(&self) -> Result<GroupId, PakeError> {
        if self.algorithm != Algorithm::Jpake {
            return Err(PakeError::NotSupported);
        }
        let group = GroupId::from_primitive(self.primitive).ok_or(PakeError::NotSupported)?;
        if group.hash() != self.hash {
            return Err(PakeError::NotSupported);
        }
        Ok(group)
    }
}
