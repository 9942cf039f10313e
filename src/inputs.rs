// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The setup bundle: role, password with its key policy, cipher suite and
//! identities

use crate::ciphersuite::CipherSuite;
use crate::errors::PakeError;

/// Which side of the exchange an operation plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The side that opens the exchange
    Client,
    /// The side that answers it
    Server,
}

impl Role {
    /// The role of the other party
    pub const fn peer(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }

    /// The identity used for a party of this role when none is supplied
    pub(crate) const fn default_identity(self) -> &'static [u8] {
        match self {
            Self::Client => b"client",
            Self::Server => b"server",
        }
    }
}

/// The type of the key object holding the password
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// A low-entropy password
    Password,
    /// A password already stretched by a key stretching function
    PasswordHash,
    /// Arbitrary raw bytes
    RawData,
    /// Key derivation input
    Derive,
}

/// Usage flags of a key object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyUsage(u32);

impl KeyUsage {
    /// The key may be exported
    pub const EXPORT: Self = Self(0x0000_0001);
    /// The key may be copied
    pub const COPY: Self = Self(0x0000_0002);
    /// The key may be used as input to a key derivation or a PAKE
    pub const DERIVE: Self = Self(0x0000_4000);

    /// No usage at all
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Combine two sets of flags
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether all flags in `other` are set in `self`
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Where a key object is stored
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// In memory, gone when the key is destroyed
    Volatile,
    /// In local persistent storage
    Persistent,
    /// Inside an external location, such as a secure element, identified by
    /// the location value
    External(u32),
}

/// Policy attached to the password key object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyAttributes {
    /// Type of the key
    pub key_type: KeyType,
    /// Permitted usages
    pub usage: KeyUsage,
    /// Storage lifetime
    pub lifetime: Lifetime,
}

impl Default for KeyAttributes {
    fn default() -> Self {
        Self {
            key_type: KeyType::Password,
            usage: KeyUsage::DERIVE,
            lifetime: Lifetime::Volatile,
        }
    }
}

impl KeyAttributes {
    /// Check that a key with these attributes may be used as a PAKE password
    /// by this driver
    pub(crate) fn check_password_policy(&self) -> Result<(), PakeError> {
        if !matches!(self.key_type, KeyType::Password | KeyType::PasswordHash) {
            return Err(PakeError::InvalidArgument);
        }
        if !self.usage.contains(KeyUsage::DERIVE) {
            return Err(PakeError::NotPermitted);
        }
        if let Lifetime::External(_) = self.lifetime {
            return Err(PakeError::NotSupported);
        }
        Ok(())
    }
}

/// The inputs to [`Operation::setup`](crate::Operation::setup)
#[derive(Clone, Copy)]
pub struct PakeInputs<'a> {
    pub(crate) role: Role,
    pub(crate) cipher_suite: CipherSuite,
    pub(crate) password: &'a [u8],
    pub(crate) password_attributes: KeyAttributes,
    pub(crate) user_id: Option<&'a [u8]>,
    pub(crate) peer_id: Option<&'a [u8]>,
}

impl<'a> PakeInputs<'a> {
    /// Create a new [`PakeInputs`] object with default password attributes
    /// and role-derived identities
    pub fn new(role: Role, cipher_suite: CipherSuite, password: &'a [u8]) -> Self {
        Self {
            role,
            cipher_suite,
            password,
            password_attributes: KeyAttributes::default(),
            user_id: None,
            peer_id: None,
        }
    }

    /// Set the policy of the password key object
    pub fn with_password_attributes(mut self, attributes: KeyAttributes) -> Self {
        self.password_attributes = attributes;
        self
    }

    /// Set this party's identity
    pub fn with_user_id(mut self, user_id: &'a [u8]) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Set the other party's identity
    pub fn with_peer_id(mut self, peer_id: &'a [u8]) -> Self {
        self.peer_id = Some(peer_id);
        self
    }

    /// The role the operation will play
    pub fn role(&self) -> Role {
        self.role
    }

    /// The cipher suite the operation will use
    pub fn cipher_suite(&self) -> CipherSuite {
        self.cipher_suite
    }

    pub(crate) fn user_id(&self) -> &'a [u8] {
        self.user_id.unwrap_or(self.role.default_identity())
    }

    pub(crate) fn peer_id(&self) -> &'a [u8] {
        self.peer_id.unwrap_or(self.role.peer().default_identity())
    }
}

impl core::fmt::Debug for PakeInputs<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PakeInputs")
            .field("role", &self.role)
            .field("cipher_suite", &self.cipher_suite)
            .field("password", &"<redacted>")
            .field("password_attributes", &self.password_attributes)
            .field("user_id", &self.user_id)
            .field("peer_id", &self.peer_id)
            .finish()
    }
}
