// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! A driver-level implementation of the J-PAKE password authenticated key
//! exchange (PAKE), exposed as a step-by-step state machine
//!
//! ⚠️ **Warning**: This implementation has not been audited. Use at your own risk!
//!
//! # Overview
//!
//! J-PAKE ([RFC 8236](https://www.rfc-editor.org/rfc/rfc8236)) is a balanced
//! PAKE between two parties: a client and a server. Both start from the same
//! low-entropy password and, after two rounds of key shares backed by Schnorr
//! zero-knowledge proofs ([RFC 8235](https://www.rfc-editor.org/rfc/rfc8235)),
//! arrive at the same shared secret. If the passwords differ, the exchange of
//! key confirmation tags that follows fails and neither side obtains a key.
//!
//! This crate does not define messages. Instead an [`Operation`] is driven one
//! step at a time, as a cryptography driver would be: each call either
//! produces the bytes of one output step into a caller buffer, or consumes the
//! bytes of one input step from the peer. How the bytes travel is up to the
//! caller.
//!
//! # Setup
//!
//! Both parties must agree on a [`CipherSuite`]. Two are supported:
//! * [`CipherSuite::jpake_secp256r1_sha256`], the suite used by Thread and TLS
//!   EC J-PAKE, and
//! * [`CipherSuite::jpake_ristretto255_sha512`], behind the `ristretto255`
//!   feature (enabled by default).
//!
//! Each party then builds [`PakeInputs`] from its [`Role`], the suite and the
//! password, optionally overriding the identities (which default to `"client"`
//! and `"server"`), and calls [`Operation::setup`]:
//!
//! ```
//! use jpake_driver::{CipherSuite, Operation, PakeInputs, Role, Stage};
//!
//! let suite = CipherSuite::jpake_secp256r1_sha256();
//! let mut client = Operation::new();
//! client.setup(&PakeInputs::new(Role::Client, suite, b"password"))?;
//! assert_eq!(client.stage(), Stage::RoundOne);
//! # Ok::<(), jpake_driver::PakeError>(())
//! ```
//!
//! # Steps
//!
//! Each stage lists the steps a party outputs and then the steps it inputs.
//! `X1` and `X2` are the two round-one key shares, `X2S` is a party's own
//! round-two share and `X4S` is the peer's:
//!
//! | Stage | Output | Input |
//! |---|---|---|
//! | [`Stage::RoundOne`] | `X1`, `X2` (key share, ZK public, ZK proof each) | `X1`, `X2` |
//! | [`Stage::RoundTwo`] | `X2S` | `X4S` |
//! | [`Stage::KeyConfirmation`] | confirmation tag | confirmation tag |
//!
//! The peer's `X2S` output is fed to this party as its `X4S` input.
//! [`Operation::expected_step`] always names the one call the operation
//! accepts next, and any other call fails with [`PakeError::BadState`]
//! without changing anything. Buffer sizes for every step are available ahead
//! of time from [`output_size`], [`input_size`] and [`implicit_key_size`], or
//! by using [`sizes::MAX_OUTPUT_SIZE`] for every step.
//!
//! The following drives a client and a server against each other, passing the
//! bytes of each stage across in one batch:
//!
//! ```
//! use jpake_driver::sizes::{MAX_IMPLICIT_KEY_SIZE, MAX_OUTPUT_SIZE};
//! use jpake_driver::{CipherSuite, Direction, Operation, PakeError, PakeInputs, Role, Stage};
//! use rand_core::OsRng;
//!
//! fn drain_outputs(op: &mut Operation) -> Result<Vec<Vec<u8>>, PakeError> {
//!     let mut messages = Vec::new();
//!     while let Some(expected) = op.expected_step() {
//!         if expected.direction != Direction::Output {
//!             break;
//!         }
//!         let mut buf = [0u8; MAX_OUTPUT_SIZE];
//!         let len = op.output(expected.step, &mut buf, &mut OsRng)?;
//!         messages.push(buf[..len].to_vec());
//!     }
//!     Ok(messages)
//! }
//!
//! fn feed_inputs(op: &mut Operation, messages: &[Vec<u8>]) -> Result<(), PakeError> {
//!     for message in messages {
//!         let expected = op.expected_step().ok_or(PakeError::BadState)?;
//!         op.input(expected.step, message)?;
//!     }
//!     Ok(())
//! }
//!
//! let suite = CipherSuite::jpake_secp256r1_sha256();
//! let mut client = Operation::new();
//! client.setup(&PakeInputs::new(Role::Client, suite, b"password"))?;
//! let mut server = Operation::new();
//! server.setup(&PakeInputs::new(Role::Server, suite, b"password"))?;
//!
//! while client.stage() != Stage::Confirmed {
//!     let to_server = drain_outputs(&mut client)?;
//!     let to_client = drain_outputs(&mut server)?;
//!     feed_inputs(&mut server, &to_server)?;
//!     feed_inputs(&mut client, &to_client)?;
//! }
//!
//! let mut client_key = [0u8; MAX_IMPLICIT_KEY_SIZE];
//! let mut server_key = [0u8; MAX_IMPLICIT_KEY_SIZE];
//! let client_len = client.get_implicit_key(&mut client_key)?;
//! let server_len = server.get_implicit_key(&mut server_key)?;
//! assert_eq!(client_key[..client_len], server_key[..server_len]);
//!
//! client.abort()?;
//! server.abort()?;
//! # Ok::<(), PakeError>(())
//! ```
//!
//! # Finishing
//!
//! Once an operation reaches [`Stage::Confirmed`], [`Operation::get_implicit_key`]
//! hands out the shared secret exactly once. It is the raw encoding of the
//! shared group element and is meant to be fed into a key derivation
//! function, never used directly as a key. [`Operation::transcript_hash`]
//! returns a hash over every exchanged step, identical on both sides, for
//! channel binding.
//!
//! [`Operation::abort`] wipes every secret and returns the operation to
//! [`Stage::Uninitialized`]. It is valid in every stage and should be called
//! after success as well; dropping an operation wipes it too.
//!
//! # Errors
//!
//! Peer data that is malformed ([`PakeError::DataInvalid`]), not a valid group
//! value ([`PakeError::DataCorrupt`]) or that fails a proof or tag check
//! ([`PakeError::InvalidSignature`]) moves the operation to [`Stage::Failed`]
//! and wipes its secrets. A wrong password is only detected at the
//! confirmation tag, and is indistinguishable from a forged tag.
//!
//! # Logging
//!
//! Stage transitions are logged at debug level and rejected input at warn
//! level through the [`log`](https://docs.rs/log) facade. No secret is ever
//! logged, and no logger is installed by this crate.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(clippy::doc_markdown, missing_docs, rustdoc::all)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod ciphersuite;
mod errors;
mod group;
mod inputs;
mod jpake;
mod protocol;
mod schedule;
pub mod sizes;
mod transcript;

#[cfg(test)]
mod tests;

pub use ciphersuite::{Algorithm, CipherSuite, Family, HashAlgorithm, Primitive, PrimitiveType};
pub use errors::PakeError;
pub use inputs::{KeyAttributes, KeyType, KeyUsage, Lifetime, PakeInputs, Role};
pub use protocol::Operation;
pub use rand_core;
pub use schedule::{Direction, DriverStep, ExpectedStep, Stage, StepKind};
pub use sizes::{implicit_key_size, input_size, output_size};
