// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

mod test_protocol;

use crate::sizes::{MAX_IMPLICIT_KEY_SIZE, MAX_OUTPUT_SIZE};
use crate::{CipherSuite, Direction, Operation, PakeError, PakeInputs, Role, Stage};
use rand_core::OsRng;

pub(crate) fn suites() -> Vec<CipherSuite> {
    vec![
        CipherSuite::jpake_secp256r1_sha256(),
        #[cfg(feature = "ristretto255")]
        CipherSuite::jpake_ristretto255_sha512(),
    ]
}

pub(crate) fn setup(role: Role, suite: CipherSuite, password: &[u8]) -> Operation {
    let mut op = Operation::new();
    op.setup(&PakeInputs::new(role, suite, password))
        .expect("Error with Operation::setup()");
    op
}

/// Produce every output the operation expects before its next input
pub(crate) fn drain_outputs(op: &mut Operation) -> Result<Vec<Vec<u8>>, PakeError> {
    let mut messages = Vec::new();
    while let Some(expected) = op.expected_step() {
        if expected.direction != Direction::Output {
            break;
        }
        let mut buf = [0u8; MAX_OUTPUT_SIZE];
        let len = op.output(expected.step, &mut buf, &mut OsRng)?;
        messages.push(buf[..len].to_vec());
    }
    Ok(messages)
}

/// Feed peer messages as the inputs the operation expects, in order
pub(crate) fn feed_inputs(op: &mut Operation, messages: &[Vec<u8>]) -> Result<(), PakeError> {
    for message in messages {
        let expected = op.expected_step().ok_or(PakeError::BadState)?;
        assert_eq!(expected.direction, Direction::Input);
        op.input(expected.step, message)?;
    }
    Ok(())
}

/// Run one stage in both directions, client messages delivered first
pub(crate) fn run_stage(client: &mut Operation, server: &mut Operation) -> Result<(), PakeError> {
    let to_server = drain_outputs(client)?;
    let to_client = drain_outputs(server)?;
    feed_inputs(server, &to_server)?;
    feed_inputs(client, &to_client)
}

pub(crate) fn run_to_confirmation(
    client: &mut Operation,
    server: &mut Operation,
) -> Result<(), PakeError> {
    for _ in 0..3 {
        run_stage(client, server)?;
    }
    if client.stage() != Stage::Confirmed || server.stage() != Stage::Confirmed {
        return Err(PakeError::BadState);
    }
    Ok(())
}

pub(crate) fn implicit_key(op: &mut Operation) -> Result<Vec<u8>, PakeError> {
    let mut buf = [0u8; MAX_IMPLICIT_KEY_SIZE];
    let len = op.get_implicit_key(&mut buf)?;
    Ok(buf[..len].to_vec())
}

pub(crate) fn transcript_hash(op: &Operation) -> Result<Vec<u8>, PakeError> {
    let mut buf = [0u8; 64];
    let len = op.transcript_hash(&mut buf)?;
    Ok(buf[..len].to_vec())
}
