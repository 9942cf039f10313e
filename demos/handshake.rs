// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use jpake_driver::rand_core::OsRng;
use jpake_driver::sizes::{MAX_IMPLICIT_KEY_SIZE, MAX_OUTPUT_SIZE};
use jpake_driver::CipherSuite;
use jpake_driver::Direction;
use jpake_driver::Operation;
use jpake_driver::PakeInputs;
use jpake_driver::Role;
use jpake_driver::Stage;

/// Run every output step the operation expects next, printing each one
fn outputs(name: &str, op: &mut Operation) -> Vec<Vec<u8>> {
    let mut messages = Vec::new();
    while let Some(expected) = op.expected_step() {
        if expected.direction != Direction::Output {
            break;
        }
        let mut buf = [0u8; MAX_OUTPUT_SIZE];
        let len = op
            .output(expected.step, &mut buf, &mut OsRng)
            .expect("Error with Operation::output()");
        println!(
            "{} {:?} ({} bytes): {:?}",
            name,
            expected.step,
            len,
            hex::encode(&buf[..len])
        );
        messages.push(buf[..len].to_vec());
    }
    messages
}

fn inputs(op: &mut Operation, messages: &[Vec<u8>]) {
    for message in messages {
        let expected = op.expected_step().expect("Operation expects no input");
        op.input(expected.step, message)
            .expect("Error with Operation::input()");
    }
}

fn main() {
    let suite = CipherSuite::jpake_secp256r1_sha256();

    let mut client = Operation::new();
    client
        .setup(
            &PakeInputs::new(Role::Client, suite, b"password")
                .with_user_id(b"client")
                .with_peer_id(b"server"),
        )
        .expect("Error with client setup()");

    let mut server = Operation::new();
    server
        .setup(
            &PakeInputs::new(Role::Server, suite, b"password")
                .with_user_id(b"server")
                .with_peer_id(b"client"),
        )
        .expect("Error with server setup()");

    while client.stage() != Stage::Confirmed {
        println!("--- {:?}", client.stage());
        let to_server = outputs("client", &mut client);
        let to_client = outputs("server", &mut server);
        inputs(&mut server, &to_server);
        inputs(&mut client, &to_client);
    }

    let mut transcript = [0u8; 64];
    let transcript_len = client
        .transcript_hash(&mut transcript)
        .expect("Error with transcript_hash()");
    println!(
        "transcript hash ({} bytes): {:?}",
        transcript_len,
        hex::encode(&transcript[..transcript_len])
    );

    let mut client_key = [0u8; MAX_IMPLICIT_KEY_SIZE];
    let client_len = client
        .get_implicit_key(&mut client_key)
        .expect("Error with client get_implicit_key()");
    let mut server_key = [0u8; MAX_IMPLICIT_KEY_SIZE];
    let server_len = server
        .get_implicit_key(&mut server_key)
        .expect("Error with server get_implicit_key()");

    println!(
        "implicit key ({} bytes): {:?}",
        client_len,
        hex::encode(&client_key[..client_len])
    );
    assert_eq!(client_key[..client_len], server_key[..server_len]);

    client.abort().expect("Error with client abort()");
    server.abort().expect("Error with server abort()");
}
