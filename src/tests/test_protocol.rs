// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

use super::*;
use crate::{CipherSuite, DriverStep, PakeError, PakeInputs, Role, Stage};

#[test]
fn test_protocol() {
    let passwords = ["pw1", "pw2"];
    let clients = ["c1", "c2"];
    let servers = ["s1", "s2"];

    for suite in suites() {
        for client_password in passwords.iter() {
            for server_password in passwords.iter() {
                for client_id_at_client in clients.iter() {
                    for client_id_at_server in clients.iter() {
                        for server_id_at_client in servers.iter() {
                            for server_id_at_server in servers.iter() {
                                let result = run_protocol(
                                    PakeInputs::new(
                                        Role::Client,
                                        suite,
                                        client_password.as_bytes(),
                                    )
                                    .with_user_id(client_id_at_client.as_bytes())
                                    .with_peer_id(server_id_at_client.as_bytes()),
                                    PakeInputs::new(
                                        Role::Server,
                                        suite,
                                        server_password.as_bytes(),
                                    )
                                    .with_user_id(server_id_at_server.as_bytes())
                                    .with_peer_id(client_id_at_server.as_bytes()),
                                );

                                let computed_result = result.is_ok();
                                let expected_result = client_password == server_password
                                    && client_id_at_client == client_id_at_server
                                    && server_id_at_client == server_id_at_server;
                                assert_eq!(computed_result, expected_result);
                                if let Err(err) = result {
                                    assert_eq!(err, PakeError::InvalidSignature);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn run_protocol(
    client_inputs: PakeInputs<'_>,
    server_inputs: PakeInputs<'_>,
) -> Result<(), PakeError> {
    let mut client = Operation::new();
    client
        .setup(&client_inputs)
        .expect("Error with client setup()");
    let mut server = Operation::new();
    server
        .setup(&server_inputs)
        .expect("Error with server setup()");

    run_to_confirmation(&mut client, &mut server)?;

    let client_key = implicit_key(&mut client)?;
    let server_key = implicit_key(&mut server)?;
    assert_eq!(client_key, server_key);
    assert_eq!(transcript_hash(&client)?, transcript_hash(&server)?);

    client.abort()?;
    server.abort()?;
    Ok(())
}

#[test]
fn test_round_trip_sizes() {
    for suite in suites() {
        let mut client = setup(Role::Client, suite, b"password");
        let mut server = setup(Role::Server, suite, b"password");
        assert_eq!(run_to_confirmation(&mut client, &mut server), Ok(()));

        let key = implicit_key(&mut client).unwrap();
        let expected = crate::implicit_key_size(suite.algorithm(), suite.primitive());
        assert_eq!(Some(key.len()), expected);
        assert_eq!(key, implicit_key(&mut server).unwrap());
        assert_eq!(
            Some(transcript_hash(&client).unwrap().len()),
            client.transcript_hash_size()
        );
    }
}

#[test]
fn test_sessions_are_fresh() {
    for suite in suites() {
        let mut keys = Vec::new();
        for _ in 0..2 {
            let mut client = setup(Role::Client, suite, b"password");
            let mut server = setup(Role::Server, suite, b"password");
            run_to_confirmation(&mut client, &mut server).unwrap();
            keys.push(implicit_key(&mut client).unwrap());
        }
        assert_ne!(keys[0], keys[1]);
    }
}

#[test]
fn test_password_mismatch_fails_at_key_confirmation() {
    for suite in suites() {
        let mut client = setup(Role::Client, suite, b"password");
        let mut server = setup(Role::Server, suite, b"passw0rd");

        // Both rounds complete: the proofs do not depend on the password
        run_stage(&mut client, &mut server).unwrap();
        run_stage(&mut client, &mut server).unwrap();
        assert_eq!(client.stage(), Stage::KeyConfirmation);
        assert_eq!(server.stage(), Stage::KeyConfirmation);

        let to_server = drain_outputs(&mut client).unwrap();
        let to_client = drain_outputs(&mut server).unwrap();
        assert_eq!(
            server.input(DriverStep::ConfirmationTag, &to_server[0]),
            Err(PakeError::InvalidSignature)
        );
        assert_eq!(
            client.input(DriverStep::ConfirmationTag, &to_client[0]),
            Err(PakeError::InvalidSignature)
        );

        for op in [&mut client, &mut server] {
            assert_eq!(op.stage(), Stage::Failed);
            assert_eq!(op.expected_step(), None);
            assert_eq!(implicit_key(op), Err(PakeError::BadState));
            assert_eq!(op.abort(), Ok(()));
            assert_eq!(op.stage(), Stage::Uninitialized);
        }
    }
}

#[test]
fn test_identity_mismatch_fails_in_round_one() {
    let suite = CipherSuite::jpake_secp256r1_sha256();
    let mut client = Operation::new();
    client
        .setup(&PakeInputs::new(Role::Client, suite, b"password").with_user_id(b"alice"))
        .unwrap();
    let mut server = setup(Role::Server, suite, b"password");

    let to_server = drain_outputs(&mut client).unwrap();
    let _ = drain_outputs(&mut server).unwrap();

    // The server checks the client's first proof against "client"
    assert_eq!(
        feed_inputs(&mut server, &to_server),
        Err(PakeError::InvalidSignature)
    );
    assert_eq!(server.stage(), Stage::Failed);
}

#[test]
fn test_reflected_round_one_is_rejected() {
    for suite in suites() {
        let mut client = setup(Role::Client, suite, b"password");
        let mut server = setup(Role::Server, suite, b"password");
        let to_server = drain_outputs(&mut client).unwrap();
        let _ = drain_outputs(&mut server).unwrap();

        // The client's own proofs are bound to "client", not to its peer
        assert_eq!(
            feed_inputs(&mut client, &to_server),
            Err(PakeError::InvalidSignature)
        );
    }
}

#[test]
fn test_server_may_receive_before_sending() {
    for suite in suites() {
        let mut client = setup(Role::Client, suite, b"password");
        let mut server = setup(Role::Server, suite, b"password");

        // Deliver server messages first this time
        for _ in 0..3 {
            let to_client = drain_outputs(&mut server).unwrap();
            let to_server = drain_outputs(&mut client).unwrap();
            feed_inputs(&mut client, &to_client).unwrap();
            feed_inputs(&mut server, &to_server).unwrap();
        }
        assert_eq!(client.stage(), Stage::Confirmed);
        assert_eq!(server.stage(), Stage::Confirmed);
        assert_eq!(transcript_hash(&client), transcript_hash(&server));
        assert_eq!(implicit_key(&mut client), implicit_key(&mut server));
    }
}

#[test]
fn test_custom_identities_round_trip() {
    for suite in suites() {
        let mut client = Operation::new();
        client
            .setup(
                &PakeInputs::new(Role::Client, suite, b"password")
                    .with_user_id(b"commissioner")
                    .with_peer_id(b"joiner-7"),
            )
            .unwrap();
        let mut server = Operation::new();
        server
            .setup(
                &PakeInputs::new(Role::Server, suite, b"password")
                    .with_user_id(b"joiner-7")
                    .with_peer_id(b"commissioner"),
            )
            .unwrap();
        assert_eq!(run_to_confirmation(&mut client, &mut server), Ok(()));
        assert_eq!(implicit_key(&mut client), implicit_key(&mut server));
    }
}
