// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Running hash over every exchanged step.
//!
//! Each party writes its outputs before reading its inputs, so the two sides
//! see the same bytes in different orders. The transcript therefore keeps one
//! digest per sender and only combines them at the end, in the spirit of
//! `transcript_ir` from the `CPace` draft.

use sha2::Digest;

use crate::errors::PakeError;
use crate::inputs::Role;
use crate::schedule::DriverStep;

const DSI_TRANSCRIPT: &[u8] = b"JPAKE_TRANSCRIPT";

/// Maximum length of a LEB128-encoded `usize`
const MAX_LEB128_LEN: usize = 10;

/*
Adapted from <https://www.ietf.org/archive/id/draft-irtf-cfrg-cpace-12.html#appendix-A.1.1>

def prepend_len(data):
"prepend LEB128 encoding of length"
length = len(data)
length_encoded = b""
while True:
    if length < 128:
        length_encoded += bytes([length])
    else:
        length_encoded += bytes([(length & 0x7f) + 0x80])
    length = int(length >> 7)
    if length == 0:
        break;
return length_encoded + data
*/
/// LEB128 encoding of `length`, returned with the number of bytes used
pub(crate) fn encode_len(mut length: usize) -> ([u8; MAX_LEB128_LEN], usize) {
    let mut length_encoded = [0u8; MAX_LEB128_LEN];
    let mut used = 0;
    loop {
        if length < 128 {
            length_encoded[used] = length as u8;
        } else {
            length_encoded[used] = (length & 0x7f) as u8 + 0x80;
        }
        used += 1;
        length >>= 7;
        if length == 0 {
            break;
        }
    }
    (length_encoded, used)
}

/// The code a step carries in the transcript, named from the sender's side.
///
/// The sender's `X2S` share is the receiver's `X4S` share; both map to the
/// same code so the two transcripts agree.
const fn sender_code(step: DriverStep) -> u8 {
    match step {
        DriverStep::X4sKeyShare => DriverStep::X2sKeyShare.code(),
        DriverStep::X4sZkPublic => DriverStep::X2sZkPublic.code(),
        DriverStep::X4sZkProof => DriverStep::X2sZkProof.code(),
        other => other.code(),
    }
}

/// Two running digests, one for steps sent by the client and one for steps
/// sent by the server
#[derive(Clone)]
pub(crate) struct Transcript<H: Digest + Clone> {
    role: Role,
    client: H,
    server: H,
}

impl<H: Digest + Clone> Transcript<H> {
    pub(crate) fn new(role: Role) -> Self {
        Self {
            role,
            client: H::new(),
            server: H::new(),
        }
    }

    /// Fold a step this party produced
    pub(crate) fn sent(&mut self, step: DriverStep, data: &[u8]) {
        let role = self.role;
        self.absorb(role, step, data);
    }

    /// Fold a step the peer produced
    pub(crate) fn received(&mut self, step: DriverStep, data: &[u8]) {
        let role = self.role.peer();
        self.absorb(role, step, data);
    }

    fn absorb(&mut self, sender: Role, step: DriverStep, data: &[u8]) {
        let hasher = match sender {
            Role::Client => &mut self.client,
            Role::Server => &mut self.server,
        };
        let (length_encoded, used) = encode_len(data.len());
        hasher.update([sender_code(step)]);
        hasher.update(&length_encoded[..used]);
        hasher.update(data);
    }

    /// `H(DSI || H(client steps) || H(server steps))`, written to `out`
    pub(crate) fn finalize_into(&self, out: &mut [u8]) -> Result<usize, PakeError> {
        let required = <H as Digest>::output_size();
        if out.len() < required {
            return Err(PakeError::BufferTooSmall { required });
        }
        let mut hasher = H::new();
        hasher.update(DSI_TRANSCRIPT);
        hasher.update(self.client.clone().finalize());
        hasher.update(self.server.clone().finalize());
        out[..required].copy_from_slice(&hasher.finalize());
        Ok(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Sha256;

    fn prepend_len(data: &[u8]) -> Vec<u8> {
        let (length_encoded, used) = encode_len(data.len());
        [&length_encoded[..used], data].concat()
    }

    #[test]
    fn test_encode_len() {
        // Vectors from <https://www.ietf.org/archive/id/draft-irtf-cfrg-cpace-12.html#appendix-A.1.2>
        assert_eq!("00", hex::encode(prepend_len(b"")));
        assert_eq!("0431323334", hex::encode(prepend_len(b"1234")));
        let bytes_127 = prepend_len(&(0..127).collect::<Vec<u8>>());
        assert_eq!("7f", hex::encode(&bytes_127[..1]));
        assert_eq!(bytes_127.len(), 128);
        let bytes_128 = prepend_len(&(0..128).collect::<Vec<u8>>());
        assert_eq!("8001", hex::encode(&bytes_128[..2]));
        assert_eq!(bytes_128.len(), 130);
    }

    #[test]
    fn test_encode_len_max() {
        let (encoded, used) = encode_len(usize::MAX);
        assert_eq!(used, (usize::BITS as usize + 6) / 7);
        assert!(encoded[..used - 1].iter().all(|byte| *byte & 0x80 != 0));
        assert_eq!(encoded[used - 1] & 0x80, 0);
    }

    fn finalize(transcript: &Transcript<Sha256>) -> [u8; 32] {
        let mut out = [0u8; 32];
        assert_eq!(transcript.finalize_into(&mut out), Ok(32));
        out
    }

    #[test]
    fn test_transcripts_agree_across_roles() {
        let mut client = Transcript::<Sha256>::new(Role::Client);
        let mut server = Transcript::<Sha256>::new(Role::Server);

        // Each side sends first, then receives
        client.sent(DriverStep::X1KeyShare, b"client x1");
        server.sent(DriverStep::X1KeyShare, b"server x1");
        client.received(DriverStep::X1KeyShare, b"server x1");
        server.received(DriverStep::X1KeyShare, b"client x1");

        client.sent(DriverStep::X2sKeyShare, b"client a");
        server.sent(DriverStep::X2sKeyShare, b"server b");
        client.received(DriverStep::X4sKeyShare, b"server b");
        server.received(DriverStep::X4sKeyShare, b"client a");

        assert_eq!(finalize(&client), finalize(&server));
    }

    #[test]
    fn test_transcript_binds_sender_and_framing() {
        let mut a = Transcript::<Sha256>::new(Role::Client);
        let mut b = Transcript::<Sha256>::new(Role::Client);
        a.sent(DriverStep::X1KeyShare, b"data");
        b.received(DriverStep::X1KeyShare, b"data");
        assert_ne!(finalize(&a), finalize(&b));

        let mut c = Transcript::<Sha256>::new(Role::Client);
        let mut d = Transcript::<Sha256>::new(Role::Client);
        c.sent(DriverStep::X1KeyShare, b"ab");
        c.sent(DriverStep::X1ZkPublic, b"c");
        d.sent(DriverStep::X1KeyShare, b"a");
        d.sent(DriverStep::X1ZkPublic, b"bc");
        assert_ne!(finalize(&c), finalize(&d));
    }

    #[test]
    fn test_finalize_buffer_too_small() {
        let transcript = Transcript::<Sha256>::new(Role::Server);
        let mut out = [0u8; 31];
        assert_eq!(
            transcript.finalize_into(&mut out),
            Err(PakeError::BufferTooSmall { required: 32 })
        );
    }
}
