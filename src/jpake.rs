// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! J-PAKE over a generic group: Schnorr proofs, the two rounds, and key
//! confirmation.
//!
//! Naming follows RFC 8236 from this party's point of view: `x1`, `x2` are
//! our round-one secrets and `X1`, `X2` their public shares; the peer's
//! round-one shares are `X3`, `X4`. In round two we send
//! `A = (X1 + X3 + X4) * (x2 * s)` and receive the peer's `B`, and the shared
//! point is `K = (B - X4 * (x2 * s)) * x2`.

use hkdf::SimpleHkdf;
use hmac::{Mac, SimpleHmac};
use rand_core::{CryptoRng, RngCore};
use sha2::Digest;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::PakeError;
use crate::group::JpakeGroup;
use crate::inputs::PakeInputs;
use crate::schedule::{DriverStep, Share, StepKind};
use crate::sizes::{MAX_ELEMENT_LEN, MAX_SCALAR_LEN, MAX_TAG_LEN};
use crate::transcript::Transcript;

type Result<T> = core::result::Result<T, PakeError>;

/// HKDF info for the key confirmation key, RFC 8236 section 5
const KC_INFO: &[u8] = b"JPAKE_KC";
/// Prefix of the key confirmation MAC input, RFC 8236 section 5
const KC_PREFIX: &[u8] = b"KC_1_U";

/// A non-interactive Schnorr proof (RFC 8235) of knowledge of `x` with
/// `X = generator * x`
pub(crate) struct SchnorrProof<G: JpakeGroup> {
    pub(crate) commitment: G::Element,
    pub(crate) response: G::Scalar,
}

/// `h = H(len || generator || len || V || len || X || len || id) mod n`, with
/// 4-byte big-endian lengths, as in TLS and Thread EC J-PAKE
pub(crate) fn zkp_hash<G: JpakeGroup>(
    generator: &G::Element,
    commitment: &G::Element,
    public: &G::Element,
    id: &[u8],
) -> Result<G::Scalar> {
    let mut hasher = <G::Hash as Digest>::new();
    let mut buf = [0u8; MAX_ELEMENT_LEN];
    let encoded = &mut buf[..G::ELEMENT_LEN];
    let element_len = u32::try_from(G::ELEMENT_LEN).map_err(|_| PakeError::CorruptionDetected)?;
    for element in [generator, commitment, public] {
        G::encode_element(element, encoded)?;
        hasher.update(element_len.to_be_bytes());
        hasher.update(&*encoded);
    }
    let id_len = u32::try_from(id.len()).map_err(|_| PakeError::InvalidArgument)?;
    hasher.update(id_len.to_be_bytes());
    hasher.update(id);
    Ok(G::reduce_be_bytes(&hasher.finalize()))
}

/// Prove knowledge of `secret`: `V = generator * v`, `r = v - secret * h`
pub(crate) fn prove<G: JpakeGroup, R: RngCore + CryptoRng>(
    generator: &G::Element,
    secret: &G::Scalar,
    public: &G::Element,
    id: &[u8],
    rng: &mut R,
) -> Result<SchnorrProof<G>> {
    let v = Zeroizing::new(G::random_scalar(rng)?);
    let commitment = *generator * *v;
    let h = zkp_hash::<G>(generator, &commitment, public, id)?;
    Ok(SchnorrProof {
        commitment,
        response: *v - *secret * h,
    })
}

/// Check `V == generator * r + X * h`
pub(crate) fn verify<G: JpakeGroup>(
    generator: &G::Element,
    public: &G::Element,
    proof: &SchnorrProof<G>,
    id: &[u8],
) -> Result<()> {
    let h = zkp_hash::<G>(generator, &proof.commitment, public, id)?;
    let expected = *generator * proof.response + *public * h;
    if bool::from(expected.ct_eq(&proof.commitment)) {
        Ok(())
    } else {
        Err(PakeError::InvalidSignature)
    }
}

/// Every secret the exchange holds, in one fixed-size block
struct Secrets<G: JpakeGroup> {
    /// The password mapped into the scalar field
    password: G::Scalar,
    x2: G::Scalar,
    confirmation_key: [u8; MAX_TAG_LEN],
    /// Encoding of `K`
    shared_key: [u8; MAX_ELEMENT_LEN],
}

impl<G: JpakeGroup> Secrets<G> {
    fn new(password: G::Scalar) -> Self {
        Self {
            password,
            x2: G::zero(),
            confirmation_key: [0u8; MAX_TAG_LEN],
            shared_key: [0u8; MAX_ELEMENT_LEN],
        }
    }

    fn is_zeroed(&self) -> bool {
        G::is_zero_scalar(&self.password)
            && G::is_zero_scalar(&self.x2)
            && self.confirmation_key.iter().all(|byte| *byte == 0)
            && self.shared_key.iter().all(|byte| *byte == 0)
    }
}

impl<G: JpakeGroup> Zeroize for Secrets<G> {
    fn zeroize(&mut self) {
        self.password.zeroize();
        self.x2.zeroize();
        self.confirmation_key.zeroize();
        self.shared_key.zeroize();
    }
}

impl<G: JpakeGroup> Drop for Secrets<G> {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// An own key share whose proof has not been fully written out yet
struct PendingOutput<G: JpakeGroup> {
    share: Share,
    public: G::Element,
    proof: SchnorrProof<G>,
}

/// A peer key share whose proof has not arrived yet
struct PendingInput<G: JpakeGroup> {
    public: Option<G::Element>,
    commitment: Option<G::Element>,
}

impl<G: JpakeGroup> PendingInput<G> {
    fn empty() -> Self {
        Self {
            public: None,
            commitment: None,
        }
    }
}

/// Copy an identity with fallible allocation
fn copy_identity(id: &[u8]) -> Result<Vec<u8>> {
    u32::try_from(id.len()).map_err(|_| PakeError::InvalidArgument)?;
    let mut owned = Vec::new();
    owned.try_reserve_exact(id.len())?;
    owned.extend_from_slice(id);
    Ok(owned)
}

/// The cryptographic state of one J-PAKE exchange.
///
/// Step ordering is enforced by the caller; this type only checks that the
/// values it needs for a step are present, and reports `CorruptionDetected`
/// when they are not.
pub(crate) struct JpakeState<G: JpakeGroup> {
    user_id: Vec<u8>,
    peer_id: Vec<u8>,
    secrets: Secrets<G>,
    /// `X1`, `X2`
    own_shares: [Option<G::Element>; 2],
    /// `X3`, `X4`
    peer_shares: [Option<G::Element>; 2],
    pending_output: Option<PendingOutput<G>>,
    pending_input: PendingInput<G>,
    key_available: bool,
    transcript: Transcript<G::Hash>,
}

impl<G: JpakeGroup> JpakeState<G> {
    pub(crate) fn new(inputs: &PakeInputs<'_>) -> Result<Self> {
        let user_id = copy_identity(inputs.user_id())?;
        let peer_id = copy_identity(inputs.peer_id())?;
        let secrets = Secrets::new(G::reduce_be_bytes(inputs.password));
        if G::is_zero_scalar(&secrets.password) {
            return Err(PakeError::InvalidArgument);
        }
        Ok(Self {
            user_id,
            peer_id,
            secrets,
            own_shares: [None, None],
            peer_shares: [None, None],
            pending_output: None,
            pending_input: PendingInput::empty(),
            key_available: false,
            transcript: Transcript::new(inputs.role()),
        })
    }

    /// Produce the bytes of an output step into `out`, which is exactly as
    /// long as the step's encoding
    pub(crate) fn write_step<R: RngCore + CryptoRng>(
        &mut self,
        step: DriverStep,
        out: &mut [u8],
        rng: &mut R,
    ) -> Result<usize> {
        match step.kind() {
            StepKind::KeyShare => {
                let share = step.share().ok_or(PakeError::CorruptionDetected)?;
                let (secret, pending) = match share {
                    Share::X1 | Share::X2 => self.round_one_share(share, rng)?,
                    Share::X2s => self.round_two_share(rng)?,
                    Share::X4s => return Err(PakeError::CorruptionDetected),
                };
                G::encode_element(&pending.public, out)?;
                match share {
                    Share::X1 => self.own_shares[0] = Some(pending.public),
                    Share::X2 => {
                        self.own_shares[1] = Some(pending.public);
                        self.secrets.x2 = *secret;
                    }
                    _ => {}
                }
                self.pending_output = Some(pending);
            }
            StepKind::ZkPublic => {
                let pending = self.pending_output(step)?;
                G::encode_element(&pending.proof.commitment, out)?;
            }
            StepKind::ZkProof => {
                let pending = self.pending_output(step)?;
                G::encode_scalar(&pending.proof.response, out)?;
                self.pending_output = None;
            }
            StepKind::ConfirmationTag => {
                let tag = self.confirmation_mac(true)?.finalize().into_bytes();
                if tag.len() != out.len() {
                    return Err(PakeError::CorruptionDetected);
                }
                out.copy_from_slice(&tag);
            }
        }
        self.transcript.sent(step, out);
        Ok(out.len())
    }

    /// Validate and absorb the bytes of an input step
    pub(crate) fn read_step(&mut self, step: DriverStep, input: &[u8]) -> Result<()> {
        match step.kind() {
            StepKind::KeyShare => {
                let public = G::decode_element(input)?;
                self.pending_input = PendingInput {
                    public: Some(public),
                    commitment: None,
                };
                self.transcript.received(step, input);
            }
            StepKind::ZkPublic => {
                let commitment = G::decode_element(input)?;
                if self.pending_input.public.is_none() {
                    return Err(PakeError::CorruptionDetected);
                }
                self.pending_input.commitment = Some(commitment);
                self.transcript.received(step, input);
            }
            StepKind::ZkProof => {
                let response = G::decode_scalar(input)?;
                let share = step.share().ok_or(PakeError::CorruptionDetected)?;
                let public = self
                    .pending_input
                    .public
                    .take()
                    .ok_or(PakeError::CorruptionDetected)?;
                let commitment = self
                    .pending_input
                    .commitment
                    .take()
                    .ok_or(PakeError::CorruptionDetected)?;
                let generator = match share {
                    Share::X1 | Share::X2 => G::generator(),
                    Share::X4s => self.peer_generator()?,
                    Share::X2s => return Err(PakeError::CorruptionDetected),
                };
                let proof = SchnorrProof::<G> {
                    commitment,
                    response,
                };
                verify::<G>(&generator, &public, &proof, &self.peer_id)?;

                match share {
                    Share::X1 => self.peer_shares[0] = Some(public),
                    Share::X2 => {
                        self.peer_shares[1] = Some(public);
                        self.check_round_two_generators()?;
                    }
                    _ => self.derive_shared_key(&public)?,
                }

                // A short secp256r1 response is folded in its full-length form
                let mut canonical = [0u8; MAX_SCALAR_LEN];
                let canonical = &mut canonical[..G::SCALAR_LEN];
                G::encode_scalar(&response, canonical)?;
                self.transcript.received(step, &*canonical);
            }
            StepKind::ConfirmationTag => {
                if input.len() != G::TAG_LEN {
                    return Err(PakeError::DataInvalid);
                }
                self.confirmation_mac(false)?.verify_slice(input)?;
                self.key_available = true;
                self.transcript.received(step, input);
            }
        }
        Ok(())
    }

    /// Copy `K` into `out` and wipe every secret. Only succeeds once.
    pub(crate) fn take_implicit_key(&mut self, out: &mut [u8]) -> Result<usize> {
        if !self.key_available {
            return Err(PakeError::BadState);
        }
        if out.len() != G::ELEMENT_LEN {
            return Err(PakeError::CorruptionDetected);
        }
        out.copy_from_slice(&self.secrets.shared_key[..G::ELEMENT_LEN]);
        self.wipe();
        Ok(G::ELEMENT_LEN)
    }

    pub(crate) fn transcript_hash(&self, out: &mut [u8]) -> Result<usize> {
        self.transcript.finalize_into(out)
    }

    /// Zero every secret and forget any half-processed share
    pub(crate) fn wipe(&mut self) {
        self.secrets.zeroize();
        self.pending_output = None;
        self.pending_input = PendingInput::empty();
        self.key_available = false;
    }

    pub(crate) fn is_wiped(&self) -> bool {
        self.secrets.is_zeroed() && self.pending_output.is_none() && !self.key_available
    }

    fn pending_output(&self, step: DriverStep) -> Result<&PendingOutput<G>> {
        match (&self.pending_output, step.share()) {
            (Some(pending), Some(share)) if pending.share == share => Ok(pending),
            _ => Err(PakeError::CorruptionDetected),
        }
    }

    fn round_one_share<R: RngCore + CryptoRng>(
        &self,
        share: Share,
        rng: &mut R,
    ) -> Result<(Zeroizing<G::Scalar>, PendingOutput<G>)> {
        let secret = Zeroizing::new(G::random_scalar(rng)?);
        let generator = G::generator();
        let public = generator * *secret;
        let proof = prove::<G, R>(&generator, &secret, &public, &self.user_id, rng)?;
        Ok((
            secret,
            PendingOutput {
                share,
                public,
                proof,
            },
        ))
    }

    fn round_two_share<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(Zeroizing<G::Scalar>, PendingOutput<G>)> {
        let generator = self.own_generator()?;
        let secret = Zeroizing::new(self.secrets.x2 * self.secrets.password);
        let public = generator * *secret;
        let proof = prove::<G, R>(&generator, &secret, &public, &self.user_id, rng)?;
        Ok((
            secret,
            PendingOutput {
                share: Share::X2s,
                public,
                proof,
            },
        ))
    }

    /// Generator of our round-two proof, `X1 + X3 + X4`
    fn own_generator(&self) -> Result<G::Element> {
        match (self.own_shares[0], self.peer_shares) {
            (Some(x1), [Some(x3), Some(x4)]) => Ok(x1 + x3 + x4),
            _ => Err(PakeError::CorruptionDetected),
        }
    }

    /// Generator of the peer's round-two proof, `X1 + X2 + X3`
    fn peer_generator(&self) -> Result<G::Element> {
        match (self.own_shares, self.peer_shares[0]) {
            ([Some(x1), Some(x2)], Some(x3)) => Ok(x1 + x2 + x3),
            _ => Err(PakeError::CorruptionDetected),
        }
    }

    fn check_round_two_generators(&self) -> Result<()> {
        if G::is_identity(&self.own_generator()?) || G::is_identity(&self.peer_generator()?) {
            return Err(PakeError::DataCorrupt);
        }
        Ok(())
    }

    fn derive_shared_key(&mut self, peer_round_two: &G::Element) -> Result<()> {
        let x4 = self.peer_shares[1].ok_or(PakeError::CorruptionDetected)?;
        let x2s = Zeroizing::new(self.secrets.x2 * self.secrets.password);
        let k = (*peer_round_two - x4 * *x2s) * self.secrets.x2;
        if G::is_identity(&k) {
            return Err(PakeError::DataCorrupt);
        }
        G::encode_element(&k, &mut self.secrets.shared_key[..G::ELEMENT_LEN])?;

        let hkdf = SimpleHkdf::<G::Hash>::new(None, &self.secrets.shared_key[..G::ELEMENT_LEN]);
        hkdf.expand(KC_INFO, &mut self.secrets.confirmation_key[..G::TAG_LEN])?;

        self.secrets.x2.zeroize();
        self.secrets.password.zeroize();
        Ok(())
    }

    /// `HMAC(k', "KC_1_U" || sender || receiver || sender shares || receiver shares)`
    fn confirmation_mac(&self, sent_by_us: bool) -> Result<SimpleHmac<G::Hash>> {
        let mut mac = <SimpleHmac<G::Hash> as Mac>::new_from_slice(
            &self.secrets.confirmation_key[..G::TAG_LEN],
        )?;
        let (sender_id, receiver_id, sender_shares, receiver_shares) = if sent_by_us {
            (&self.user_id, &self.peer_id, &self.own_shares, &self.peer_shares)
        } else {
            (&self.peer_id, &self.user_id, &self.peer_shares, &self.own_shares)
        };
        mac.update(KC_PREFIX);
        mac.update(sender_id);
        mac.update(receiver_id);

        let mut buf = [0u8; MAX_ELEMENT_LEN];
        let encoded = &mut buf[..G::ELEMENT_LEN];
        for share in sender_shares.iter().chain(receiver_shares.iter()) {
            let share = share.as_ref().ok_or(PakeError::CorruptionDetected)?;
            G::encode_element(share, encoded)?;
            mac.update(&*encoded);
        }
        Ok(mac)
    }
}
