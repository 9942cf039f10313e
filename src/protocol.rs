// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! The protocol implementation

use rand_core::{CryptoRng, RngCore};

use crate::ciphersuite::{CipherSuite, GroupId, HashAlgorithm};
use crate::errors::PakeError;
#[cfg(feature = "ristretto255")]
use crate::group::Ristretto255;
use crate::group::Secp256r1;
use crate::inputs::{PakeInputs, Role};
use crate::jpake::JpakeState;
use crate::schedule::{self, Direction, DriverStep, ExpectedStep, Stage};
use crate::sizes;

type Result<T> = core::result::Result<T, PakeError>;

/// The group-specific J-PAKE state behind an operation
enum Engine {
    Secp256r1(JpakeState<Secp256r1>),
    #[cfg(feature = "ristretto255")]
    Ristretto255(JpakeState<Ristretto255>),
}

macro_rules! with_engine {
    ($engine:expr, $state:ident => $body:expr) => {
        match $engine {
            Engine::Secp256r1($state) => $body,
            #[cfg(feature = "ristretto255")]
            Engine::Ristretto255($state) => $body,
        }
    };
}

impl Engine {
    fn new(group: GroupId, inputs: &PakeInputs<'_>) -> Result<Self> {
        Ok(match group {
            GroupId::Secp256r1 => Self::Secp256r1(JpakeState::new(inputs)?),
            #[cfg(feature = "ristretto255")]
            GroupId::Ristretto255 => Self::Ristretto255(JpakeState::new(inputs)?),
        })
    }
}

/// Everything fixed at setup
struct Context {
    cipher_suite: CipherSuite,
    role: Role,
    engine: Engine,
}

/// A PAKE operation, driven one step at a time.
///
/// A fresh operation is uninitialized. [`Operation::setup`] fixes the cipher
/// suite, role, password and identities, then the caller alternates
/// [`Operation::output`] and [`Operation::input`] in the order given by
/// [`Operation::expected_step`] until the stage is [`Stage::Confirmed`], and
/// finally collects the shared secret with [`Operation::get_implicit_key`].
/// [`Operation::abort`] wipes the operation from any stage so it can be set up
/// again; dropping it wipes it as well.
#[derive(Default)]
pub struct Operation {
    stage: Stage,
    sequence: usize,
    context: Option<Context>,
}

impl core::fmt::Debug for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Operation")
            .field("stage", &self.stage)
            .field("sequence", &self.sequence)
            .field("cipher_suite", &self.cipher_suite())
            .field("role", &self.role())
            .finish_non_exhaustive()
    }
}

impl Operation {
    /// Create an uninitialized operation
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize the operation.
    ///
    /// Fails with `BadState` unless the operation is uninitialized. On any
    /// failure the operation stays uninitialized and holds no secret.
    pub fn setup(&mut self, inputs: &PakeInputs<'_>) -> Result<()> {
        if self.stage != Stage::Uninitialized || self.context.is_some() {
            return Err(PakeError::BadState);
        }

        let group = inputs.cipher_suite.resolve()?;
        let first_stage =
            schedule::first_stage(inputs.cipher_suite.algorithm()).ok_or(PakeError::NotSupported)?;
        inputs.password_attributes.check_password_policy()?;
        if inputs.password.is_empty() {
            return Err(PakeError::InvalidArgument);
        }
        if inputs.user_id() == inputs.peer_id() {
            return Err(PakeError::InvalidArgument);
        }

        let engine = Engine::new(group, inputs)?;
        self.context = Some(Context {
            cipher_suite: inputs.cipher_suite,
            role: inputs.role,
            engine,
        });
        self.stage = first_stage;
        self.sequence = 0;
        log::debug!(
            "PAKE setup: {:?} as {:?}, entering {:?}",
            inputs.cipher_suite,
            inputs.role,
            first_stage
        );
        Ok(())
    }

    /// Write the next output step into `output` and return its length.
    ///
    /// `output` must hold at least [`sizes::output_size`] bytes for the step;
    /// a shorter buffer fails with `BufferTooSmall` and nothing is written.
    /// A failing random source yields `InsufficientEntropy` and leaves the
    /// operation as it was, so the call can be retried.
    pub fn output<R: RngCore + CryptoRng>(
        &mut self,
        step: DriverStep,
        output: &mut [u8],
        rng: &mut R,
    ) -> Result<usize> {
        self.check_expected(Direction::Output, step)?;
        let context = self.context.as_mut().ok_or(PakeError::BadState)?;
        let suite = context.cipher_suite;
        let required = sizes::output_size(suite.algorithm(), suite.primitive(), step.kind())
            .ok_or(PakeError::CorruptionDetected)?;
        if output.len() < required {
            return Err(PakeError::BufferTooSmall { required });
        }

        let result = with_engine!(&mut context.engine, state => {
            state.write_step(step, &mut output[..required], rng)
        });
        match result {
            Ok(written) => {
                self.advance();
                Ok(written)
            }
            Err(PakeError::CorruptionDetected) => {
                log::warn!("PAKE output {:?} failed: {}", step, PakeError::CorruptionDetected);
                self.fail();
                Err(PakeError::CorruptionDetected)
            }
            Err(err) => Err(err),
        }
    }

    /// Feed the next input step from the peer.
    ///
    /// Input longer than [`sizes::input_size`] fails with `InvalidArgument`
    /// and changes nothing. Any integrity failure (`DataInvalid`,
    /// `DataCorrupt`, `InvalidSignature`) wipes the operation's secrets and
    /// moves it to [`Stage::Failed`], where only `abort` is accepted.
    pub fn input(&mut self, step: DriverStep, input: &[u8]) -> Result<()> {
        self.check_expected(Direction::Input, step)?;
        let context = self.context.as_mut().ok_or(PakeError::BadState)?;
        let suite = context.cipher_suite;
        let max = sizes::input_size(suite.algorithm(), suite.primitive(), step.kind())
            .ok_or(PakeError::CorruptionDetected)?;
        if input.len() > max {
            return Err(PakeError::InvalidArgument);
        }

        let result = with_engine!(&mut context.engine, state => state.read_step(step, input));
        match result {
            Ok(()) => {
                self.advance();
                Ok(())
            }
            Err(err) if err.is_integrity_failure() || err == PakeError::CorruptionDetected => {
                log::warn!("PAKE input {:?} rejected: {}", step, err);
                self.fail();
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Write the shared secret into `output` and return its length.
    ///
    /// Only available once, in [`Stage::Confirmed`]. Afterwards the stage is
    /// [`Stage::Finished`] and every secret has been wiped.
    pub fn get_implicit_key(&mut self, output: &mut [u8]) -> Result<usize> {
        if self.stage != Stage::Confirmed {
            return Err(PakeError::BadState);
        }
        let context = self.context.as_mut().ok_or(PakeError::BadState)?;
        let suite = context.cipher_suite;
        let required = sizes::implicit_key_size(suite.algorithm(), suite.primitive())
            .ok_or(PakeError::CorruptionDetected)?;
        if output.len() < required {
            return Err(PakeError::BufferTooSmall { required });
        }

        let result = with_engine!(&mut context.engine, state => {
            state.take_implicit_key(&mut output[..required])
        });
        match result {
            Ok(written) => {
                self.stage = Stage::Finished;
                log::debug!("PAKE implicit key retrieved");
                Ok(written)
            }
            Err(err) => {
                log::warn!("PAKE implicit key unavailable: {}", err);
                self.fail();
                Err(err)
            }
        }
    }

    /// Write the hash of every exchanged step into `output` and return its
    /// length.
    ///
    /// Both parties obtain the same value, which can be used for channel
    /// binding. Available in [`Stage::Confirmed`] and [`Stage::Finished`].
    pub fn transcript_hash(&self, output: &mut [u8]) -> Result<usize> {
        if !matches!(self.stage, Stage::Confirmed | Stage::Finished) {
            return Err(PakeError::BadState);
        }
        let context = self.context.as_ref().ok_or(PakeError::BadState)?;
        with_engine!(&context.engine, state => state.transcript_hash(output))
    }

    /// Wipe every secret and return to [`Stage::Uninitialized`].
    ///
    /// Valid in every stage, including after success, and idempotent.
    pub fn abort(&mut self) -> Result<()> {
        let wiped = match self.context.take() {
            Some(mut context) => with_engine!(&mut context.engine, state => {
                state.wipe();
                state.is_wiped()
            }),
            None => true,
        };
        if self.stage != Stage::Uninitialized {
            log::debug!("PAKE aborted in {:?}", self.stage);
        }
        self.stage = Stage::Uninitialized;
        self.sequence = 0;
        if wiped {
            Ok(())
        } else {
            Err(PakeError::CorruptionDetected)
        }
    }

    /// The current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The only call the operation accepts next, if any
    pub fn expected_step(&self) -> Option<ExpectedStep> {
        let context = self.context.as_ref()?;
        schedule::expected(context.cipher_suite.algorithm(), self.stage, self.sequence)
    }

    /// The cipher suite fixed at setup
    pub fn cipher_suite(&self) -> Option<CipherSuite> {
        self.context.as_ref().map(|context| context.cipher_suite)
    }

    /// The role fixed at setup
    pub fn role(&self) -> Option<Role> {
        self.context.as_ref().map(|context| context.role)
    }

    /// Length of [`Operation::transcript_hash`] output for the configured
    /// suite
    pub fn transcript_hash_size(&self) -> Option<usize> {
        self.cipher_suite().map(|suite| match suite.hash() {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        })
    }

    fn check_expected(&self, direction: Direction, step: DriverStep) -> Result<()> {
        match self.expected_step() {
            Some(expected) if expected.direction == direction && expected.step == step => Ok(()),
            _ => Err(PakeError::BadState),
        }
    }

    fn advance(&mut self) {
        let algorithm = match &self.context {
            Some(context) => context.cipher_suite.algorithm(),
            None => return,
        };
        self.sequence += 1;
        let stage_len = schedule::stage_schedule(algorithm, self.stage)
            .map(|entry| (entry.steps.len(), entry.next));
        if let Some((len, next)) = stage_len {
            if self.sequence == len {
                log::debug!("PAKE stage {:?} -> {:?}", self.stage, next);
                self.stage = next;
                self.sequence = 0;
            }
        }
    }

    fn fail(&mut self) {
        if let Some(context) = self.context.as_mut() {
            with_engine!(&mut context.engine, state => state.wipe());
        }
        self.stage = Stage::Failed;
        self.sequence = 0;
    }
}
