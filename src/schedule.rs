// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Stages, step identifiers and the per-algorithm step schedule
//!
//! The order in which an operation accepts `output` and `input` calls is
//! data: each algorithm has a table of stages, each stage a list of
//! `(direction, step)` entries. The state machine keeps a stage and an index
//! into that stage's list, so checking a call is a single lookup.

use crate::ciphersuite::Algorithm;

/// Protocol stage of an operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Not set up, or aborted
    #[default]
    Uninitialized,
    /// Exchange of the two round-one key shares in each direction
    RoundOne,
    /// Exchange of the password-bound round-two key share in each direction
    RoundTwo,
    /// Exchange of key confirmation tags
    KeyConfirmation,
    /// Both sides proved knowledge of the same password; the implicit key is
    /// ready
    Confirmed,
    /// The implicit key has been retrieved
    Finished,
    /// An input was rejected; only `abort` is accepted
    Failed,
}

/// Whether a step is produced or consumed by the operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Produced by [`Operation::output`](crate::Operation::output)
    Output,
    /// Consumed by [`Operation::input`](crate::Operation::input)
    Input,
}

/// What a step carries, independent of which key share it belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepKind {
    /// A public key share `X = G * x`
    KeyShare,
    /// The commitment `V = G * v` of a Schnorr proof
    ZkPublic,
    /// The response `r = v - x * h` of a Schnorr proof
    ZkProof,
    /// A key confirmation MAC
    ConfirmationTag,
}

/// Driver-level step identifier.
///
/// `X1` and `X2` name the first and second round-one key shares and are used
/// for both directions. `X2S` is this party's round-two share and `X4S` the
/// peer's.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DriverStep {
    /// First round-one key share
    X1KeyShare,
    /// Proof commitment for the first round-one key share
    X1ZkPublic,
    /// Proof response for the first round-one key share
    X1ZkProof,
    /// Second round-one key share
    X2KeyShare,
    /// Proof commitment for the second round-one key share
    X2ZkPublic,
    /// Proof response for the second round-one key share
    X2ZkProof,
    /// Own round-two key share
    X2sKeyShare,
    /// Proof commitment for the own round-two key share
    X2sZkPublic,
    /// Proof response for the own round-two key share
    X2sZkProof,
    /// Peer round-two key share
    X4sKeyShare,
    /// Proof commitment for the peer round-two key share
    X4sZkPublic,
    /// Proof response for the peer round-two key share
    X4sZkProof,
    /// Key confirmation tag, in either direction
    ConfirmationTag,
}

/// Which key share a step belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Share {
    X1,
    X2,
    X2s,
    X4s,
}

impl DriverStep {
    /// The kind of payload this step carries
    pub const fn kind(self) -> StepKind {
        match self {
            Self::X1KeyShare | Self::X2KeyShare | Self::X2sKeyShare | Self::X4sKeyShare => {
                StepKind::KeyShare
            }
            Self::X1ZkPublic | Self::X2ZkPublic | Self::X2sZkPublic | Self::X4sZkPublic => {
                StepKind::ZkPublic
            }
            Self::X1ZkProof | Self::X2ZkProof | Self::X2sZkProof | Self::X4sZkProof => {
                StepKind::ZkProof
            }
            Self::ConfirmationTag => StepKind::ConfirmationTag,
        }
    }

    pub(crate) const fn share(self) -> Option<Share> {
        match self {
            Self::X1KeyShare | Self::X1ZkPublic | Self::X1ZkProof => Some(Share::X1),
            Self::X2KeyShare | Self::X2ZkPublic | Self::X2ZkProof => Some(Share::X2),
            Self::X2sKeyShare | Self::X2sZkPublic | Self::X2sZkProof => Some(Share::X2s),
            Self::X4sKeyShare | Self::X4sZkPublic | Self::X4sZkProof => Some(Share::X4s),
            Self::ConfirmationTag => None,
        }
    }

    /// Tag byte used when framing the step in the transcript
    pub(crate) const fn code(self) -> u8 {
        match self {
            Self::X1KeyShare => 1,
            Self::X1ZkPublic => 2,
            Self::X1ZkProof => 3,
            Self::X2KeyShare => 4,
            Self::X2ZkPublic => 5,
            Self::X2ZkProof => 6,
            Self::X2sKeyShare => 7,
            Self::X2sZkPublic => 8,
            Self::X2sZkProof => 9,
            Self::X4sKeyShare => 10,
            Self::X4sZkPublic => 11,
            Self::X4sZkProof => 12,
            Self::ConfirmationTag => 13,
        }
    }
}

/// One legal call: a direction and the step it must name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpectedStep {
    /// Output or input
    pub direction: Direction,
    /// The step identifier
    pub step: DriverStep,
}

const fn out(step: DriverStep) -> ExpectedStep {
    ExpectedStep {
        direction: Direction::Output,
        step,
    }
}

const fn inp(step: DriverStep) -> ExpectedStep {
    ExpectedStep {
        direction: Direction::Input,
        step,
    }
}

/// The steps of one stage and the stage that follows it
#[derive(Debug)]
pub(crate) struct StageSchedule {
    pub(crate) stage: Stage,
    pub(crate) steps: &'static [ExpectedStep],
    pub(crate) next: Stage,
}

const JPAKE_ROUND_ONE: [ExpectedStep; 12] = [
    out(DriverStep::X1KeyShare),
    out(DriverStep::X1ZkPublic),
    out(DriverStep::X1ZkProof),
    out(DriverStep::X2KeyShare),
    out(DriverStep::X2ZkPublic),
    out(DriverStep::X2ZkProof),
    inp(DriverStep::X1KeyShare),
    inp(DriverStep::X1ZkPublic),
    inp(DriverStep::X1ZkProof),
    inp(DriverStep::X2KeyShare),
    inp(DriverStep::X2ZkPublic),
    inp(DriverStep::X2ZkProof),
];

const JPAKE_ROUND_TWO: [ExpectedStep; 6] = [
    out(DriverStep::X2sKeyShare),
    out(DriverStep::X2sZkPublic),
    out(DriverStep::X2sZkProof),
    inp(DriverStep::X4sKeyShare),
    inp(DriverStep::X4sZkPublic),
    inp(DriverStep::X4sZkProof),
];

const JPAKE_KEY_CONFIRMATION: [ExpectedStep; 2] = [
    out(DriverStep::ConfirmationTag),
    inp(DriverStep::ConfirmationTag),
];

static JPAKE_SCHEDULE: [StageSchedule; 3] = [
    StageSchedule {
        stage: Stage::RoundOne,
        steps: &JPAKE_ROUND_ONE,
        next: Stage::RoundTwo,
    },
    StageSchedule {
        stage: Stage::RoundTwo,
        steps: &JPAKE_ROUND_TWO,
        next: Stage::KeyConfirmation,
    },
    StageSchedule {
        stage: Stage::KeyConfirmation,
        steps: &JPAKE_KEY_CONFIRMATION,
        next: Stage::Confirmed,
    },
];

/// The full schedule of an algorithm, in stage order
pub(crate) fn schedule(algorithm: Algorithm) -> &'static [StageSchedule] {
    match algorithm {
        Algorithm::Jpake => &JPAKE_SCHEDULE,
        Algorithm::Spake2Plus => &[],
    }
}

/// The stage an operation enters right after setup
pub(crate) fn first_stage(algorithm: Algorithm) -> Option<Stage> {
    schedule(algorithm).first().map(|entry| entry.stage)
}

/// The schedule entry for `stage`, if the stage has steps
pub(crate) fn stage_schedule(algorithm: Algorithm, stage: Stage) -> Option<&'static StageSchedule> {
    schedule(algorithm).iter().find(|entry| entry.stage == stage)
}

/// The call expected at `(stage, sequence)`, if any
pub(crate) fn expected(algorithm: Algorithm, stage: Stage, sequence: usize) -> Option<ExpectedStep> {
    stage_schedule(algorithm, stage).and_then(|entry| entry.steps.get(sequence).copied())
}
