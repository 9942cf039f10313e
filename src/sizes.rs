// Copyright (c) Meta Platforms, Inc. and affiliates.
//
// This source code is dual-licensed under either the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree or the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree. You may select, at your option, one of the above-listed
// licenses.

//! Buffer sizes for every step, computable without an operation
//!
//! A caller sizes its buffers with these functions before driving an
//! operation, and the operation uses the same functions to check the buffers
//! it is handed. `None` means the algorithm or primitive is not supported.

use crate::ciphersuite::{Algorithm, GroupId, Primitive};
use crate::schedule::StepKind;

/// Uncompressed SEC1 point: `0x04 || x || y`
pub(crate) const SECP256R1_ELEMENT_LEN: usize = 65;
pub(crate) const SECP256R1_SCALAR_LEN: usize = 32;
/// SHA-256 output
pub(crate) const SECP256R1_TAG_LEN: usize = 32;

pub(crate) const RISTRETTO255_ELEMENT_LEN: usize = 32;
pub(crate) const RISTRETTO255_SCALAR_LEN: usize = 32;
/// SHA-512 output
pub(crate) const RISTRETTO255_TAG_LEN: usize = 64;

pub(crate) const MAX_ELEMENT_LEN: usize = 65;
pub(crate) const MAX_SCALAR_LEN: usize = 32;
pub(crate) const MAX_TAG_LEN: usize = 64;

/// Largest value [`output_size`] returns for any supported configuration
pub const MAX_OUTPUT_SIZE: usize = max(MAX_ELEMENT_LEN, max(MAX_SCALAR_LEN, MAX_TAG_LEN));
/// Largest value [`input_size`] returns for any supported configuration
pub const MAX_INPUT_SIZE: usize = MAX_OUTPUT_SIZE;
/// Largest value [`implicit_key_size`] returns for any supported configuration
pub const MAX_IMPLICIT_KEY_SIZE: usize = MAX_ELEMENT_LEN;

const fn max(a: usize, b: usize) -> usize {
    if a > b {
        a
    } else {
        b
    }
}

struct Layout {
    element: usize,
    scalar: usize,
    tag: usize,
}

const fn layout(algorithm: Algorithm, primitive: Primitive) -> Option<Layout> {
    if !matches!(algorithm, Algorithm::Jpake) {
        return None;
    }
    match GroupId::from_primitive(primitive) {
        Some(GroupId::Secp256r1) => Some(Layout {
            element: SECP256R1_ELEMENT_LEN,
            scalar: SECP256R1_SCALAR_LEN,
            tag: SECP256R1_TAG_LEN,
        }),
        #[cfg(feature = "ristretto255")]
        Some(GroupId::Ristretto255) => Some(Layout {
            element: RISTRETTO255_ELEMENT_LEN,
            scalar: RISTRETTO255_SCALAR_LEN,
            tag: RISTRETTO255_TAG_LEN,
        }),
        None => None,
    }
}

const fn step_len(layout: Layout, step: StepKind) -> usize {
    match step {
        StepKind::KeyShare | StepKind::ZkPublic => layout.element,
        StepKind::ZkProof => layout.scalar,
        StepKind::ConfirmationTag => layout.tag,
    }
}

/// Exact number of bytes an output step writes
pub const fn output_size(algorithm: Algorithm, primitive: Primitive, step: StepKind) -> Option<usize> {
    match layout(algorithm, primitive) {
        Some(layout) => Some(step_len(layout, step)),
        None => None,
    }
}

/// Maximum number of bytes an input step accepts.
///
/// All steps are fixed-size, except that a secp256r1 proof response may be
/// sent without its leading zero bytes.
pub const fn input_size(algorithm: Algorithm, primitive: Primitive, step: StepKind) -> Option<usize> {
    output_size(algorithm, primitive, step)
}

/// Number of bytes of the implicit key
pub const fn implicit_key_size(algorithm: Algorithm, primitive: Primitive) -> Option<usize> {
    match layout(algorithm, primitive) {
        Some(layout) => Some(layout.element),
        None => None,
    }
}
