// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Outbound address-translation contract.

use net::buffer::PacketBufferMut;
use net::packet::{NatSessionId, Packet};

/// Verdict of the translation engine for one datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// The datagram may proceed, possibly rewritten in place.
    Forward,
    /// The datagram must be dropped.
    Reject,
}

/// Outbound half of the translation engine.
///
/// The pipeline invokes this exactly once per datagram, before the size
/// branch. Fragments of a translated datagram are never re-translated; they
/// inherit the rewritten header of their original.
pub trait OutboundTranslator<Buf: PacketBufferMut> {
    /// Rewrites `packet` in place on behalf of `session` and returns the
    /// verdict.
    fn translate_outbound(
        &mut self,
        session: NatSessionId,
        packet: &mut Packet<Buf>,
    ) -> TranslationOutcome;
}

/// Translator that forwards every datagram untouched.
///
/// For embeddings that route without rewriting, and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTranslation;

impl<Buf: PacketBufferMut> OutboundTranslator<Buf> for NoTranslation {
    fn translate_outbound(
        &mut self,
        _session: NatSessionId,
        _packet: &mut Packet<Buf>,
    ) -> TranslationOutcome {
        TranslationOutcome::Forward
    }
}
