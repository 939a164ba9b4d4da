// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 identification sequence.

/// Source of IPv4 identification values for outbound datagrams.
///
/// Each datagram is stamped with the current value, after which the sequence
/// advances by one, wrapping modulo 2^16. Fragments never consult the
/// sequence: they copy the identification their original datagram already
/// carries, which is what ties a fragment train together on the wire.
///
/// The sequence is deliberately plain mutable state. The pipeline runs one
/// send at a time (see [`IpOutput`][crate::IpOutput]); a multi-worker
/// embedding must serialize access or partition sequences per worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentSequence {
    next: u16,
}

impl IdentSequence {
    /// Creates a sequence seeded from the thread-local RNG so identification
    /// values do not restart from a predictable point on every boot.
    #[must_use]
    pub fn new() -> IdentSequence {
        IdentSequence {
            next: rand::random(),
        }
    }

    /// Creates a sequence whose first issued value is `first`.
    #[must_use]
    pub const fn starting_at(first: u16) -> IdentSequence {
        IdentSequence { next: first }
    }

    /// Issues the next identification value and advances the sequence.
    pub fn issue(&mut self) -> u16 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl Default for IdentSequence {
    fn default() -> IdentSequence {
        IdentSequence::new()
    }
}
