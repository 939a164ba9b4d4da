// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Transmission counters.

/// Monotonic counters describing what the output pipeline has done.
///
/// The counters exist for external telemetry only: the pipeline increments
/// them but never reads them back, and nothing here resets them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutputStats {
    pub(crate) sent: u64,
    pub(crate) cannot_fragment: u64,
    pub(crate) fragmented: u64,
    pub(crate) fragments_emitted: u64,
    pub(crate) fragment_drops: u64,
}

impl OutputStats {
    /// Datagrams accepted by [`send`][crate::IpOutput::send], counted at
    /// header stamping and therefore inclusive of datagrams that later fail.
    #[must_use]
    pub const fn sent(&self) -> u64 {
        self.sent
    }

    /// Oversized datagrams refused because don't-fragment was set.
    #[must_use]
    pub const fn cannot_fragment(&self) -> u64 {
        self.cannot_fragment
    }

    /// Datagrams successfully fragmented, counted once per datagram after
    /// the whole train was handed to the link.
    #[must_use]
    pub const fn fragmented(&self) -> u64 {
        self.fragmented
    }

    /// Individual fragments handed to the link.
    #[must_use]
    pub const fn fragments_emitted(&self) -> u64 {
        self.fragments_emitted
    }

    /// Fragment trains dropped whole because a buffer could not be allocated.
    #[must_use]
    pub const fn fragment_drops(&self) -> u64 {
        self.fragment_drops
    }
}
