// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Per-packet metadata stamped by the stages that produced the datagram.

use crate::eth::Mac;
use serde::{Deserialize, Serialize};

/// Identifies one translation session held by the translator.
///
/// The value is opaque to the transmission pipeline; it is carried from the
/// producing stage to the translator unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct NatSessionId(u32);

impl NatSessionId {
    /// Wrap a raw session number.
    #[must_use]
    pub const fn new(id: u32) -> NatSessionId {
        NatSessionId(id)
    }

    /// The raw session number.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Metadata attached to a [`Packet`] to steer its transmission.
///
/// [`Packet`]: crate::packet::Packet
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PacketMeta {
    /// Translation session to use; the subsystem default applies when `None`.
    pub nat_session: Option<NatSessionId>,
    /// Link peer the producer already knows. When set, neighbor resolution
    /// is skipped and the frame is addressed to this peer.
    pub link_peer: Option<Mac>,
}
