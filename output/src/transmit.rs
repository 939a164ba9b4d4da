// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Hand-off point between the pipeline and the uplink.

use net::buffer::PacketBufferMut;

/// Opaque identifier for the logical flow a frame belongs to.
///
/// The pipeline never inspects the value. It is carried through to the
/// translation engine and the link untouched so those collaborators can keep
/// per-flow state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowHandle(u64);

impl FlowHandle {
    /// Wraps a raw flow identifier.
    #[must_use]
    pub const fn new(raw: u64) -> FlowHandle {
        FlowHandle(raw)
    }

    /// The raw flow identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Consumer of fully-formed link-layer frames.
///
/// `transmit` is fire-and-forget: the frame is consumed, and delivery
/// failures inside the link are not surfaced back to the pipeline. The link
/// accounts for undeliverable frames at its own layer.
pub trait LinkTransmit<Buf: PacketBufferMut> {
    /// Delivers one frame on behalf of `flow`.
    fn transmit(&mut self, flow: FlowHandle, frame: Buf);
}
