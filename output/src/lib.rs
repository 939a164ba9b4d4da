// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]

//! Outbound IPv4 transmission pipeline for the NAT edge
//!
//! This package implements the path a locally generated or translated IPv4
//! datagram takes on its way out: next-hop resolution against a two-tier
//! neighbor store, a single pass through the outbound translation engine,
//! fragmentation when the datagram exceeds the uplink MTU, and hand-off of
//! finished frames to the link. [`IpOutput::send`] is the sole entry point.
//!
//! # Example
//!
//! ```
//! # use natedge_output::{FlowHandle, IpOutput, LinkTransmit, NeighborResolver};
//! # use natedge_output::{NoTranslation, OutputConfig};
//! # use net::buffer::{FrameBuffer, FramePool};
//! # use net::eth::mac::Mac;
//! # use net::mtu::Mtu;
//! # use net::packet::{NatSessionId, Packet};
//! # use std::net::Ipv4Addr;
//! # struct StaticArp(Mac);
//! # impl NeighborResolver for StaticArp {
//! #     fn lookup_neighbor(&self, _: Ipv4Addr) -> Option<Mac> { Some(self.0) }
//! #     fn lookup_lease(&self, _: Ipv4Addr) -> Option<Mac> { None }
//! #     fn request_discovery(&mut self, _: Ipv4Addr) {}
//! # }
//! # #[derive(Default)]
//! # struct Uplink(Vec<FrameBuffer>);
//! # impl LinkTransmit<FrameBuffer> for Uplink {
//! #     fn transmit(&mut self, _: FlowHandle, frame: FrameBuffer) { self.0.push(frame); }
//! # }
//! let config = OutputConfig {
//!     mtu: Mtu::DEFAULT,
//!     link_mac: Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
//!     default_session: NatSessionId::new(0),
//! };
//! let gateway = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x02]);
//! let mut output = IpOutput::new(
//!     config,
//!     StaticArp(gateway),
//!     NoTranslation,
//!     FramePool,
//!     Uplink::default(),
//! );
//!
//! let datagram = FrameBuffer::from_datagram(&[
//!     0x45, 0x00, 0x00, 0x1c, 0x00, 0x00, 0x00, 0x00, 0x40, 0x11, 0x00, 0x00,
//!     10, 0, 2, 15, 10, 0, 2, 2, // header
//!     1, 2, 3, 4, 5, 6, 7, 8, // payload
//! ])
//! .unwrap();
//! let packet = Packet::from_datagram(datagram).unwrap();
//! output.send(FlowHandle::new(1), packet).unwrap();
//! assert_eq!(output.stats().sent(), 1);
//! ```
//!
//! # Limitations
//!
//! - IPv4 only. IP options are unsupported: stamped and fragment headers
//!   are always the 20 octet base header.
//! - No path-MTU discovery and no fragment retransmission. An oversized
//!   datagram with don't-fragment set is refused with
//!   [`SendError::CannotFragment`]; signalling that back to the sender
//!   (ICMP) is the caller's business.
//! - One send at a time. The pipeline takes no locks; a multi-worker
//!   embedding must serialize or partition (see [`IdentSequence`]).
//! - Link delivery is fire-and-forget: transmit failures below
//!   [`LinkTransmit`] never surface here.

pub mod config;
pub mod error;
mod fragment;
pub mod ident;
pub mod pipeline;
pub mod resolve;
pub mod stats;
pub mod translate;
pub mod transmit;

mod test;

pub use config::OutputConfig;
pub use error::SendError;
pub use ident::IdentSequence;
pub use pipeline::IpOutput;
pub use resolve::{NeighborResolver, resolve_next_hop};
pub use stats::OutputStats;
pub use translate::{NoTranslation, OutboundTranslator, TranslationOutcome};
pub use transmit::{FlowHandle, LinkTransmit};
