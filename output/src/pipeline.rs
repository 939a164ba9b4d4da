// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The output orchestrator.

use crate::config::OutputConfig;
use crate::error::SendError;
use crate::ident::IdentSequence;
use crate::resolve::{NeighborResolver, resolve_next_hop};
use crate::stats::OutputStats;
use crate::translate::{OutboundTranslator, TranslationOutcome};
use crate::transmit::{FlowHandle, LinkTransmit};
use net::buffer::{BufferPool, PacketBufferMut};
use net::checksum::Checksum;
use net::eth::mac::Mac;
use net::eth::{Eth, EtherType};
use net::ipv4::{FragOffset, IpFlags, Ipv4View};
use net::packet::Packet;
use std::marker::PhantomData;

#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// The output orchestrator: the single entry point for outbound IPv4
/// datagrams.
///
/// `IpOutput` owns the uplink configuration, the identification sequence,
/// the transmission counters, and the four collaborators it sequences: the
/// neighbor resolver, the translation engine, the fragment buffer pool, and
/// the link itself.
///
/// The pipeline is synchronous: each [`send`][IpOutput::send] runs to
/// completion inside the caller's processing tick, performs no I/O of its
/// own, and never blocks. An embedding that wants multiple workers must
/// give each its own `IpOutput` (with a partitioned identification
/// sequence) or serialize access.
pub struct IpOutput<
    Buf: PacketBufferMut,
    R: NeighborResolver,
    T: OutboundTranslator<Buf>,
    P: BufferPool<Buf>,
    X: LinkTransmit<Buf>,
> {
    pub(crate) config: OutputConfig,
    pub(crate) ident: IdentSequence,
    pub(crate) stats: OutputStats,
    pub(crate) resolver: R,
    pub(crate) nat: T,
    pub(crate) pool: P,
    pub(crate) link: X,
    _marker: PhantomData<Buf>,
}

impl<
    Buf: PacketBufferMut,
    R: NeighborResolver,
    T: OutboundTranslator<Buf>,
    P: BufferPool<Buf>,
    X: LinkTransmit<Buf>,
> IpOutput<Buf, R, T, P, X>
{
    /// Creates a pipeline over the given collaborators. The identification
    /// sequence starts at a random value.
    #[must_use]
    pub fn new(config: OutputConfig, resolver: R, nat: T, pool: P, link: X) -> Self {
        IpOutput {
            config,
            ident: IdentSequence::new(),
            stats: OutputStats::default(),
            resolver,
            nat,
            pool,
            link,
            _marker: PhantomData,
        }
    }

    /// Replaces the identification sequence, for deterministic tests and for
    /// embeddings that partition the sequence across workers.
    #[must_use]
    pub fn with_ident_sequence(mut self, ident: IdentSequence) -> Self {
        self.ident = ident;
        self
    }

    /// Snapshot of the transmission counters.
    #[must_use]
    pub const fn stats(&self) -> OutputStats {
        self.stats
    }

    /// The neighbor resolver.
    #[must_use]
    pub const fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The neighbor resolver, mutably. The host loop uses this to drain
    /// pending discovery requests into actual queries.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    /// The link.
    #[must_use]
    pub const fn link(&self) -> &X {
        &self.link
    }

    /// The link, mutably.
    pub fn link_mut(&mut self) -> &mut X {
        &mut self.link
    }

    /// Sends one IPv4 datagram: stamps the header, resolves the link-layer
    /// next hop, runs outbound translation once, then either transmits the
    /// datagram as a single frame or fragments it to fit the MTU.
    ///
    /// The packet is consumed on every path. On failure the datagram, and
    /// any fragments already derived from it, has been dropped whole;
    /// nothing is ever partially transmitted.
    ///
    /// # Errors
    ///
    /// - [`SendError::Unresolved`] if no link-layer address is known for the
    ///   destination. A discovery request has been fired; the caller may
    ///   retry later.
    /// - [`SendError::TranslationRejected`] if the translation engine
    ///   refused the datagram.
    /// - [`SendError::CannotFragment`] if the datagram exceeds the MTU and
    ///   carries the don't-fragment flag.
    /// - [`SendError::MtuTooSmall`] if the MTU cannot carry even one
    ///   eight-octet fragment payload unit.
    /// - [`SendError::FragmentAllocation`] if building the fragment train
    ///   ran out of buffers.
    pub fn send(&mut self, flow: FlowHandle, mut packet: Packet<Buf>) -> Result<(), SendError> {
        let ident = self.ident.issue();
        {
            let mut ipv4 = packet.ipv4_mut();
            let flags = ipv4.as_view().flags() & IpFlags::DONT_FRAGMENT;
            ipv4.set_version(4)
                .set_header_len(Ipv4View::BASE_HEADER_LEN)
                .set_flags(flags)
                .set_fragment_offset(FragOffset::ZERO)
                .set_identification(ident);
        }
        self.stats.sent += 1;

        let peer = match packet.meta.link_peer {
            Some(mac) => mac,
            None => {
                let destination = packet.ipv4().destination();
                match resolve_next_hop(&mut self.resolver, destination) {
                    Some(mac) => mac,
                    None => return Err(SendError::Unresolved(destination)),
                }
            }
        };

        let session = packet
            .meta
            .nat_session
            .unwrap_or(self.config.default_session);
        match self.nat.translate_outbound(session, &mut packet) {
            TranslationOutcome::Forward => {}
            TranslationOutcome::Reject => {
                debug!("translation rejected outbound datagram on session {session:?}");
                return Err(SendError::TranslationRejected);
            }
        }

        let total = packet.ipv4().total_len();
        if total <= self.config.mtu.to_u16() {
            packet.ipv4_mut().update_checksum();
            let frame = packet.into_frame(&self.link_header(peer));
            self.link.transmit(flow, frame);
            trace!("transmitted {total} octet datagram unfragmented");
            return Ok(());
        }

        if packet.ipv4().flags().contains(IpFlags::DONT_FRAGMENT) {
            self.stats.cannot_fragment += 1;
            debug!("refusing to fragment {total} octet datagram: don't-fragment set");
            return Err(SendError::CannotFragment);
        }

        self.fragment_and_send(flow, packet, peer)
    }

    /// Link-layer header for a frame destined to `peer`.
    pub(crate) const fn link_header(&self, peer: Mac) -> Eth {
        Eth::new(peer, self.config.link_mac, EtherType::IPV4)
    }
}
