// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The fragmentation engine.
//!
//! Splits one oversized datagram into a train of self-contained fragments.
//! The train is all-or-nothing: either every fragment reaches the link, or
//! the whole train is dropped and nothing does.

use crate::error::SendError;
use crate::pipeline::IpOutput;
use crate::resolve::NeighborResolver;
use crate::translate::OutboundTranslator;
use crate::transmit::{FlowHandle, LinkTransmit};
use net::buffer::{Append, BufferPool, PacketBufferMut};
use net::checksum::Checksum;
use net::eth::mac::Mac;
use net::ipv4::{FragOffset, IpFlags, Ipv4View, Ipv4ViewMut};
use net::packet::Packet;
use tracing::{debug, trace};

impl<
    Buf: PacketBufferMut,
    R: NeighborResolver,
    T: OutboundTranslator<Buf>,
    P: BufferPool<Buf>,
    X: LinkTransmit<Buf>,
> IpOutput<Buf, R, T, P, X>
{
    /// Fragments `original` to fit the MTU and, once the whole train has
    /// been built, dispatches it in ascending offset order.
    ///
    /// The first fragment reuses the original's buffer trimmed in place;
    /// every later fragment is a fresh allocation carrying a copy of the
    /// base header and its payload slice. Any construction failure drops
    /// the entire train, already-built fragments included, unsent.
    pub(crate) fn fragment_and_send(
        &mut self,
        flow: FlowHandle,
        mut original: Packet<Buf>,
        peer: Mac,
    ) -> Result<(), SendError> {
        let (hlen, total, flags) = {
            let view = original.ipv4();
            (view.header_len(), view.total_len(), view.flags())
        };

        let mtu = self.config.mtu.to_u16();
        let per_frag = mtu.checked_sub(hlen).map_or(0, |room| room & !7);
        if per_frag < 8 {
            return Err(SendError::MtuTooSmall(self.config.mtu));
        }

        // Trailing fragments first, while the original still holds the whole
        // datagram. `off` counts from the start of the IP header.
        let tail_octets = total - hlen - per_frag;
        let mut train = Vec::with_capacity(usize::from(tail_octets.div_ceil(per_frag)));
        for off in (hlen + per_frag..total).step_by(usize::from(per_frag)) {
            let remaining = total - off;
            let len = per_frag.min(remaining);
            let last = remaining <= per_frag;
            let fragment = self.build_fragment(&original, off, len, last)?;
            let end = off + len;
            trace!("built fragment covering octets {off}..{end}");
            train.push(fragment);
        }

        // First fragment: the original trimmed in place. Fields go first;
        // the trim requires the claimed total to fit the shortened buffer.
        {
            let mut view = original.ipv4_mut();
            view.set_total_len(hlen + per_frag)
                .set_flags(flags | IpFlags::MORE_FRAGMENTS)
                .update_checksum();
        }
        original
            .trim_tail_to(hlen + per_frag)
            .unwrap_or_else(|e| unreachable!("{e:?}"));

        let eth = self.link_header(peer);
        let count = train.len() + 1;
        self.link.transmit(flow, original.into_frame(&eth));
        self.stats.fragments_emitted += 1;
        for fragment in train {
            self.link.transmit(flow, fragment.into_frame(&eth));
            self.stats.fragments_emitted += 1;
        }
        self.stats.fragmented += 1;
        trace!("fragmented {total} octet datagram into {count} frames");
        Ok(())
    }

    /// Builds one trailing fragment: `len` payload octets taken from the
    /// original datagram starting `off` octets in.
    fn build_fragment(
        &mut self,
        original: &Packet<Buf>,
        off: u16,
        len: u16,
        last: bool,
    ) -> Result<Packet<Buf>, SendError> {
        let view = original.ipv4();
        let (hlen, flags, base_offset) = (view.header_len(), view.flags(), view.fragment_offset());

        let mut buf = match self.pool.alloc() {
            Ok(buf) => buf,
            Err(e) => {
                self.stats.fragment_drops += 1;
                debug!("fragment train dropped, pool exhausted: {e:?}");
                return Err(SendError::FragmentAllocation);
            }
        };
        let bytes = match buf.append(hlen + len) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.stats.fragment_drops += 1;
                debug!("fragment train dropped, buffer cannot hold a fragment: {e:?}");
                return Err(SendError::FragmentAllocation);
            }
        };

        let source = original.as_bytes();
        bytes[..usize::from(hlen)].copy_from_slice(&source[..usize::from(hlen)]);
        let payload = &source[usize::from(off)..usize::from(off + len)];
        bytes[usize::from(hlen)..].copy_from_slice(payload);

        {
            let mut header = Ipv4ViewMut::new(bytes).unwrap_or_else(|e| unreachable!("{e:?}"));
            // The orchestrator zeroed the offset at stamping, so the sum
            // stays within the 13 bit field.
            let units = base_offset.units() + ((off - hlen) >> 3);
            let offset = FragOffset::new(units).unwrap_or_else(|e| unreachable!("{e:?}"));
            let mut frag_flags = flags - IpFlags::MORE_FRAGMENTS;
            if flags.contains(IpFlags::MORE_FRAGMENTS) || !last {
                frag_flags |= IpFlags::MORE_FRAGMENTS;
            }
            header
                .set_header_len(Ipv4View::BASE_HEADER_LEN)
                .set_total_len(hlen + len)
                .set_flags(frag_flags)
                .set_fragment_offset(offset)
                .update_checksum();
        }

        match Packet::from_datagram(buf) {
            Ok(fragment) => Ok(fragment),
            Err(e) => {
                self.stats.fragment_drops += 1;
                let reason = e.reason;
                debug!("fragment train dropped, fragment rejected: {reason}");
                Err(SendError::FragmentAllocation)
            }
        }
    }
}
