// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#[cfg(test)]
mod tests {
    use crate::{
        FlowHandle, IdentSequence, IpOutput, LinkTransmit, NeighborResolver, NoTranslation,
        OutboundTranslator, OutputConfig, SendError, TranslationOutcome,
    };
    use etherparse::Ipv4Header;
    use net::buffer::{BufferPool, FrameBuffer, FramePool, PacketBufferMut};
    use net::checksum::internet_checksum;
    use net::eth::mac::Mac;
    use net::ipv4::{IpFlags, Ipv4View};
    use net::mtu::Mtu;
    use net::packet::{NatSessionId, Packet};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;
    use tracing_test::traced_test;

    const EDGE_MAC: Mac = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]);
    const GATEWAY_MAC: Mac = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x02]);
    const LOOP_MAC: Mac = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x0f]);
    const GUEST_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 15);
    const HOST_IP: Ipv4Addr = Ipv4Addr::new(93, 184, 216, 34);
    const PUBLIC_IP: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 7);
    const FLOW: FlowHandle = FlowHandle::new(42);

    #[derive(Debug, Default)]
    struct ScriptedResolver {
        neighbors: HashMap<Ipv4Addr, Mac>,
        leases: HashMap<Ipv4Addr, Mac>,
        discoveries: Vec<Ipv4Addr>,
    }

    impl ScriptedResolver {
        fn knowing(ip: Ipv4Addr, mac: Mac) -> ScriptedResolver {
            let mut resolver = ScriptedResolver::default();
            resolver.neighbors.insert(ip, mac);
            resolver
        }
    }

    impl NeighborResolver for ScriptedResolver {
        fn lookup_neighbor(&self, ip: Ipv4Addr) -> Option<Mac> {
            self.neighbors.get(&ip).copied()
        }

        fn lookup_lease(&self, ip: Ipv4Addr) -> Option<Mac> {
            self.leases.get(&ip).copied()
        }

        fn request_discovery(&mut self, ip: Ipv4Addr) {
            self.discoveries.push(ip);
        }
    }

    /// Forwards everything, recording the sessions it was handed.
    #[derive(Debug, Default)]
    struct CountingNat {
        calls: usize,
        sessions: Vec<NatSessionId>,
    }

    impl<Buf: PacketBufferMut> OutboundTranslator<Buf> for CountingNat {
        fn translate_outbound(
            &mut self,
            session: NatSessionId,
            _packet: &mut Packet<Buf>,
        ) -> TranslationOutcome {
            self.calls += 1;
            self.sessions.push(session);
            TranslationOutcome::Forward
        }
    }

    #[derive(Debug, Default)]
    struct RejectingNat;

    impl<Buf: PacketBufferMut> OutboundTranslator<Buf> for RejectingNat {
        fn translate_outbound(
            &mut self,
            _session: NatSessionId,
            _packet: &mut Packet<Buf>,
        ) -> TranslationOutcome {
            TranslationOutcome::Reject
        }
    }

    /// Rewrites the source address, as the translation engine does for a
    /// masqueraded flow.
    #[derive(Debug)]
    struct MasqueradeNat {
        public: Ipv4Addr,
        calls: usize,
    }

    impl<Buf: PacketBufferMut> OutboundTranslator<Buf> for MasqueradeNat {
        fn translate_outbound(
            &mut self,
            _session: NatSessionId,
            packet: &mut Packet<Buf>,
        ) -> TranslationOutcome {
            self.calls += 1;
            packet.ipv4_mut().set_source(self.public);
            TranslationOutcome::Forward
        }
    }

    #[derive(Debug, Default)]
    struct CapturingLink {
        frames: Vec<(FlowHandle, FrameBuffer)>,
    }

    impl LinkTransmit<FrameBuffer> for CapturingLink {
        fn transmit(&mut self, flow: FlowHandle, frame: FrameBuffer) {
            self.frames.push((flow, frame));
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("pool dry")]
    struct PoolDry;

    /// Pool that fails on the nth allocation, counted from zero.
    #[derive(Debug)]
    struct FlakyPool {
        fail_at: usize,
        allocated: usize,
    }

    impl BufferPool<FrameBuffer> for FlakyPool {
        type Error = PoolDry;

        fn alloc(&mut self) -> Result<FrameBuffer, PoolDry> {
            if self.allocated == self.fail_at {
                return Err(PoolDry);
            }
            self.allocated += 1;
            Ok(FrameBuffer::new())
        }
    }

    fn config(mtu: u16) -> OutputConfig {
        OutputConfig {
            mtu: Mtu::try_from(mtu).unwrap(),
            link_mac: EDGE_MAC,
            default_session: NatSessionId::new(0),
        }
    }

    /// A guest-to-host datagram: base header plus `payload_len` octets of a
    /// repeating pattern. Identification and checksum are left for the
    /// pipeline to fill in.
    fn datagram_with_flags(payload_len: u16, flags: IpFlags) -> Packet<FrameBuffer> {
        let total = 20 + payload_len;
        let mut bytes = Vec::with_capacity(usize::from(total));
        bytes.extend_from_slice(&[0x45, 0x00]);
        bytes.extend_from_slice(&total.to_be_bytes());
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(&flags.bits().to_be_bytes());
        bytes.extend_from_slice(&[0x40, 0x11]);
        bytes.extend_from_slice(&[0x00, 0x00]);
        bytes.extend_from_slice(&GUEST_IP.octets());
        bytes.extend_from_slice(&HOST_IP.octets());
        bytes.extend((0..payload_len).map(|i| u8::try_from(i % 251).unwrap()));
        let buffer = FrameBuffer::from_datagram(&bytes).unwrap();
        Packet::from_datagram(buffer).unwrap()
    }

    fn datagram(payload_len: u16) -> Packet<FrameBuffer> {
        datagram_with_flags(payload_len, IpFlags::empty())
    }

    /// Splits an emitted frame into its Ethernet header and IPv4 datagram.
    fn split_frame(frame: &FrameBuffer) -> (&[u8], &[u8]) {
        frame.as_ref().split_at(14)
    }

    fn assert_eth(eth: &[u8], destination: Mac, source: Mac) {
        assert_eq!(eth[..6], destination.0);
        assert_eq!(eth[6..12], source.0);
        assert_eq!(eth[12..14], [0x08, 0x00]);
    }

    #[test]
    fn small_datagram_goes_out_as_one_valid_frame() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        )
        .with_ident_sequence(IdentSequence::starting_at(0x3100));

        output.send(FLOW, datagram(64)).unwrap();

        let stats = output.stats();
        assert_eq!(stats.sent(), 1);
        assert_eq!(stats.fragmented(), 0);
        assert_eq!(stats.fragments_emitted(), 0);

        let frames = &output.link().frames;
        assert_eq!(frames.len(), 1);
        let (flow, frame) = &frames[0];
        assert_eq!(*flow, FLOW);

        let (eth, ip) = split_frame(frame);
        assert_eth(eth, GATEWAY_MAC, EDGE_MAC);
        let view = Ipv4View::new(ip).unwrap();
        assert_eq!(view.identification(), 0x3100);
        assert_eq!(view.total_len(), 84);
        // a valid header sums to zero with its checksum in place
        assert_eq!(internet_checksum(&ip[..20]), 0);

        // independent decode as a cross-check
        let (parsed, _rest) = Ipv4Header::from_slice(ip).unwrap();
        assert_eq!(parsed.header_checksum, parsed.calc_header_checksum());
        assert_eq!(parsed.total_len, 84);
        assert_eq!(parsed.source, GUEST_IP.octets());
        assert_eq!(parsed.destination, HOST_IP.octets());
    }

    #[test]
    fn datagram_filling_the_mtu_exactly_is_not_fragmented() {
        let mut output = IpOutput::new(
            config(120),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );

        output.send(FLOW, datagram(100)).unwrap();

        assert_eq!(output.link().frames.len(), 1);
        assert_eq!(output.stats().fragmented(), 0);
    }

    #[test]
    fn stamping_clears_stray_flags_but_keeps_dont_fragment() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );

        let packet =
            datagram_with_flags(32, IpFlags::DONT_FRAGMENT | IpFlags::MORE_FRAGMENTS);
        output.send(FLOW, packet).unwrap();

        let frames = &output.link().frames;
        let (_eth, ip) = split_frame(&frames[0].1);
        let view = Ipv4View::new(ip).unwrap();
        assert_eq!(view.flags(), IpFlags::DONT_FRAGMENT);
        assert_eq!(view.fragment_offset().units(), 0);
    }

    #[test]
    fn session_defaults_when_packet_carries_none() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            CountingNat::default(),
            FramePool,
            CapturingLink::default(),
        );

        output.send(FLOW, datagram(16)).unwrap();
        let mut tagged = datagram(16);
        tagged.meta.nat_session = Some(NatSessionId::new(9));
        output.send(FLOW, tagged).unwrap();

        assert_eq!(
            output.nat.sessions,
            [NatSessionId::new(0), NatSessionId::new(9)]
        );
    }

    #[test]
    fn prefilled_link_peer_skips_resolution() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::default(),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );

        let mut packet = datagram(32);
        packet.meta.link_peer = Some(LOOP_MAC);
        output.send(FLOW, packet).unwrap();

        assert!(output.resolver().discoveries.is_empty());
        let frames = &output.link().frames;
        assert_eq!(frames.len(), 1);
        let (eth, _ip) = split_frame(&frames[0].1);
        assert_eth(eth, LOOP_MAC, EDGE_MAC);
    }

    #[test]
    #[traced_test]
    fn translation_reject_drops_quietly() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            RejectingNat,
            FramePool,
            CapturingLink::default(),
        );

        assert_eq!(
            output.send(FLOW, datagram(32)),
            Err(SendError::TranslationRejected)
        );
        assert!(output.link().frames.is_empty());
        assert_eq!(output.stats().sent(), 1);
        assert!(logs_contain("translation rejected"));
    }

    #[test]
    fn fragments_reassemble_to_the_original_datagram() {
        let payload_len = 257;
        let original = datagram(payload_len);
        let payload = original.payload().to_vec();

        let mut output = IpOutput::new(
            config(100),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            CountingNat::default(),
            FramePool,
            CapturingLink::default(),
        )
        .with_ident_sequence(IdentSequence::starting_at(0x0700));

        output.send(FLOW, original).unwrap();

        let stats = output.stats();
        assert_eq!(stats.sent(), 1);
        assert_eq!(stats.fragmented(), 1);
        assert_eq!(output.nat.calls, 1);

        // per fragment payload = (100 - 20) & !7 = 80
        let frames = &output.link().frames;
        assert_eq!(frames.len(), 4);
        assert_eq!(stats.fragments_emitted(), 4);

        let mut reassembled = vec![0u8; usize::from(payload_len)];
        let mut previous_offset = None;
        for (i, (flow, frame)) in frames.iter().enumerate() {
            assert_eq!(*flow, FLOW);
            let (eth, ip) = split_frame(frame);
            assert_eth(eth, GATEWAY_MAC, EDGE_MAC);

            let view = Ipv4View::new(ip).unwrap();
            assert_eq!(view.identification(), 0x0700);
            assert_eq!(view.header_len(), 20);
            assert_eq!(internet_checksum(&ip[..20]), 0);

            let offset = usize::from(view.fragment_offset().octets());
            if let Some(previous) = previous_offset {
                assert!(offset > previous, "fragments must leave in offset order");
            }
            previous_offset = Some(offset);

            let last = i == frames.len() - 1;
            assert_eq!(view.flags().contains(IpFlags::MORE_FRAGMENTS), !last);

            let data = &ip[20..usize::from(view.total_len())];
            assert!(offset + data.len() <= usize::from(payload_len));
            reassembled[offset..offset + data.len()].copy_from_slice(data);
        }
        assert_eq!(reassembled, payload);
    }

    #[test]
    fn rewritten_source_reaches_every_fragment() {
        let mut output = IpOutput::new(
            config(100),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            MasqueradeNat {
                public: PUBLIC_IP,
                calls: 0,
            },
            FramePool,
            CapturingLink::default(),
        );

        output.send(FLOW, datagram(300)).unwrap();

        assert_eq!(output.nat.calls, 1, "fragments must not be re-translated");
        let frames = &output.link().frames;
        assert!(frames.len() > 1);
        for (_flow, frame) in frames {
            let (_eth, ip) = split_frame(frame);
            let view = Ipv4View::new(ip).unwrap();
            assert_eq!(view.source(), PUBLIC_IP);
            assert_eq!(internet_checksum(&ip[..20]), 0);
        }
    }

    #[test]
    fn dont_fragment_oversize_is_refused() {
        let mut output = IpOutput::new(
            config(100),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );

        let packet = datagram_with_flags(300, IpFlags::DONT_FRAGMENT);
        assert_eq!(output.send(FLOW, packet), Err(SendError::CannotFragment));

        let stats = output.stats();
        assert_eq!(stats.cannot_fragment(), 1);
        assert_eq!(stats.sent(), 1);
        assert_eq!(stats.fragmented(), 0);
        assert!(output.link().frames.is_empty());
    }

    #[test]
    fn allocation_failure_drops_the_whole_train() {
        let mut output = IpOutput::new(
            config(100),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FlakyPool {
                fail_at: 1,
                allocated: 0,
            },
            CapturingLink::default(),
        );

        // total 320 wants fragments at payload offsets 0, 80, 160, 240; the
        // pool dies building the third
        assert_eq!(
            output.send(FLOW, datagram(300)),
            Err(SendError::FragmentAllocation)
        );

        let stats = output.stats();
        assert!(output.link().frames.is_empty(), "no partial train on the wire");
        assert_eq!(stats.fragmented(), 0);
        assert_eq!(stats.fragments_emitted(), 0);
        assert_eq!(stats.fragment_drops(), 1);
    }

    #[test]
    fn unresolved_destination_fires_discovery_each_attempt() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::default(),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );

        assert_eq!(
            output.send(FLOW, datagram(32)),
            Err(SendError::Unresolved(HOST_IP))
        );
        assert_eq!(output.resolver().discoveries, [HOST_IP]);
        assert!(output.link().frames.is_empty());

        // a retry before discovery completes just asks again
        assert_eq!(
            output.send(FLOW, datagram(32)),
            Err(SendError::Unresolved(HOST_IP))
        );
        assert_eq!(output.resolver().discoveries, [HOST_IP, HOST_IP]);
        assert_eq!(output.stats().sent(), 2);
    }

    #[test]
    fn mtu_without_fragment_room_is_reported() {
        // 24 - 20 leaves 4 octets, below the 8 octet fragment unit
        let mut output = IpOutput::new(
            config(24),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );
        assert_eq!(
            output.send(FLOW, datagram(100)),
            Err(SendError::MtuTooSmall(Mtu::try_from(24).unwrap()))
        );
        assert!(output.link().frames.is_empty());
        assert_eq!(output.stats().fragment_drops(), 0);
        assert_eq!(output.stats().fragmented(), 0);

        // an MTU below the header length itself reports the same way
        let mut output = IpOutput::new(
            config(16),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        );
        assert_eq!(
            output.send(FLOW, datagram(100)),
            Err(SendError::MtuTooSmall(Mtu::try_from(16).unwrap()))
        );
    }

    #[test]
    fn identification_increases_and_wraps() {
        let mut output = IpOutput::new(
            config(1500),
            ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
            NoTranslation,
            FramePool,
            CapturingLink::default(),
        )
        .with_ident_sequence(IdentSequence::starting_at(u16::MAX));

        output.send(FLOW, datagram(8)).unwrap();
        output.send(FLOW, datagram(8)).unwrap();

        let ids: Vec<u16> = output
            .link()
            .frames
            .iter()
            .map(|(_flow, frame)| {
                let (_eth, ip) = split_frame(frame);
                Ipv4View::new(ip).unwrap().identification()
            })
            .collect();
        assert_eq!(ids, [u16::MAX, 0]);
    }

    #[test]
    fn any_datagram_reassembles_after_send() {
        bolero::check!()
            .with_type()
            .for_each(|&(mtu_seed, len_seed): &(u16, u16)| {
                let mtu = 28 + mtu_seed % 200;
                let payload_len = 1 + len_seed % 900;
                let original = datagram(payload_len);
                let payload = original.payload().to_vec();

                let mut output = IpOutput::new(
                    config(mtu),
                    ScriptedResolver::knowing(HOST_IP, GATEWAY_MAC),
                    NoTranslation,
                    FramePool,
                    CapturingLink::default(),
                );
                output.send(FLOW, original).unwrap();

                let mut reassembled = vec![0u8; usize::from(payload_len)];
                for (_flow, frame) in &output.link().frames {
                    let (_eth, ip) = split_frame(frame);
                    let view = Ipv4View::new(ip).unwrap();
                    let hlen = usize::from(view.header_len());
                    assert_eq!(internet_checksum(&ip[..hlen]), 0);
                    let offset = usize::from(view.fragment_offset().octets());
                    let data = &ip[hlen..usize::from(view.total_len())];
                    reassembled[offset..offset + data.len()].copy_from_slice(data);
                }
                assert_eq!(reassembled, payload);
            });
    }
}
