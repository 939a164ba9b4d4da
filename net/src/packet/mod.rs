// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Owned IPv4 datagrams.

mod meta;

#[allow(unused_imports)] // re-export
pub use meta::*;

use crate::buffer::{BufferTooShort, Headroom, PacketBufferMut, Prepend, TrimFromEnd};
use crate::eth::Eth;
use crate::ipv4::{Ipv4View, Ipv4ViewError, Ipv4ViewMut};

/// An owned IPv4 datagram.
///
/// The buffer's readable region starts at the version octet of the IPv4
/// header. Construction guarantees that the header is well formed, that the
/// header's claimed total length fits the readable region, and that enough
/// headroom is reserved ahead of the header for the link-layer header.
#[derive(Debug)]
pub struct Packet<Buf: PacketBufferMut> {
    datagram: Buf,
    /// metadata stamped by upstream stages to steer transmission
    pub meta: PacketMeta,
}

/// Errors which may occur when failing to produce a [`Packet`].
#[derive(Debug, thiserror::Error)]
#[error("invalid datagram: {reason}")]
pub struct InvalidDatagram<Buf: PacketBufferMut> {
    /// The rejected buffer, handed back so the caller can reclaim it.
    pub buffer: Buf,
    /// Why the buffer was rejected.
    #[source]
    pub reason: DatagramError,
}

/// Reasons a buffer is not a transmittable datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DatagramError {
    /// The region does not start with a well formed IPv4 header.
    #[error(transparent)]
    Header(#[from] Ipv4ViewError),
    /// The header claims more octets than the readable region holds.
    #[error("total length {total} octets, but only {available} readable")]
    TotalLength {
        /// The header's claimed total length.
        total: u16,
        /// Readable octets in the buffer.
        available: usize,
    },
    /// The header claims a total length shorter than the header itself.
    #[error("total length {total} octets shorter than the {header} octet header")]
    TotalBelowHeader {
        /// The header's claimed total length.
        total: u16,
        /// The header's own length.
        header: u16,
    },
    /// The readable region is longer than an IPv4 datagram can describe.
    #[error("{0} readable octets; an IPv4 datagram holds at most 65535")]
    Oversize(usize),
    /// Not enough reserved headroom for the link-layer header.
    #[error("{have} octets of headroom, {need} required for the link header")]
    Headroom {
        /// Headroom present in the buffer.
        have: u16,
        /// Headroom the link header requires.
        need: u16,
    },
}

impl<Buf: PacketBufferMut> Packet<Buf> {
    /// Take ownership of `buf` as an IPv4 datagram.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidDatagram`] carrying the buffer back if the region
    /// does not hold a well formed datagram with link headroom reserved.
    pub fn from_datagram(buf: Buf) -> Result<Packet<Buf>, InvalidDatagram<Buf>> {
        if let Err(reason) = Self::check(&buf) {
            return Err(InvalidDatagram {
                buffer: buf,
                reason,
            });
        }
        Ok(Packet {
            datagram: buf,
            meta: PacketMeta::default(),
        })
    }

    fn check(buf: &Buf) -> Result<(), DatagramError> {
        let bytes = buf.as_ref();
        if bytes.len() > usize::from(u16::MAX) {
            return Err(DatagramError::Oversize(bytes.len()));
        }
        let view = Ipv4View::new(bytes)?;
        if view.total_len() < view.header_len() {
            return Err(DatagramError::TotalBelowHeader {
                total: view.total_len(),
                header: view.header_len(),
            });
        }
        if usize::from(view.total_len()) > bytes.len() {
            return Err(DatagramError::TotalLength {
                total: view.total_len(),
                available: bytes.len(),
            });
        }
        if buf.headroom() < Eth::HEADER_LEN {
            return Err(DatagramError::Headroom {
                have: buf.headroom(),
                need: Eth::HEADER_LEN,
            });
        }
        Ok(())
    }

    /// View the IPv4 header.
    #[must_use]
    pub fn ipv4(&self) -> Ipv4View<'_> {
        Ipv4View::new(self.datagram.as_ref()).unwrap_or_else(|e| unreachable!("{e:?}"))
    }

    /// Mutably view the IPv4 header.
    pub fn ipv4_mut(&mut self) -> Ipv4ViewMut<'_> {
        Ipv4ViewMut::new(self.datagram.as_mut()).unwrap_or_else(|e| unreachable!("{e:?}"))
    }

    /// The full readable region: header, payload, and any tail padding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.datagram.as_ref()
    }

    /// The payload octets between the header and the claimed total length.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        let view = self.ipv4();
        let start = usize::from(view.header_len());
        let end = usize::from(view.total_len());
        &self.datagram.as_ref()[start..end]
    }

    /// Trim the readable region from the end down to `len` octets.
    ///
    /// `len` must still cover the header's claimed total length, so updating
    /// the total-length field precedes the trim.
    ///
    /// # Errors
    ///
    /// Fails if `len` exceeds the readable length or would cut into the
    /// claimed total length.
    pub fn trim_tail_to(&mut self, len: u16) -> Result<(), BufferTooShort> {
        let current = self.datagram.as_ref().len();
        if usize::from(len) > current || len < self.ipv4().total_len() {
            return Err(BufferTooShort);
        }
        #[allow(clippy::cast_possible_truncation)] // current validated <= u16::MAX in ctor
        let delta = (current - usize::from(len)) as u16;
        self.datagram
            .trim_from_end(delta)
            .unwrap_or_else(|e| unreachable!("{e:?}"));
        Ok(())
    }

    /// Prepend the link-layer header and return the transmit-ready frame.
    ///
    /// Construction reserved the headroom, so the prepend itself cannot
    /// fail.
    #[must_use]
    pub fn into_frame(mut self, eth: &Eth) -> Buf {
        let bytes = self
            .datagram
            .prepend(Eth::HEADER_LEN)
            .unwrap_or_else(|e| unreachable!("{e:?}"));
        eth.emit(bytes).unwrap_or_else(|e| unreachable!("{e:?}"));
        self.datagram
    }
}
