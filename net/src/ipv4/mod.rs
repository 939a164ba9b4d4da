// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Zero-copy views over IPv4 headers.
//!
//! [`Ipv4View`] and [`Ipv4ViewMut`] project field structure onto the raw
//! octets of a datagram without copying them. Multi-octet fields are stored
//! in network byte order at all times; accessors convert at the call
//! boundary.
//!
//! View construction checks that the header itself is well formed. Whether
//! the buffer also covers the header's claimed total length is a property of
//! the owning packet, checked in [`Packet::from_datagram`].
//!
//! [`Packet::from_datagram`]: crate::packet::Packet::from_datagram

pub mod frag;

#[allow(unused_imports)] // re-export
pub use frag::*;

use crate::checksum::{Checksum, internet_checksum};
use std::net::Ipv4Addr;

/// Octet positions of the fields within the base header.
mod field {
    use core::ops::Range;

    pub const VER_IHL: usize = 0;
    pub const TOTAL_LEN: Range<usize> = 2..4;
    pub const IDENT: Range<usize> = 4..6;
    pub const FLAGS_FRAG: Range<usize> = 6..8;
    pub const TTL: usize = 8;
    pub const PROTOCOL: usize = 9;
    pub const CHECKSUM: Range<usize> = 10..12;
    pub const SOURCE: Range<usize> = 12..16;
    pub const DESTINATION: Range<usize> = 16..20;
}

/// Reasons a byte region cannot be viewed as an IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Ipv4ViewError {
    /// Fewer octets present than the header occupies.
    #[error("header truncated: {have} octets present, {need} required")]
    Truncated {
        /// Octets present in the region.
        have: usize,
        /// Octets the header requires.
        need: usize,
    },
    /// The version nibble is not 4.
    #[error("version {0} is not IPv4")]
    Version(u8),
    /// The header-length field claims fewer than 20 octets.
    #[error("header length of {0} octets is below the 20 octet minimum")]
    HeaderLength(u8),
}

fn check_header(bytes: &[u8]) -> Result<(), Ipv4ViewError> {
    let base = usize::from(Ipv4View::BASE_HEADER_LEN);
    if bytes.len() < base {
        return Err(Ipv4ViewError::Truncated {
            have: bytes.len(),
            need: base,
        });
    }
    let version = bytes[field::VER_IHL] >> 4;
    if version != 4 {
        return Err(Ipv4ViewError::Version(version));
    }
    let header_len = (bytes[field::VER_IHL] & 0x0f) * 4;
    if usize::from(header_len) < base {
        return Err(Ipv4ViewError::HeaderLength(header_len));
    }
    if bytes.len() < usize::from(header_len) {
        return Err(Ipv4ViewError::Truncated {
            have: bytes.len(),
            need: usize::from(header_len),
        });
    }
    Ok(())
}

/// An immutable view of an IPv4 header.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4View<'a> {
    bytes: &'a [u8],
}

impl<'a> Ipv4View<'a> {
    /// The length of the option-free base header, in octets.
    pub const BASE_HEADER_LEN: u16 = 20;
    /// The largest length the header-length field can encode, in octets.
    pub const MAX_HEADER_LEN: u16 = 60;

    /// View `bytes` as an IPv4 header starting at the version octet.
    ///
    /// # Errors
    ///
    /// Returns an [`Ipv4ViewError`] if the region does not begin with a well
    /// formed IPv4 header.
    pub fn new(bytes: &'a [u8]) -> Result<Ipv4View<'a>, Ipv4ViewError> {
        check_header(bytes)?;
        Ok(Ipv4View { bytes })
    }

    /// The version nibble.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.bytes[field::VER_IHL] >> 4
    }

    /// The header length.
    ///
    /// <div class="warning">
    ///
    /// The returned value is in octets, not in the 32-bit words of the wire
    /// encoding.
    ///
    /// </div>
    #[must_use]
    pub fn header_len(&self) -> u16 {
        u16::from(self.bytes[field::VER_IHL] & 0x0f) * 4
    }

    /// The total length field: header plus payload, in octets.
    #[must_use]
    pub fn total_len(&self) -> u16 {
        u16::from_be_bytes([self.bytes[2], self.bytes[3]])
    }

    /// The identification field.
    #[must_use]
    pub fn identification(&self) -> u16 {
        u16::from_be_bytes([self.bytes[4], self.bytes[5]])
    }

    /// The flag bits of the flags/fragment-offset word.
    #[must_use]
    pub fn flags(&self) -> IpFlags {
        IpFlags::from_bits_truncate(self.flags_frag_word())
    }

    /// The fragment offset of the flags/fragment-offset word.
    #[must_use]
    pub fn fragment_offset(&self) -> FragOffset {
        FragOffset::new(self.flags_frag_word() & FragOffset::MAX.units())
            .unwrap_or_else(|e| unreachable!("{e:?}"))
    }

    /// The time-to-live field.
    #[must_use]
    pub fn ttl(&self) -> u8 {
        self.bytes[field::TTL]
    }

    /// The protocol field.
    #[must_use]
    pub fn protocol(&self) -> u8 {
        self.bytes[field::PROTOCOL]
    }

    /// The header checksum field as stored.
    #[must_use]
    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.bytes[10], self.bytes[11]])
    }

    /// The source address.
    #[must_use]
    pub fn source(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.bytes[12], self.bytes[13], self.bytes[14], self.bytes[15])
    }

    /// The destination address.
    #[must_use]
    pub fn destination(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.bytes[16], self.bytes[17], self.bytes[18], self.bytes[19])
    }

    /// The header octets, options included.
    #[must_use]
    pub fn header_bytes(&self) -> &'a [u8] {
        &self.bytes[..usize::from(self.header_len())]
    }

    fn flags_frag_word(&self) -> u16 {
        u16::from_be_bytes([self.bytes[6], self.bytes[7]])
    }
}

/// A mutable view of an IPv4 header.
///
/// Setters write network byte order into the underlying octets. The checksum
/// is never adjusted implicitly; callers run [`Checksum::update_checksum`]
/// once all fields are in place.
#[derive(Debug)]
pub struct Ipv4ViewMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> Ipv4ViewMut<'a> {
    /// View `bytes` as a mutable IPv4 header starting at the version octet.
    ///
    /// # Errors
    ///
    /// Returns an [`Ipv4ViewError`] if the region does not begin with a well
    /// formed IPv4 header.
    pub fn new(bytes: &'a mut [u8]) -> Result<Ipv4ViewMut<'a>, Ipv4ViewError> {
        check_header(bytes)?;
        Ok(Ipv4ViewMut { bytes })
    }

    /// Reborrow as an immutable view.
    #[must_use]
    pub fn as_view(&self) -> Ipv4View<'_> {
        Ipv4View { bytes: self.bytes }
    }

    /// Write the version nibble.
    pub fn set_version(&mut self, version: u8) -> &mut Self {
        debug_assert!(version <= 0x0f);
        self.bytes[field::VER_IHL] = (version << 4) | (self.bytes[field::VER_IHL] & 0x0f);
        self
    }

    /// Write the header-length field.
    ///
    /// `len` is in octets and must be a multiple of 4 between 20 and 60 that
    /// the viewed region covers.
    pub fn set_header_len(&mut self, len: u16) -> &mut Self {
        debug_assert!(len % 4 == 0);
        debug_assert!((Ipv4View::BASE_HEADER_LEN..=Ipv4View::MAX_HEADER_LEN).contains(&len));
        debug_assert!(usize::from(len) <= self.bytes.len());
        #[allow(clippy::cast_possible_truncation)] // len / 4 fits a nibble by the asserts above
        let words = (len / 4) as u8;
        self.bytes[field::VER_IHL] = (self.bytes[field::VER_IHL] & 0xf0) | words;
        self
    }

    /// Write the total-length field.
    pub fn set_total_len(&mut self, len: u16) -> &mut Self {
        debug_assert!(len >= self.as_view().header_len());
        self.bytes[field::TOTAL_LEN].copy_from_slice(&len.to_be_bytes());
        self
    }

    /// Write the identification field.
    pub fn set_identification(&mut self, ident: u16) -> &mut Self {
        self.bytes[field::IDENT].copy_from_slice(&ident.to_be_bytes());
        self
    }

    /// Rewrite the flag bits, leaving the fragment offset untouched.
    ///
    /// The reserved high bit is always written as zero.
    pub fn set_flags(&mut self, flags: IpFlags) -> &mut Self {
        let word = (self.as_view().flags_frag_word() & FragOffset::MAX.units()) | flags.bits();
        self.bytes[field::FLAGS_FRAG].copy_from_slice(&word.to_be_bytes());
        self
    }

    /// Rewrite the fragment offset, leaving the flag bits untouched.
    pub fn set_fragment_offset(&mut self, offset: FragOffset) -> &mut Self {
        let word = (self.as_view().flags_frag_word() & !FragOffset::MAX.units()) | offset.units();
        self.bytes[field::FLAGS_FRAG].copy_from_slice(&word.to_be_bytes());
        self
    }

    /// Write the source address.
    pub fn set_source(&mut self, source: Ipv4Addr) -> &mut Self {
        self.bytes[field::SOURCE].copy_from_slice(&source.octets());
        self
    }

    /// Write the destination address.
    pub fn set_destination(&mut self, destination: Ipv4Addr) -> &mut Self {
        self.bytes[field::DESTINATION].copy_from_slice(&destination.octets());
        self
    }
}

impl Checksum for Ipv4ViewMut<'_> {
    fn checksum(&self) -> u16 {
        self.as_view().checksum()
    }

    fn compute_checksum(&self) -> u16 {
        let header = self.as_view().header_bytes();
        let mut scratch = [0u8; Ipv4View::MAX_HEADER_LEN as usize];
        let scratch = &mut scratch[..header.len()];
        scratch.copy_from_slice(header);
        scratch[field::CHECKSUM].fill(0);
        internet_checksum(scratch)
    }

    fn set_checksum(&mut self, checksum: u16) -> &mut Self {
        self.bytes[field::CHECKSUM].copy_from_slice(&checksum.to_be_bytes());
        self
    }
}
