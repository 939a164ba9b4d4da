// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Ethernet header construction.

pub mod mac;

#[allow(unused_imports)] // re-export
pub use mac::*;

use crate::buffer::BufferTooShort;

/// An [`EtherType`]: the protocol carried by an ethernet frame.
///
/// [`EtherType`]: https://en.wikipedia.org/wiki/EtherType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct EtherType(u16);

impl EtherType {
    /// An IPv4 payload.
    pub const IPV4: EtherType = EtherType(0x0800);
    /// An address resolution payload.
    pub const ARP: EtherType = EtherType(0x0806);

    /// Wrap a raw ethertype value.
    #[must_use]
    pub const fn new(raw: u16) -> EtherType {
        EtherType(raw)
    }

    /// The raw ethertype value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

/// An ethernet header, minus any 802.1Q tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eth {
    destination: Mac,
    source: Mac,
    ether_type: EtherType,
}

impl Eth {
    /// The length of an untagged ethernet header on the wire.
    pub const HEADER_LEN: u16 = 14;

    /// Assemble a header from its fields.
    #[must_use]
    pub const fn new(destination: Mac, source: Mac, ether_type: EtherType) -> Eth {
        Eth {
            destination,
            source,
            ether_type,
        }
    }

    /// The destination address.
    #[must_use]
    pub const fn destination(&self) -> Mac {
        self.destination
    }

    /// The source address.
    #[must_use]
    pub const fn source(&self) -> Mac {
        self.source
    }

    /// The protocol of the carried payload.
    #[must_use]
    pub const fn ether_type(&self) -> EtherType {
        self.ether_type
    }

    /// Write the wire representation into the first [`Eth::HEADER_LEN`] octets of `buf`.
    ///
    /// # Errors
    ///
    /// Fails if `buf` holds fewer than [`Eth::HEADER_LEN`] octets.
    pub fn emit(&self, buf: &mut [u8]) -> Result<(), BufferTooShort> {
        let header = buf
            .get_mut(..usize::from(Eth::HEADER_LEN))
            .ok_or(BufferTooShort)?;
        header[0..6].copy_from_slice(&self.destination.0);
        header[6..12].copy_from_slice(&self.source.0);
        header[12..14].copy_from_slice(&self.ether_type.0.to_be_bytes());
        Ok(())
    }
}
