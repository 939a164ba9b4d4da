// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IPv4 fragmentation fields: the flag bits and the 13-bit fragment offset.

use bitflags::bitflags;

bitflags! {
    /// The IPv4 header flag bits, positioned as they sit in the
    /// flags/fragment-offset word. The reserved high bit is excluded and
    /// always written as zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IpFlags: u16 {
        /// Refuse fragmentation: an oversize datagram is dropped, not split.
        const DONT_FRAGMENT = 0x4000;
        /// Further fragments of this datagram follow.
        const MORE_FRAGMENTS = 0x2000;
    }
}

/// A fragment offset, in units of eight octets.
///
/// <div class="warning">
///
/// The unit is eight octets, not octets. Use [`FragOffset::octets`] for the
/// byte position within the original datagram.
///
/// </div>
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct FragOffset(u16);

impl FragOffset {
    /// Offset zero: the start of the original datagram.
    pub const ZERO: FragOffset = FragOffset(0);
    /// The largest encodable offset (13 bits).
    pub const MAX: FragOffset = FragOffset(0x1fff);

    /// Wrap an offset given in eight-octet units.
    ///
    /// # Errors
    ///
    /// Fails if `units` exceeds [`FragOffset::MAX`].
    pub const fn new(units: u16) -> Result<FragOffset, FragOffsetTooLarge> {
        if units > FragOffset::MAX.0 {
            return Err(FragOffsetTooLarge(units));
        }
        Ok(FragOffset(units))
    }

    /// The offset in eight-octet units.
    #[must_use]
    pub const fn units(self) -> u16 {
        self.0
    }

    /// The offset in octets.
    #[must_use]
    pub const fn octets(self) -> u16 {
        // MAX << 3 is 0xfff8, so this cannot overflow
        self.0 << 3
    }
}

/// Error: an offset in units that does not fit the 13-bit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("fragment offset of {0} eight-octet units does not fit in 13 bits")]
pub struct FragOffsetTooLarge(pub u16);
