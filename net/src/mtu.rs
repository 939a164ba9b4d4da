// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The uplink MTU.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::NonZero;

/// The MTU of the link the pipeline emits frames onto.
///
/// Any non-zero value is admitted. Datagrams that cannot be fragmented to
/// fit a tiny MTU are refused at send time, where the failure can be
/// reported per datagram, rather than at configuration time.
#[derive(Copy, Clone, Debug, Hash, Ord, PartialOrd, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
#[repr(transparent)]
pub struct Mtu(NonZero<u16>);

impl Mtu {
    const DEFAULT_U16: u16 = 1500;

    /// The typical MTU of an ethernet link.
    pub const DEFAULT: Mtu = match NonZero::new(Mtu::DEFAULT_U16) {
        Some(value) => Mtu(value),
        None => unreachable!(),
    };

    /// Return the `Mtu` represented as a `u16`.
    #[must_use]
    pub const fn to_u16(self) -> u16 {
        self.0.get()
    }
}

impl Default for Mtu {
    fn default() -> Self {
        Mtu::DEFAULT
    }
}

impl TryFrom<u16> for Mtu {
    type Error = MtuError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        NonZero::new(value).map(Mtu).ok_or(MtuError::Zero)
    }
}

impl From<Mtu> for u16 {
    fn from(value: Mtu) -> Self {
        value.0.get()
    }
}

impl Display for Mtu {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.get())
    }
}

/// Errors constructing an [`Mtu`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MtuError {
    /// Zero octets is not an MTU.
    #[error("an mtu of zero octets is meaningless")]
    Zero,
}
