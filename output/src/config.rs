// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Static configuration for the output pipeline.

use net::eth::mac::Mac;
use net::mtu::Mtu;
use net::packet::NatSessionId;
use serde::{Deserialize, Serialize};

/// Settings fixed for the lifetime of an [`IpOutput`][crate::IpOutput].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Largest frame payload the uplink accepts; datagrams above this are
    /// fragmented or refused.
    pub mtu: Mtu,
    /// Link-layer source address written into every emitted frame.
    pub link_mac: Mac,
    /// Translation session used for datagrams that arrive without one
    /// attached.
    pub default_session: NatSessionId,
}
