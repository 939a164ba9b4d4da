// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The learned neighbor cache.

use ahash::RandomState;
use net::eth::mac::Mac;
use std::collections::HashMap;
use std::net::Ipv4Addr;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// Link-layer addresses learned from observed traffic.
///
/// Entries are keyed by IPv4 address and overwritten when a host shows up
/// behind a new address. The cache answers before the lease table when the
/// transmit pipeline resolves a next hop.
#[derive(Debug, Default, Clone)]
pub struct NeighborCache {
    entries: HashMap<Ipv4Addr, Mac, RandomState>,
}

impl NeighborCache {
    #[must_use]
    pub fn new() -> NeighborCache {
        NeighborCache::default()
    }

    /// Records that `ip` was seen speaking from `mac`.
    ///
    /// A fresh observation replaces whatever was learned before.
    ///
    /// # Errors
    ///
    /// Refuses addresses that cannot name a single speaker: the zero mac and
    /// group (multicast or broadcast) macs.
    pub fn learn(&mut self, ip: Ipv4Addr, mac: Mac) -> Result<(), NeighborError> {
        if mac.is_zero() {
            return Err(NeighborError::ZeroMac(ip));
        }
        if mac.is_multicast() {
            return Err(NeighborError::GroupMac(ip, mac));
        }
        match self.entries.insert(ip, mac) {
            Some(previous) if previous != mac => debug!("{ip} moved from {previous} to {mac}"),
            Some(_) => {}
            None => trace!("learned {ip} at {mac}"),
        }
        Ok(())
    }

    #[must_use]
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<Mac> {
        self.entries.get(&ip).copied()
    }

    /// Drops the entry for `ip`, returning it if one was present.
    pub fn forget(&mut self, ip: Ipv4Addr) -> Option<Mac> {
        self.entries.remove(&ip)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Addr, Mac)> + '_ {
        self.entries.iter().map(|(ip, mac)| (*ip, *mac))
    }
}

/// Errors learning a neighbor entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NeighborError {
    /// The zero mac marks "unresolved" and never names a host.
    #[error("refusing to learn {0} at the zero mac")]
    ZeroMac(Ipv4Addr),
    /// Multicast and broadcast macs name groups, not hosts.
    #[error("refusing to learn {0} at group mac {1}")]
    GroupMac(Ipv4Addr, Mac),
}
