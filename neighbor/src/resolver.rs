// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The resolver facade the transmit pipeline drives.

use crate::cache::NeighborCache;
use crate::leases::LeaseTable;
use arrayvec::ArrayVec;
use net::eth::mac::Mac;
use output::NeighborResolver;
use std::net::Ipv4Addr;
#[allow(unused)]
use tracing::{debug, error, trace, warn};

/// Bound on discovery targets waiting for the control loop to probe them.
pub const PENDING_DISCOVERY_LIMIT: usize = 32;

/// Two-tier next-hop resolution with a bounded discovery queue.
///
/// Learned neighbors answer first, configured leases second. A double miss
/// queues the address for the control loop to probe; the pipeline itself
/// never waits for an answer. The queue deduplicates, so a flow retrying
/// into an unresolved destination costs one slot, not one per datagram.
#[derive(Debug, Default)]
pub struct Resolver {
    cache: NeighborCache,
    leases: LeaseTable,
    pending: ArrayVec<Ipv4Addr, PENDING_DISCOVERY_LIMIT>,
}

impl Resolver {
    #[must_use]
    pub fn new(leases: LeaseTable) -> Resolver {
        Resolver {
            cache: NeighborCache::new(),
            leases,
            pending: ArrayVec::new(),
        }
    }

    #[must_use]
    pub const fn cache(&self) -> &NeighborCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut NeighborCache {
        &mut self.cache
    }

    #[must_use]
    pub const fn leases(&self) -> &LeaseTable {
        &self.leases
    }

    pub fn leases_mut(&mut self) -> &mut LeaseTable {
        &mut self.leases
    }

    /// Addresses queued for discovery, oldest first.
    #[must_use]
    pub fn pending(&self) -> &[Ipv4Addr] {
        &self.pending
    }

    /// Hands the queued discovery targets to the control loop, emptying the
    /// queue.
    pub fn drain_pending(&mut self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.pending.drain(..)
    }
}

impl NeighborResolver for Resolver {
    fn lookup_neighbor(&self, ip: Ipv4Addr) -> Option<Mac> {
        self.cache.lookup(ip)
    }

    fn lookup_lease(&self, ip: Ipv4Addr) -> Option<Mac> {
        self.leases.lookup(ip)
    }

    fn request_discovery(&mut self, ip: Ipv4Addr) {
        if self.pending.contains(&ip) {
            trace!("discovery of {ip} already queued");
            return;
        }
        if self.pending.try_push(ip).is_err() {
            warn!("discovery queue full, dropping probe for {ip}");
        }
    }
}
