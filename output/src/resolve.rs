// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Two-tier next-hop resolution.

use net::eth::mac::Mac;
use std::net::Ipv4Addr;
use tracing::instrument;

/// Link-layer address lookup consumed by the pipeline.
///
/// Resolution is two-tier: a dynamic neighbor cache seeded by witnessed
/// traffic, backed by a static table of addresses the built-in DHCP service
/// leased out. `request_discovery` is fire-and-forget: it must not block,
/// and no completion signal ever reaches this subsystem.
pub trait NeighborResolver {
    /// Looks `ip` up in the dynamic neighbor cache.
    fn lookup_neighbor(&self, ip: Ipv4Addr) -> Option<Mac>;
    /// Looks `ip` up in the static lease table.
    fn lookup_lease(&self, ip: Ipv4Addr) -> Option<Mac>;
    /// Asks the resolver to discover `ip` in the background.
    fn request_discovery(&mut self, ip: Ipv4Addr);
}

/// Resolves the link-layer peer for `ip`: neighbor cache first, then lease
/// table.
///
/// On a double miss, one discovery request is fired for `ip` and `None` is
/// returned. The current send fails; a retry may find the cache warm once
/// discovery has done its work.
#[instrument(level = "trace", skip(resolver), ret)]
pub fn resolve_next_hop<R: NeighborResolver>(resolver: &mut R, ip: Ipv4Addr) -> Option<Mac> {
    if let Some(mac) = resolver.lookup_neighbor(ip) {
        return Some(mac);
    }
    if let Some(mac) = resolver.lookup_lease(ip) {
        return Some(mac);
    }
    resolver.request_discovery(ip);
    None
}
