// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-address resolution for the NAT edge.
//!
//! The transmit pipeline asks one question: which mac does this IPv4 next
//! hop answer to. This crate holds the two tables behind the answer, a
//! [`NeighborCache`] learned from observed traffic and a configured
//! [`LeaseTable`], plus the [`Resolver`] facade that stitches them into the
//! pipeline's resolution contract and queues discovery work for the control
//! loop.
//!
//! ```
//! use natedge_neighbor::{Lease, LeaseTable, Resolver};
//! use net::eth::mac::Mac;
//! use output::resolve_next_hop;
//! use std::net::Ipv4Addr;
//!
//! let gateway = Ipv4Addr::new(10, 0, 2, 2);
//! let mut leases = LeaseTable::new();
//! leases.insert(Lease {
//!     ip: gateway,
//!     mac: Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x02]),
//! });
//!
//! let mut resolver = Resolver::new(leases);
//! assert!(resolve_next_hop(&mut resolver, gateway).is_some());
//! ```

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]

pub mod cache;
pub mod leases;
pub mod resolver;

pub use cache::{NeighborCache, NeighborError};
pub use leases::{Lease, LeaseTable};
pub use resolver::{PENDING_DISCOVERY_LIMIT, Resolver};
