// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Failure modes of the outbound send path.

use net::mtu::Mtu;
use std::net::Ipv4Addr;

/// Errors returned by [`IpOutput::send`][crate::IpOutput::send].
///
/// Every variant consumes the datagram: by the time a caller sees a
/// `SendError`, the packet and any fragments built from it have been dropped.
/// Nothing is retried internally; retry policy belongs to the caller.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SendError {
    /// No link-layer address is known for the destination.
    ///
    /// A discovery request has already been fired for the address. Discovery
    /// carries no completion signal back to this subsystem, so the caller
    /// must re-attempt the higher-level send later.
    #[error("no link-layer address known for {0}")]
    Unresolved(Ipv4Addr),
    /// The translation engine refused the datagram.
    ///
    /// A policy outcome, not an anomaly.
    #[error("translation engine rejected the datagram")]
    TranslationRejected,
    /// The datagram exceeds the link MTU and carries the don't-fragment flag.
    #[error("datagram exceeds the link MTU and don't-fragment is set")]
    CannotFragment,
    /// The link MTU leaves no room for even one eight-octet payload unit per
    /// fragment. A configuration problem, not a per-packet one.
    #[error("mtu {0} too small to carry any fragment payload")]
    MtuTooSmall(Mtu),
    /// Buffer allocation failed while building a fragment train. The whole
    /// train, the original included, was dropped unsent.
    #[error("buffer allocation failed while building the fragment train")]
    FragmentAllocation,
}
