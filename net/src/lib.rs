// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::all, clippy::pedantic)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Validated network data for the outbound pipeline: packet buffers with
//! reserved link headroom, ethernet and IPv4 header manipulation, and the
//! internet checksum.

pub mod buffer;
pub mod checksum;
pub mod eth;
pub mod ipv4;
pub mod mtu;
pub mod packet;
