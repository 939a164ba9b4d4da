// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! [`PacketBuffer`] and related traits

pub mod frame;

use core::fmt::Debug;
use std::error::Error;

#[allow(unused_imports)] // re-export
pub use frame::*;

/// Super trait for the read-side operations of a packet buffer.
pub trait PacketBuffer: AsRef<[u8]> + Headroom + Debug + 'static {}
impl<T> PacketBuffer for T where T: AsRef<[u8]> + Headroom + Debug + 'static {}

/// Super trait for the full set of operations on a mutable packet buffer.
pub trait PacketBufferMut:
    PacketBuffer + AsMut<[u8]> + Append + Prepend + Send + TrimFromStart + TrimFromEnd + Tailroom
{
}
impl<T> PacketBufferMut for T where
    T: PacketBuffer + AsMut<[u8]> + Append + Prepend + Send + TrimFromStart + TrimFromEnd + Tailroom
{
}

/// Trait representing the ability to get the unused headroom in a packet buffer.
pub trait Headroom {
    /// Get the (unused) headroom ahead of the readable region.
    fn headroom(&self) -> u16;
}

/// Trait representing the ability to get the unused tailroom in a packet buffer.
pub trait Tailroom {
    /// Get the (unused) tailroom behind the readable region.
    fn tailroom(&self) -> u16;
}

/// Trait representing the ability to prepend data to a packet buffer.
pub trait Prepend {
    /// Error which may occur when attempting to prepend data to the buffer.
    type Error: Debug + Error;
    /// Grow the readable region at the front by `len` octets.
    ///
    /// On success the returned slice is the new start of the readable region;
    /// the existing contents are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the buffer lacks `len` octets of headroom.
    fn prepend(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Trait representing the ability to append data to a packet buffer.
pub trait Append {
    /// Error which may occur when attempting to append data to the buffer.
    type Error: Debug;
    /// Grow the readable region at the back by `len` octets.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the buffer lacks `len` octets of tailroom.
    fn append(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Trait representing the ability to trim data from the start of a packet buffer.
pub trait TrimFromStart {
    /// Error which may occur when attempting to trim from the start of the buffer.
    type Error: Debug;
    /// Shrink the readable region at the front by `len` octets.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the readable region holds fewer than `len` octets.
    fn trim_from_start(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Trait representing the ability to trim data from the end of a packet buffer.
pub trait TrimFromEnd {
    /// Error which may occur when attempting to trim from the end of the buffer.
    type Error: Debug;
    /// Shrink the readable region at the back by `len` octets.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the readable region holds fewer than `len` octets.
    fn trim_from_end(&mut self, len: u16) -> Result<&mut [u8], Self::Error>;
}

/// Source of empty buffers for fragment assembly.
///
/// Allocation is fallible; a caller building a multi-buffer train must treat
/// any failure as fatal for the whole train.
pub trait BufferPool<Buf: PacketBufferMut> {
    /// Error which may occur when the pool cannot produce a buffer.
    type Error: Debug + Error;
    /// Take an empty buffer from the pool.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] when the pool is exhausted.
    fn alloc(&mut self) -> Result<Buf, Self::Error>;
}

/// Error indicating that there is not enough headroom in a buffer for the requested
/// operation.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("not enough headroom in buffer")]
pub struct NotEnoughHeadRoom;

/// Error indicating that there is not enough tailroom in a buffer for the requested
/// operation.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("not enough tailroom in buffer")]
pub struct NotEnoughTailRoom;

/// Error indicating that the readable region is too short for the requested operation.
#[non_exhaustive]
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("buffer shorter than the requested operation")]
pub struct BufferTooShort;
