// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Heap-backed implementation of [`PacketBuffer`] with reserved link headroom.

use crate::buffer::{
    Append, BufferPool, BufferTooShort, Headroom, NotEnoughHeadRoom, NotEnoughTailRoom, Prepend,
    Tailroom, TrimFromEnd, TrimFromStart,
};
use crate::eth::Eth;
use static_assertions::const_assert;
use std::convert::Infallible;

// only included for doc ref
#[cfg(doc)]
use crate::buffer::PacketBuffer;

/// A fixed-capacity packet buffer backed by the heap.
///
/// An empty `FrameBuffer` reserves [`FrameBuffer::HEADROOM`] octets ahead of
/// the readable region so a link-layer header can later be prepended without
/// moving the payload. The buffer is deliberately not `Clone`: one buffer is
/// one frame's worth of ownership, and transmit consumes it.
#[derive(Debug)]
pub struct FrameBuffer {
    buffer: Vec<u8>,
    headroom: u16,
    tailroom: u16,
}

// prepending a link header into reserved headroom must always succeed
const_assert!(FrameBuffer::HEADROOM >= Eth::HEADER_LEN);

impl FrameBuffer {
    /// The number of octets a `FrameBuffer` can hold, headroom included.
    pub const CAPACITY: u16 = 2048;
    /// The headroom reserved ahead of the readable region of an empty `FrameBuffer`.
    pub const HEADROOM: u16 = 64;

    /// Create an empty `FrameBuffer`: no readable octets, full headroom and tailroom.
    #[must_use]
    pub fn new() -> FrameBuffer {
        FrameBuffer {
            buffer: vec![0; usize::from(FrameBuffer::CAPACITY)],
            headroom: FrameBuffer::HEADROOM,
            tailroom: FrameBuffer::CAPACITY - FrameBuffer::HEADROOM,
        }
    }

    /// Create a `FrameBuffer` whose readable region is a copy of `data`.
    ///
    /// # Errors
    ///
    /// Fails if `data` does not fit behind the reserved headroom.
    pub fn from_datagram(data: &[u8]) -> Result<FrameBuffer, NotEnoughTailRoom> {
        let len = u16::try_from(data.len()).map_err(|_| NotEnoughTailRoom)?;
        let mut buf = FrameBuffer::new();
        let region = buf.append(len)?;
        region.copy_from_slice(data);
        Ok(buf)
    }
}

impl Default for FrameBuffer {
    fn default() -> FrameBuffer {
        FrameBuffer::new()
    }
}

impl AsRef<[u8]> for FrameBuffer {
    fn as_ref(&self) -> &[u8] {
        let start = usize::from(self.headroom);
        let end = self.buffer.len() - usize::from(self.tailroom);
        &self.buffer.as_slice()[start..end]
    }
}

impl AsMut<[u8]> for FrameBuffer {
    fn as_mut(&mut self) -> &mut [u8] {
        let start = usize::from(self.headroom);
        let end = self.buffer.len() - usize::from(self.tailroom);
        &mut self.buffer.as_mut_slice()[start..end]
    }
}

impl Headroom for FrameBuffer {
    fn headroom(&self) -> u16 {
        self.headroom
    }
}

impl Tailroom for FrameBuffer {
    fn tailroom(&self) -> u16 {
        self.tailroom
    }
}

impl Prepend for FrameBuffer {
    type Error = NotEnoughHeadRoom;
    fn prepend(&mut self, len: u16) -> Result<&mut [u8], Self::Error> {
        if self.headroom < len {
            return Err(NotEnoughHeadRoom);
        }
        self.headroom -= len;
        Ok(self.as_mut())
    }
}

impl Append for FrameBuffer {
    type Error = NotEnoughTailRoom;
    fn append(&mut self, len: u16) -> Result<&mut [u8], Self::Error> {
        if self.tailroom < len {
            return Err(NotEnoughTailRoom);
        }
        self.tailroom -= len;
        Ok(self.as_mut())
    }
}

impl TrimFromStart for FrameBuffer {
    type Error = BufferTooShort;
    fn trim_from_start(&mut self, len: u16) -> Result<&mut [u8], BufferTooShort> {
        if usize::from(len) > self.as_ref().len() {
            return Err(BufferTooShort);
        }
        self.headroom += len;
        Ok(self.as_mut())
    }
}

impl TrimFromEnd for FrameBuffer {
    type Error = BufferTooShort;
    fn trim_from_end(&mut self, len: u16) -> Result<&mut [u8], BufferTooShort> {
        if usize::from(len) > self.as_ref().len() {
            return Err(BufferTooShort);
        }
        self.tailroom += len;
        Ok(self.as_mut())
    }
}

/// Unbounded allocator handing out empty [`FrameBuffer`]s from the heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct FramePool;

impl BufferPool<FrameBuffer> for FramePool {
    type Error = Infallible;
    fn alloc(&mut self) -> Result<FrameBuffer, Self::Error> {
        Ok(FrameBuffer::new())
    }
}
