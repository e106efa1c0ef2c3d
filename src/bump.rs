use std::ptr::{self, NonNull};

use tracing::debug;

use crate::{block::Chunk, system::SystemDelegate};

/// The bump region the pool carves new blocks from.
///
/// ```text
///   ┌──────────────┬──────────────┬──────────────────────────────┐
///   │  batch (A)   │  batch (B)   │        remaining             │
///   └──────────────┴──────────────┴──────────────────────────────┘
///                                 ▲                              ▲
///                               start                           end
/// ```
///
/// `start` only moves forward. When the region cannot serve a block any
/// more the pool recycles what is left and installs a fresh region.
pub struct Arena {
  start: *mut u8,
  end: *mut u8,
  heap_size: usize,
  chunks: Vec<Chunk>,
}

impl Arena {
  pub fn new() -> Self {
    Self {
      start: ptr::null_mut(),
      end: ptr::null_mut(),
      heap_size: 0,
      chunks: Vec::new(),
    }
  }

  pub fn remaining(&self) -> usize {
    self.end as usize - self.start as usize
  }

  /// Bytes ever obtained from the system for arenas.
  pub fn heap_size(&self) -> usize {
    self.heap_size
  }

  /// Carves `bytes` off the front of the region.
  pub fn bump(
    &mut self,
    bytes: usize,
  ) -> NonNull<u8> {
    debug_assert!(bytes > 0 && bytes <= self.remaining());

    let result = self.start;
    self.start = unsafe { self.start.add(bytes) };

    // Non-null: `bytes > 0` fits in the region, so the region is real.
    unsafe { NonNull::new_unchecked(result) }
  }

  /// Detaches whatever is left of the region.
  pub fn take_remainder(&mut self) -> Option<(NonNull<u8>, usize)> {
    let left = self.remaining();
    let start = NonNull::new(self.start)?;

    self.start = ptr::null_mut();
    self.end = ptr::null_mut();

    (left > 0).then_some((start, left))
  }

  /// Makes a freshly obtained system chunk the current region.
  pub fn install_chunk(
    &mut self,
    chunk: Chunk,
  ) {
    debug!(
      size = chunk.size,
      heap_size = self.heap_size + chunk.size,
      "arena grown"
    );

    self.start = chunk.ptr.as_ptr();
    self.end = unsafe { self.start.add(chunk.size) };
    self.heap_size += chunk.size;
    self.chunks.push(chunk);
  }

  /// Makes an existing free block the current region. The block stays owned
  /// by the chunk it was carved from.
  pub fn install_block(
    &mut self,
    block: NonNull<u8>,
    size: usize,
  ) {
    self.start = block.as_ptr();
    self.end = unsafe { self.start.add(size) };
  }

  /// Returns every chunk to `system`.
  ///
  /// # Safety
  ///
  /// No block carved from any chunk may be used afterwards.
  pub unsafe fn release(
    &mut self,
    system: &mut SystemDelegate,
  ) {
    self.start = ptr::null_mut();
    self.end = ptr::null_mut();

    for chunk in self.chunks.drain(..) {
      unsafe { system.deallocate(chunk.ptr, chunk.size) };
    }

    debug!(heap_size = self.heap_size, "arena chunks released");
  }
}
