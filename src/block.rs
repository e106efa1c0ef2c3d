use std::ptr::NonNull;

/// A region obtained from the system allocator to back an arena.
///
/// The pool keeps every chunk it ever received so it can hand them back
/// when it is dropped; blocks carved out of a chunk never move.
pub struct Chunk {
  pub ptr: NonNull<u8>,
  pub size: usize,
}

impl Chunk {
  pub fn new(
    ptr: NonNull<u8>,
    size: usize,
  ) -> Self {
    Self { ptr, size }
  }
}

/// Free blocks of one size class.
///
/// Blocks are tracked by handle instead of being linked through their own
/// bytes, so client memory is never reinterpreted as list nodes. Push and pop
/// work on the same end, which keeps the most recently freed (cache-warm)
/// block first in line.
pub struct FreeList {
  pub block_size: usize,
  blocks: Vec<NonNull<u8>>,
}

impl FreeList {
  pub fn new(block_size: usize) -> Self {
    Self {
      block_size,
      blocks: Vec::new(),
    }
  }

  pub fn push(
    &mut self,
    block: NonNull<u8>,
  ) {
    self.blocks.push(block);
  }

  pub fn pop(&mut self) -> Option<NonNull<u8>> {
    self.blocks.pop()
  }

  pub fn len(&self) -> usize {
    self.blocks.len()
  }
}
