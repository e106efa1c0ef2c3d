use std::ptr::{self, NonNull};

use tracing::{trace, warn};

use crate::{
  align_to,
  block::{Chunk, FreeList},
  bump::Arena,
  config::PoolConfig,
  error::AllocError,
  stats::PoolStats,
  system::{OomHandler, SystemDelegate},
};

/// Small-object allocator with one free list per size class.
///
/// ```text
///   SizeClassPool
///     ├─→ class 0 (8B)    → free: [b3, b7]
///     ├─→ class 1 (16B)   → free: []
///     ├─→ ...
///     └─→ class 15 (128B) → free: [b1]
///
///   Arena: [start ........ end)   bump region feeding empty classes
///   SystemDelegate                requests > max_pooled, new arenas
/// ```
///
/// Every pooled block is a multiple of `config.align` and aligned to it. The
/// caller supplies the size again on free; nothing is stored alongside the
/// block.
pub struct SizeClassPool {
  config: PoolConfig,
  free_lists: Vec<FreeList>,
  arena: Arena,
  system: SystemDelegate,
  outstanding: usize,
  refills: u64,
  cannibalized: u64,
  pooled_allocations: u64,
  large_allocations: u64,
}

impl SizeClassPool {
  /// Builds a pool; `config` is expected to be validated.
  pub fn new(config: PoolConfig) -> Self {
    let free_lists = (1..=config.class_count())
      .map(|class| FreeList::new(class * config.align))
      .collect();

    Self {
      system: SystemDelegate::new(config.system_limit),
      config,
      free_lists,
      arena: Arena::new(),
      outstanding: 0,
      refills: 0,
      cannibalized: 0,
      pooled_allocations: 0,
      large_allocations: 0,
    }
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  pub fn set_oom_handler(
    &mut self,
    handler: Option<OomHandler>,
  ) -> Option<OomHandler> {
    self.system.set_oom_handler(handler)
  }

  pub fn system(&mut self) -> &mut SystemDelegate {
    &mut self.system
  }

  fn round_up(
    &self,
    bytes: usize,
  ) -> usize {
    align_to!(bytes, self.config.align)
  }

  fn class_index(
    &self,
    bytes: usize,
  ) -> usize {
    debug_assert!(bytes > 0 && bytes <= self.config.max_pooled);
    (bytes + self.config.align - 1) / self.config.align - 1
  }

  pub fn is_pooled(
    &self,
    bytes: usize,
  ) -> bool {
    bytes <= self.config.max_pooled
  }

  pub fn allocate(
    &mut self,
    bytes: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let bytes = bytes.max(1);

    if !self.is_pooled(bytes) {
      let ptr = self.system.allocate(bytes)?;
      self.large_allocations += 1;
      return Ok(ptr);
    }

    let index = self.class_index(bytes);
    let ptr = match self.free_lists[index].pop() {
      Some(ptr) => ptr,
      None => self.refill(self.round_up(bytes))?,
    };

    self.outstanding += 1;
    self.pooled_allocations += 1;

    Ok(ptr)
  }

  /// # Safety
  ///
  /// `ptr` must come from [`allocate`](Self::allocate) on this pool with a
  /// request that rounds to the same class as `bytes`, and must not be used
  /// afterwards.
  pub unsafe fn deallocate(
    &mut self,
    ptr: NonNull<u8>,
    bytes: usize,
  ) {
    let bytes = bytes.max(1);

    if !self.is_pooled(bytes) {
      unsafe { self.system.deallocate(ptr, bytes) };
      return;
    }

    debug_assert!(self.outstanding > 0, "more frees than pooled allocations");

    let index = self.class_index(bytes);
    self.free_lists[index].push(ptr);
    self.outstanding -= 1;
  }

  /// Resizes a block, moving it between classes (or to the system) when the
  /// rounded size changes.
  ///
  /// # Safety
  ///
  /// Same contract as [`deallocate`](Self::deallocate) for `ptr` and
  /// `old_bytes`.
  pub unsafe fn reallocate(
    &mut self,
    ptr: NonNull<u8>,
    old_bytes: usize,
    new_bytes: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let old_bytes = old_bytes.max(1);
    let new_bytes = new_bytes.max(1);

    unsafe {
      if !self.is_pooled(old_bytes) && !self.is_pooled(new_bytes) {
        return self.system.reallocate(ptr, old_bytes, new_bytes);
      }

      if self.is_pooled(old_bytes)
        && self.is_pooled(new_bytes)
        && self.round_up(old_bytes) == self.round_up(new_bytes)
      {
        return Ok(ptr);
      }

      let result = self.allocate(new_bytes)?;
      ptr::copy_nonoverlapping(ptr.as_ptr(), result.as_ptr(), old_bytes.min(new_bytes));
      self.deallocate(ptr, old_bytes);

      Ok(result)
    }
  }

  /// Fetches a batch of `size`-byte blocks, keeps the first and threads the
  /// rest onto the class's free list.
  fn refill(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    let mut count = self.config.refill_count;
    let chunk = self.chunk_alloc(size, &mut count)?;

    self.refills += 1;
    trace!(size, count, "refilled size class");

    let index = self.class_index(size);
    for i in 1..count {
      let block = unsafe { NonNull::new_unchecked(chunk.as_ptr().add(i * size)) };
      self.free_lists[index].push(block);
    }

    Ok(chunk)
  }

  /// Carves up to `count` blocks of `size` bytes out of the arena, growing
  /// the arena when it cannot hold even one. On return `count` holds the
  /// number of blocks actually provided (at least 1).
  pub fn chunk_alloc(
    &mut self,
    size: usize,
    count: &mut usize,
  ) -> Result<NonNull<u8>, AllocError> {
    debug_assert!(size % self.config.align == 0 && *count > 0);

    loop {
      let total = size.checked_mul(*count).ok_or(AllocError::CapacityOverflow)?;
      let left = self.arena.remaining();

      if left >= total {
        return Ok(self.arena.bump(total));
      }

      if left >= size {
        *count = left / size;
        return Ok(self.arena.bump(size * *count));
      }

      self.grow_arena(size, total)?;
    }
  }

  fn grow_arena(
    &mut self,
    size: usize,
    total: usize,
  ) -> Result<(), AllocError> {
    let growth = self
      .arena
      .heap_size()
      .checked_shr(self.config.growth_shift)
      .unwrap_or(0);
    let bytes_to_get = total
      .checked_mul(2)
      .and_then(|bytes| bytes.checked_add(self.round_up(growth)))
      .filter(|&bytes| bytes <= isize::MAX as usize)
      .ok_or(AllocError::CapacityOverflow)?;

    // The tail of the old arena is smaller than `size` but still a whole
    // number of align units, so it lands exactly on a smaller class.
    if let Some((rest, left)) = self.arena.take_remainder() {
      let index = self.class_index(left);
      self.free_lists[index].push(rest);
    }

    if let Ok(ptr) = self.system.try_allocate(bytes_to_get) {
      self.arena.install_chunk(Chunk::new(ptr, bytes_to_get));
      return Ok(());
    }

    // The system is dry: take exactly one free block of this class or a
    // larger one and bump from it instead.
    for index in self.class_index(size)..self.free_lists.len() {
      if let Some(block) = self.free_lists[index].pop() {
        let block_size = self.free_lists[index].block_size;
        warn!(size, block_size, "system exhausted, recycling a free block as arena");

        self.cannibalized += 1;
        self.arena.install_block(block, block_size);
        return Ok(());
      }
    }

    // Last resort runs the out-of-memory handler; its failure is the
    // caller's failure.
    let ptr = self.system.allocate(bytes_to_get)?;
    self.arena.install_chunk(Chunk::new(ptr, bytes_to_get));

    Ok(())
  }

  pub fn stats(&self) -> PoolStats {
    PoolStats {
      outstanding_blocks: self.outstanding,
      free_blocks: self.free_lists.iter().map(FreeList::len).collect(),
      heap_size: self.arena.heap_size(),
      arena_remaining: self.arena.remaining(),
      refills: self.refills,
      cannibalized: self.cannibalized,
      pooled_allocations: self.pooled_allocations,
      large_allocations: self.large_allocations,
      system: self.system.stats().clone(),
    }
  }
}

impl Drop for SizeClassPool {
  fn drop(&mut self) {
    if self.outstanding > 0 {
      warn!(outstanding = self.outstanding, "pool dropped with blocks still in use");
    }

    unsafe { self.arena.release(&mut self.system) };
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, rc::Rc};

  use super::*;

  fn pool_with_limit(limit: usize) -> SizeClassPool {
    SizeClassPool::new(PoolConfig::default().with_system_limit(limit))
  }

  #[test]
  fn test_first_allocation_refills_class() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    let ptr = pool.allocate(20).unwrap();
    unsafe { ptr.as_ptr().write_bytes(0x5A, 24) };

    let stats = pool.stats();
    assert_eq!(stats.outstanding_blocks, 1);
    assert_eq!(stats.free_blocks[2], 19);
    assert_eq!(stats.refills, 1);
    assert_eq!(stats.heap_size, 2 * 20 * 24);
    assert_eq!(stats.arena_remaining, 20 * 24);
    assert_eq!(stats.system.allocations, 1);

    unsafe { pool.deallocate(ptr, 20) };
    assert_eq!(pool.stats().free_blocks[2], 20);
    assert_eq!(pool.stats().outstanding_blocks, 0);
  }

  #[test]
  fn test_blocks_are_distinct_and_aligned() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    let mut blocks: Vec<NonNull<u8>> = (0..50).map(|_| pool.allocate(16).unwrap()).collect();
    for block in &blocks {
      assert_eq!(block.as_ptr() as usize % 8, 0);
    }

    blocks.sort();
    for pair in blocks.windows(2) {
      assert!(pair[1].as_ptr() as usize - pair[0].as_ptr() as usize >= 16);
    }

    for block in blocks {
      unsafe { pool.deallocate(block, 16) };
    }
    assert_eq!(pool.stats().outstanding_blocks, 0);
  }

  #[test]
  fn test_pairing_leaves_occupancy_unchanged() {
    let mut pool = SizeClassPool::new(PoolConfig::default());
    let warm = pool.allocate(40).unwrap();

    let before = pool.stats().free_blocks;
    let ptr = pool.allocate(40).unwrap();
    unsafe { pool.deallocate(ptr, 40) };
    assert_eq!(pool.stats().free_blocks, before);

    unsafe { pool.deallocate(warm, 40) };
  }

  #[test]
  fn test_large_requests_bypass_classes() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    let ptr = pool.allocate(129).unwrap();
    let stats = pool.stats();
    assert_eq!(stats.large_allocations, 1);
    assert_eq!(stats.pooled_allocations, 0);
    assert_eq!(stats.outstanding_blocks, 0);
    assert_eq!(stats.heap_size, 0);
    assert_eq!(stats.system.outstanding_bytes, 129);

    unsafe { pool.deallocate(ptr, 129) };
    assert_eq!(pool.stats().system.outstanding_bytes, 0);
  }

  #[test]
  fn test_partial_batch_when_arena_runs_low() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    pool.allocate(64).unwrap();
    assert_eq!(pool.stats().arena_remaining, 1280);

    let mut count = 20;
    pool.chunk_alloc(128, &mut count).unwrap();
    assert_eq!(count, 10);
    assert_eq!(pool.stats().arena_remaining, 0);
    assert_eq!(pool.stats().system.allocations, 1);
  }

  #[test]
  fn test_arena_tail_is_recycled() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    pool.allocate(8).unwrap();
    assert_eq!(pool.stats().arena_remaining, 160);

    pool.allocate(128).unwrap();
    assert_eq!(pool.stats().arena_remaining, 32);

    pool.allocate(128).unwrap();

    let stats = pool.stats();
    assert_eq!(stats.free_blocks[3], 1, "32-byte tail lands in the 32-byte class");
    assert_eq!(stats.heap_size, 320 + 2 * 2560 + 24);
    assert_eq!(stats.system.allocations, 2);
  }

  #[test]
  fn test_wide_growth_shift_adds_nothing() {
    let mut pool = SizeClassPool::new(PoolConfig {
      growth_shift: 64,
      ..PoolConfig::default()
    });

    for _ in 0..41 {
      pool.allocate(8).unwrap();
    }

    let stats = pool.stats();
    assert_eq!(stats.heap_size, 2 * 320);
    assert_eq!(stats.system.allocations, 2);
  }

  #[test]
  fn test_oversized_batch_is_capacity_overflow() {
    let mut pool = SizeClassPool::new(PoolConfig {
      refill_count: usize::MAX / 4,
      ..PoolConfig::default()
    });

    assert_eq!(pool.allocate(128), Err(AllocError::CapacityOverflow));
    assert_eq!(pool.stats().outstanding_blocks, 0);
    assert_eq!(pool.stats().system.allocations, 0);

    let mut pool = SizeClassPool::new(PoolConfig {
      refill_count: isize::MAX as usize / 128,
      ..PoolConfig::default()
    });
    assert_eq!(pool.allocate(128), Err(AllocError::CapacityOverflow));
  }

  #[test]
  fn test_cannibalizes_free_block_when_system_is_dry() {
    let mut pool = pool_with_limit(2560);

    pool.allocate(64).unwrap();
    pool.allocate(128).unwrap();
    assert_eq!(pool.stats().arena_remaining, 0);

    let small = pool.allocate(8).unwrap();
    unsafe { small.as_ptr().write_bytes(1, 8) };

    let stats = pool.stats();
    assert_eq!(stats.cannibalized, 1);
    assert_eq!(stats.system.allocations, 1);
    assert_eq!(stats.free_blocks[7], 18);
    assert_eq!(stats.free_blocks[0], 7);
    assert_eq!(stats.arena_remaining, 0);
  }

  #[test]
  fn test_exhaustion_surfaces_out_of_memory() {
    let mut pool = pool_with_limit(0);
    let calls = Rc::new(Cell::new(0));

    let counter = calls.clone();
    pool.set_oom_handler(Some(Box::new(move || {
      counter.set(counter.get() + 1);
      false
    })));

    assert_eq!(pool.allocate(8), Err(AllocError::OutOfMemory { size: 320 }));
    assert_eq!(calls.get(), 1);
    assert_eq!(pool.stats().outstanding_blocks, 0);

    assert_eq!(pool.allocate(4096), Err(AllocError::OutOfMemory { size: 4096 }));
    assert_eq!(calls.get(), 2);
  }

  #[test]
  fn test_reallocate_between_classes() {
    let mut pool = SizeClassPool::new(PoolConfig::default());

    unsafe {
      let ptr = pool.allocate(10).unwrap();
      for i in 0..10 {
        *ptr.as_ptr().add(i) = i as u8;
      }

      let same = pool.reallocate(ptr, 10, 14).unwrap();
      assert_eq!(same, ptr);

      let moved = pool.reallocate(same, 14, 100).unwrap();
      for i in 0..10 {
        assert_eq!(*moved.as_ptr().add(i), i as u8);
      }

      let large = pool.reallocate(moved, 100, 1000).unwrap();
      assert_eq!(*large.as_ptr().add(9), 9);
      assert_eq!(pool.stats().outstanding_blocks, 0);

      let large = pool.reallocate(large, 1000, 2000).unwrap();
      let back = pool.reallocate(large, 2000, 8).unwrap();
      assert_eq!(*back.as_ptr().add(7), 7);
      assert_eq!(pool.stats().outstanding_blocks, 1);

      pool.deallocate(back, 8);
    }

    assert_eq!(pool.stats().system.outstanding_bytes, pool.stats().heap_size);
  }
}
