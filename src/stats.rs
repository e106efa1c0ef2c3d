/// Counters kept by the system delegate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemStats {
  /// Successful `malloc` calls.
  pub allocations: u64,
  pub deallocations: u64,
  /// Successful `realloc` calls.
  pub reallocations: u64,
  /// Attempts that came back empty (including ones later rescued by a retry).
  pub failed_attempts: u64,
  /// Times the out-of-memory handler was invoked.
  pub handler_calls: u64,
  /// Bytes currently held at the system allocator.
  pub outstanding_bytes: usize,
  /// High water mark of `outstanding_bytes`.
  pub peak_bytes: usize,
}

impl SystemStats {
  pub(crate) fn record_allocation(
    &mut self,
    size: usize,
  ) {
    self.allocations += 1;
    self.outstanding_bytes += size;
    self.peak_bytes = self.peak_bytes.max(self.outstanding_bytes);
  }

  pub(crate) fn record_deallocation(
    &mut self,
    size: usize,
  ) {
    self.deallocations += 1;
    self.outstanding_bytes = self.outstanding_bytes.saturating_sub(size);
  }

  pub(crate) fn record_reallocation(
    &mut self,
    old_size: usize,
    new_size: usize,
  ) {
    self.reallocations += 1;
    self.outstanding_bytes = self.outstanding_bytes.saturating_sub(old_size) + new_size;
    self.peak_bytes = self.peak_bytes.max(self.outstanding_bytes);
  }
}

/// Snapshot of a size-class pool.
///
/// Produced by [`Pool::stats`](crate::Pool::stats); mutating the pool does
/// not update an existing snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStats {
  /// Pooled blocks currently owned by clients.
  pub outstanding_blocks: usize,
  /// Free blocks per size class, smallest class first.
  pub free_blocks: Vec<usize>,
  /// Bytes ever obtained from the system to back arenas.
  pub heap_size: usize,
  /// Bytes left in the current arena.
  pub arena_remaining: usize,
  /// Free-list refills triggered by an empty size class.
  pub refills: u64,
  /// Free blocks turned into an arena because the system was exhausted.
  pub cannibalized: u64,
  /// Pooled blocks handed out over the pool's lifetime.
  pub pooled_allocations: u64,
  /// Requests forwarded to the system because they exceeded the pooled size.
  pub large_allocations: u64,
  pub system: SystemStats,
}

impl PoolStats {
  /// Total free blocks across all size classes.
  pub fn total_free_blocks(&self) -> usize {
    self.free_blocks.iter().sum()
  }

  /// Fraction of arena bytes currently owned by clients or free lists
  /// rather than idle in the arena (0.0 to 1.0).
  pub fn arena_utilization(&self) -> f64 {
    if self.heap_size == 0 {
      return 1.0;
    }

    1.0 - (self.arena_remaining as f64 / self.heap_size as f64)
  }
}
