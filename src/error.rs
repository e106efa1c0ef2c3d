use thiserror::Error;

/// Errors that can occur while obtaining memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
  /// The system allocator could not satisfy the request, even after the
  /// installed out-of-memory handler (if any) gave up.
  #[error("out of memory: failed to allocate {size} bytes")]
  OutOfMemory { size: usize },

  #[error("unsupported alignment {align}: at most {max} is supported")]
  UnsupportedAlignment { align: usize, max: usize },

  /// The requested size does not fit in `isize`.
  #[error("capacity overflow")]
  CapacityOverflow,
}

/// Returned by the checked accessors of a deque.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("index {index} out of bounds for length {len}")]
pub struct BoundsError {
  pub index: usize,
  pub len: usize,
}

/// Rejected pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
  #[error("alignment {0} is not a power of two")]
  AlignmentNotPowerOfTwo(usize),

  /// Arenas come from `malloc`, so no pooled block can be aligned beyond
  /// what `malloc` guarantees.
  #[error("alignment {align} exceeds the system allocator guarantee of {max}")]
  AlignmentTooLarge { align: usize, max: usize },

  #[error("max pooled size {max_pooled} is not a non-zero multiple of the alignment {align}")]
  MaxPooledNotMultiple { max_pooled: usize, align: usize },

  #[error("refill count must be at least 1")]
  ZeroRefillCount,

  /// A refill batch of the largest class, doubled for arena growth, must
  /// fit in `isize`.
  #[error("refill count {refill_count} is too large for blocks of {max_pooled} bytes")]
  RefillCountTooLarge { refill_count: usize, max_pooled: usize },

  #[error("growth shift {shift} must be below {bits}")]
  GrowthShiftTooLarge { shift: u32, bits: u32 },
}
