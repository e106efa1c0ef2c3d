use std::mem;

use crate::error::ConfigError;

/// Largest alignment `malloc` guarantees on this platform.
pub const SYSTEM_ALIGN: usize = mem::align_of::<libc::max_align_t>();

/// Tuning knobs for a [`Pool`](crate::Pool).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
  /// Granularity of the size classes. Every pooled block is a multiple of it.
  pub align: usize,
  /// Largest request served from the free lists; anything bigger goes
  /// straight to the system allocator.
  pub max_pooled: usize,
  /// Number of blocks requested from the arena when a free list runs dry.
  pub refill_count: usize,
  /// A new arena adds `heap_size >> growth_shift` bytes on top of twice the
  /// batch that triggered it.
  pub growth_shift: u32,
  /// Soft cap on bytes outstanding at the system allocator. Requests past it
  /// fail as if `malloc` had returned null.
  pub system_limit: Option<usize>,
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      align: 8,
      max_pooled: 128,
      refill_count: 20,
      growth_shift: 4,
      system_limit: None,
    }
  }
}

impl PoolConfig {
  /// Pools whole deque blocks of small element types (512 bytes) instead of
  /// forwarding them to `malloc`.
  pub fn for_deque_blocks() -> Self {
    Self {
      max_pooled: 512,
      refill_count: 8,
      ..Self::default()
    }
  }

  /// Caps the bytes this pool may hold at the system allocator.
  pub fn with_system_limit(
    mut self,
    limit: usize,
  ) -> Self {
    self.system_limit = Some(limit);
    self
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if !self.align.is_power_of_two() {
      return Err(ConfigError::AlignmentNotPowerOfTwo(self.align));
    }

    if self.align > SYSTEM_ALIGN {
      return Err(ConfigError::AlignmentTooLarge {
        align: self.align,
        max: SYSTEM_ALIGN,
      });
    }

    if self.max_pooled == 0 || self.max_pooled % self.align != 0 {
      return Err(ConfigError::MaxPooledNotMultiple {
        max_pooled: self.max_pooled,
        align: self.align,
      });
    }

    if self.refill_count == 0 {
      return Err(ConfigError::ZeroRefillCount);
    }

    let batch = self
      .max_pooled
      .checked_mul(self.refill_count)
      .and_then(|bytes| bytes.checked_mul(2));
    if batch.is_none_or(|bytes| bytes > isize::MAX as usize) {
      return Err(ConfigError::RefillCountTooLarge {
        refill_count: self.refill_count,
        max_pooled: self.max_pooled,
      });
    }

    if self.growth_shift >= usize::BITS {
      return Err(ConfigError::GrowthShiftTooLarge {
        shift: self.growth_shift,
        bits: usize::BITS,
      });
    }

    Ok(())
  }

  /// Number of size classes, one per multiple of `align` up to `max_pooled`.
  pub fn class_count(&self) -> usize {
    self.max_pooled / self.align
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_config_is_valid() {
    let config = PoolConfig::default();

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.class_count(), 16);
  }

  #[test]
  fn test_deque_block_preset() {
    let config = PoolConfig::for_deque_blocks();

    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.class_count(), 64);
  }

  #[test]
  fn test_rejects_bad_alignment() {
    let config = PoolConfig {
      align: 12,
      ..PoolConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::AlignmentNotPowerOfTwo(12)));

    let config = PoolConfig {
      align: SYSTEM_ALIGN * 2,
      max_pooled: SYSTEM_ALIGN * 16,
      ..PoolConfig::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::AlignmentTooLarge { .. })
    ));
  }

  #[test]
  fn test_rejects_bad_sizes() {
    let config = PoolConfig {
      max_pooled: 100,
      ..PoolConfig::default()
    };
    assert!(matches!(
      config.validate(),
      Err(ConfigError::MaxPooledNotMultiple { .. })
    ));

    let config = PoolConfig {
      refill_count: 0,
      ..PoolConfig::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::ZeroRefillCount));
  }

  #[test]
  fn test_rejects_refill_batches_that_overflow() {
    let config = PoolConfig {
      refill_count: usize::MAX / 4,
      ..PoolConfig::default()
    };
    assert_eq!(
      config.validate(),
      Err(ConfigError::RefillCountTooLarge {
        refill_count: usize::MAX / 4,
        max_pooled: 128,
      })
    );

    let config = PoolConfig {
      refill_count: isize::MAX as usize / 256,
      ..PoolConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));
  }

  #[test]
  fn test_rejects_growth_shift_past_word_size() {
    let config = PoolConfig {
      growth_shift: usize::BITS,
      ..PoolConfig::default()
    };
    assert_eq!(
      config.validate(),
      Err(ConfigError::GrowthShiftTooLarge {
        shift: usize::BITS,
        bits: usize::BITS,
      })
    );

    let config = PoolConfig {
      growth_shift: usize::BITS - 1,
      ..PoolConfig::default()
    };
    assert_eq!(config.validate(), Ok(()));
  }
}
