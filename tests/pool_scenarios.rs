mod common;

use std::{alloc::Layout, cell::Cell, ptr::NonNull, rc::Rc};

use rdeque::{AllocError, Allocator, ConfigError, Pool, PoolConfig};

fn pool() -> Pool {
  common::init_tracing();
  Pool::new(PoolConfig::default()).unwrap()
}

#[test]
fn test_lifo_churn_needs_one_arena() {
  let pool = pool();

  for _ in 0..10_000 {
    let ptr = pool.allocate_bytes(24).unwrap();
    unsafe { pool.deallocate_bytes(ptr, 24) };
  }

  let stats = pool.stats();
  assert_eq!(stats.system.allocations, 1);
  assert_eq!(stats.refills, 1);
  assert_eq!(stats.outstanding_blocks, 0);
  assert_eq!(stats.pooled_allocations, 10_000);
}

#[test]
fn test_second_refill_comes_from_arena_leftovers() {
  let pool = pool();

  // 20 blocks of 24 bytes use half of the first 960-byte arena.
  let first: Vec<NonNull<u8>> = (0..20).map(|_| pool.allocate_bytes(24).unwrap()).collect();
  assert_eq!(pool.stats().free_blocks[2], 0);
  assert_eq!(pool.stats().arena_remaining, 480);

  let second: Vec<NonNull<u8>> = (0..20).map(|_| pool.allocate_bytes(24).unwrap()).collect();
  let stats = pool.stats();
  assert_eq!(stats.refills, 2);
  assert_eq!(stats.system.allocations, 1);
  assert_eq!(stats.arena_remaining, 0);

  for ptr in first.into_iter().chain(second) {
    unsafe { pool.deallocate_bytes(ptr, 24) };
  }

  let stats = pool.stats();
  assert_eq!(stats.free_blocks[2], 40);
  assert_eq!(stats.outstanding_blocks, 0);
}

#[test]
fn test_every_size_lands_in_its_class() {
  let pool = pool();

  for size in 1..=128usize {
    let class = size.div_ceil(8) - 1;
    let rounded = (class + 1) * 8;

    let a = pool.allocate_bytes(size).unwrap();
    let b = pool.allocate_bytes(size).unwrap();
    assert_eq!(a.as_ptr() as usize % 8, 0);

    unsafe {
      a.as_ptr().write_bytes(0xAA, rounded);
      b.as_ptr().write_bytes(0x55, rounded);
      assert!((0..rounded).all(|i| *a.as_ptr().add(i) == 0xAA));
    }

    let before = pool.stats().free_blocks[class];
    unsafe {
      pool.deallocate_bytes(a, size);
      pool.deallocate_bytes(b, size);
    }
    assert_eq!(pool.stats().free_blocks[class], before + 2);
  }
}

#[test]
fn test_allocate_then_free_restores_occupancy() {
  let pool = pool();

  for size in [1, 8, 9, 64, 100, 128] {
    let warm = pool.allocate_bytes(size).unwrap();
    unsafe { pool.deallocate_bytes(warm, size) };

    let before = pool.stats().free_blocks;
    let ptr = pool.allocate_bytes(size).unwrap();
    unsafe { pool.deallocate_bytes(ptr, size) };
    assert_eq!(pool.stats().free_blocks, before);
  }
}

#[test]
fn test_large_requests_round_trip_through_system() {
  let pool = pool();
  let layout = Layout::from_size_align(4096, 8).unwrap();

  let ptr = pool.allocate(layout).unwrap();
  assert_eq!(pool.stats().system.outstanding_bytes, 4096);
  unsafe { pool.deallocate(ptr, layout) };

  let stats = pool.stats();
  assert_eq!(stats.large_allocations, 1);
  assert_eq!(stats.system.outstanding_bytes, 0);
  assert_eq!(stats.outstanding_blocks, 0);
}

#[test]
fn test_handler_is_consulted_before_failing() {
  common::init_tracing();
  let pool = Pool::new(PoolConfig::default().with_system_limit(0)).unwrap();
  let calls = Rc::new(Cell::new(0));

  let seen = calls.clone();
  pool.set_oom_handler(Some(Box::new(move || {
    seen.set(seen.get() + 1);
    seen.get() < 3
  })));

  assert_eq!(pool.allocate_bytes(4096), Err(AllocError::OutOfMemory { size: 4096 }));
  assert_eq!(calls.get(), 3);
  assert_eq!(pool.stats().system.handler_calls, 3);

  let previous = pool.set_oom_handler(None);
  assert!(previous.is_some());
}

#[test]
fn test_oversized_request_under_a_limit_is_out_of_memory() {
  common::init_tracing();
  let pool = Pool::new(PoolConfig::default().with_system_limit(1 << 20)).unwrap();

  assert_eq!(
    pool.allocate_bytes(usize::MAX - 16),
    Err(AllocError::OutOfMemory { size: usize::MAX - 16 })
  );
  assert_eq!(pool.stats().system.outstanding_bytes, 0);
}

#[test]
fn test_overflowing_tuning_is_rejected_up_front() {
  let shifted = PoolConfig {
    growth_shift: 64,
    ..PoolConfig::default()
  };
  assert!(matches!(
    Pool::new(shifted),
    Err(ConfigError::GrowthShiftTooLarge { shift: 64, .. })
  ));

  let batched = PoolConfig {
    refill_count: usize::MAX / 4,
    ..PoolConfig::default()
  };
  assert!(matches!(
    Pool::new(batched),
    Err(ConfigError::RefillCountTooLarge { .. })
  ));
}
