use rdeque::{Deque, Pool, PoolConfig, PoolStats};
use tracing_subscriber::EnvFilter;

/// Prints the parts of a pool snapshot that change as the deque grows.
fn print_stats(
  label: &str,
  stats: &PoolStats,
) {
  println!(
    "[{label}] outstanding = {}, free = {}, heap = {} B, arena left = {} B, refills = {}, malloc calls = {}",
    stats.outstanding_blocks,
    stats.total_free_blocks(),
    stats.heap_size,
    stats.arena_remaining,
    stats.refills,
    stats.system.allocations,
  );
}

fn main() {
  // RUST_LOG=rdeque=trace shows every refill and map move.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let pool = match Pool::new(PoolConfig::for_deque_blocks()) {
    Ok(pool) => pool,
    Err(err) => {
      eprintln!("bad pool configuration: {err}");
      return;
    }
  };
  print_stats("start", &pool.stats());

  // --------------------------------------------------------------------
  // 1) Fill from both ends. Each 512-byte block holds 64 values.
  // --------------------------------------------------------------------
  let mut deque = Deque::new_in(pool.clone());
  for i in 0..1000i64 {
    deque.push_back(i);
    deque.push_front(-i - 1);
  }
  println!(
    "\n[1] len = {}, front = {:?}, back = {:?}, map = {} slots",
    deque.len(),
    deque.front(),
    deque.back(),
    deque.map_capacity(),
  );
  print_stats("1", &pool.stats());

  // --------------------------------------------------------------------
  // 2) Cursors are plain (node, offset) pairs with O(1) arithmetic.
  // --------------------------------------------------------------------
  let begin = deque.begin();
  let middle = begin + 1000;
  println!(
    "\n[2] begin = {begin:?}, begin + 1000 = {middle:?} -> {:?}, end - begin = {}",
    deque.cursor_get(middle),
    deque.end() - begin,
  );

  // --------------------------------------------------------------------
  // 3) Erase a run near the front: only the shorter side moves and
  //    the emptied blocks go back to the pool.
  // --------------------------------------------------------------------
  deque.erase_range(100..600);
  println!(
    "\n[3] after erase_range(100..600): len = {}, [100] = {}",
    deque.len(),
    deque[100]
  );
  print_stats("3", &pool.stats());

  // --------------------------------------------------------------------
  // 4) Drop the deque; every block returns to its free list.
  // --------------------------------------------------------------------
  drop(deque);
  print_stats("4", &pool.stats());
}
