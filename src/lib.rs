//! # rdeque - Segmented Deque on a Size-Class Pool Allocator
//!
//! This crate provides a **double-ended queue** stored as a map of fixed-size
//! blocks, and the **two-tier allocator** those blocks come from.
//!
//! ## Overview
//!
//! Small requests are served from per-size free lists refilled in batches
//! from a bump arena; anything larger goes straight to `malloc`:
//!
//! ```text
//!   Two-Tier Allocator:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │  Pool (Allocator trait)                                              │
//!   │                                                                      │
//!   │   size == 0 ──────────────→ dangling pointer                         │
//!   │   size <= max_pooled ─────→ SizeClassPool                            │
//!   │                               ├─→ class 0  (8B)   free: [·, ·, ·]    │
//!   │                               ├─→ class 1  (16B)  free: []           │
//!   │                               ├─→ ...                                │
//!   │                               └─→ class 15 (128B) free: [·]          │
//!   │                                        ▲                             │
//!   │                                        │ refill 20 at a time         │
//!   │                               ┌────────┴──────────────┬──────────┐   │
//!   │                               │ carved ..........     │  free    │   │
//!   │                               └───────────────────────┴──────────┘   │
//!   │                                     Arena        bump ▲     end ▲    │
//!   │                                                                      │
//!   │   size > max_pooled ──────→ SystemDelegate (malloc / free)           │
//!   │                               └─→ out-of-memory handler, retry       │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The deque keeps its elements in blocks of `512 / size_of::<T>()` slots
//! (at least one) and tracks them through a small map of block pointers:
//!
//! ```text
//!   Deque<T>:
//!
//!        map
//!   ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//!   │  ·  │  ·  │  ●  │  ●  │  ●  │  ·  │  ·  │  ·  │
//!   └─────┴─────┴──┼──┴──┼──┴──┼──┴─────┴─────┴─────┘
//!                  ▼     ▼     ▼
//!             ┌────────┬────────┬────────┐
//!             │   xxxxx│xxxxxxxx│xxx     │   blocks never move
//!             └────────┴────────┴────────┘
//!                 ▲                 ▲
//!               begin              end      Cursor = (node, offset)
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rdeque
//!   ├── align      - Alignment macro (align_to!)
//!   ├── alloc      - Allocator trait and the Pool handle
//!   ├── block      - Arena chunks and size-class free lists (internal)
//!   ├── bump       - Bump arena feeding the free lists (internal)
//!   ├── config     - PoolConfig
//!   ├── construct  - Element relocation and destruction helpers
//!   ├── deque      - Deque, Cursor and iterators
//!   ├── error      - AllocError, BoundsError, ConfigError
//!   ├── pool       - SizeClassPool
//!   ├── stats      - PoolStats and SystemStats snapshots
//!   └── system     - SystemDelegate over malloc/realloc/free
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rdeque::{Deque, Pool, PoolConfig};
//!
//! let pool = Pool::new(PoolConfig::for_deque_blocks()).unwrap();
//! let mut deque = Deque::new_in(pool.clone());
//!
//! for i in 0..1000 {
//!     deque.push_back(i);
//!     deque.push_front(-i - 1);
//! }
//!
//! assert_eq!(deque.len(), 2000);
//! assert_eq!(deque[0], -1000);
//! assert_eq!(deque.end() - deque.begin(), 2000);
//!
//! deque.erase_range(10..1990);
//! assert_eq!(deque.len(), 20);
//!
//! drop(deque);
//! assert_eq!(pool.stats().outstanding_blocks, 0);
//! ```
//!
//! ## Features
//!
//! - **O(1) at both ends**: pushes and pops never move existing elements
//! - **O(1) random access**: index or cursor arithmetic in constant time
//! - **Shortest-side shifting**: middle inserts and erases move the smaller half
//! - **Fallible API**: every allocating operation has a `try_` form
//! - **Pool statistics**: free-list occupancy, arena usage, system traffic
//!
//! ## Limitations
//!
//! - **Single-threaded pools**: `Pool` is `!Send`; each thread has its own shared pool
//! - **Alignment**: element types aligned beyond `max_align_t` are rejected
//! - **Arenas are never trimmed**: memory returns to the system when the pool drops
//!
//! ## Safety
//!
//! The allocator layer hands out raw memory and its byte-level entry points
//! are `unsafe`. The deque is a safe API on top of it.

pub mod align;
pub mod alloc;
mod block;
mod bump;
pub mod config;
pub mod construct;
pub mod deque;
pub mod error;
pub mod pool;
pub mod stats;
mod system;

pub use alloc::{Allocator, Pool};
pub use config::PoolConfig;
pub use deque::{Cursor, Deque, IntoIter, Iter, IterMut};
pub use error::{AllocError, BoundsError, ConfigError};
pub use pool::SizeClassPool;
pub use stats::{PoolStats, SystemStats};
pub use system::{OomHandler, SystemDelegate};
