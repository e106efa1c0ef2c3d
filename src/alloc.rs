use std::{
  alloc::Layout,
  cell::RefCell,
  fmt,
  ptr::{self, NonNull},
  rc::Rc,
};

use crate::{
  config::{PoolConfig, SYSTEM_ALIGN},
  error::{AllocError, ConfigError},
  pool::SizeClassPool,
  stats::PoolStats,
  system::OomHandler,
};

/// Memory source for the containers in this crate.
///
/// The size (as a [`Layout`]) is known at both ends, so implementations do
/// not need to store any header with a block.
///
/// # Safety
///
/// `allocate` must return memory valid for `layout` that stays valid until it
/// is passed to `deallocate` on this allocator or any of its clones.
pub unsafe trait Allocator: Clone {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError>;

  /// # Safety
  ///
  /// `ptr` must have been returned by `allocate` on this allocator (or a
  /// clone) with the same `layout`, and must not be used afterwards.
  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  );

  /// Room for `n` values of `T`, uninitialized.
  fn allocate_array<T>(
    &self,
    n: usize,
  ) -> Result<NonNull<T>, AllocError> {
    let layout = Layout::array::<T>(n).map_err(|_| AllocError::CapacityOverflow)?;
    self.allocate(layout).map(NonNull::cast)
  }

  /// # Safety
  ///
  /// `ptr` must come from `allocate_array::<T>(n)` with the same `n`.
  unsafe fn deallocate_array<T>(
    &self,
    ptr: NonNull<T>,
    n: usize,
  ) {
    // The layout was valid when the array was allocated.
    let layout = unsafe { Layout::array::<T>(n).unwrap_unchecked() };
    unsafe { self.deallocate(ptr.cast(), layout) };
  }
}

/// Handle to a [`SizeClassPool`].
///
/// Clones share one pool. Containers keep a clone, so the pool lives until
/// the last container using it is gone. The handle is single-threaded.
#[derive(Clone)]
pub struct Pool {
  inner: Rc<RefCell<SizeClassPool>>,
}

thread_local! {
  static SHARED: Pool = Pool::from_pool(SizeClassPool::new(PoolConfig::default()));
}

impl Pool {
  pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    Ok(Self::from_pool(SizeClassPool::new(config)))
  }

  fn from_pool(pool: SizeClassPool) -> Self {
    Self {
      inner: Rc::new(RefCell::new(pool)),
    }
  }

  /// The calling thread's default pool, used by `Deque::new`.
  pub fn shared() -> Self {
    SHARED.with(Pool::clone)
  }

  /// Whether two handles refer to the same pool.
  pub fn ptr_eq(
    &self,
    other: &Pool,
  ) -> bool {
    Rc::ptr_eq(&self.inner, &other.inner)
  }

  pub fn config(&self) -> PoolConfig {
    self.inner.borrow().config().clone()
  }

  pub fn stats(&self) -> PoolStats {
    self.inner.borrow().stats()
  }

  /// Installs the handler run when the system allocator fails, returning the
  /// previous one.
  pub fn set_oom_handler(
    &self,
    handler: Option<OomHandler>,
  ) -> Option<OomHandler> {
    self.inner.borrow_mut().set_oom_handler(handler)
  }

  /// Untyped allocation of `bytes` bytes aligned to the pool's alignment.
  pub fn allocate_bytes(
    &self,
    bytes: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    self.inner.borrow_mut().allocate(bytes)
  }

  /// # Safety
  ///
  /// See [`SizeClassPool::deallocate`].
  pub unsafe fn deallocate_bytes(
    &self,
    ptr: NonNull<u8>,
    bytes: usize,
  ) {
    unsafe { self.inner.borrow_mut().deallocate(ptr, bytes) };
  }

  /// # Safety
  ///
  /// See [`SizeClassPool::reallocate`].
  pub unsafe fn reallocate_bytes(
    &self,
    ptr: NonNull<u8>,
    old_bytes: usize,
    new_bytes: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    unsafe { self.inner.borrow_mut().reallocate(ptr, old_bytes, new_bytes) }
  }
}

impl Default for Pool {
  fn default() -> Self {
    Self::shared()
  }
}

impl fmt::Debug for Pool {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let pool = self.inner.borrow();
    f.debug_struct("Pool")
      .field("config", pool.config())
      .field("outstanding_blocks", &pool.stats().outstanding_blocks)
      .finish()
  }
}

/// A well-aligned, non-null pointer that owns no memory.
fn dangling(align: usize) -> NonNull<u8> {
  // `align` is a non-zero power of two.
  unsafe { NonNull::new_unchecked(ptr::without_provenance_mut(align)) }
}

unsafe impl Allocator for Pool {
  fn allocate(
    &self,
    layout: Layout,
  ) -> Result<NonNull<u8>, AllocError> {
    if layout.size() == 0 {
      return Ok(dangling(layout.align()));
    }

    if layout.align() > SYSTEM_ALIGN {
      return Err(AllocError::UnsupportedAlignment {
        align: layout.align(),
        max: SYSTEM_ALIGN,
      });
    }

    let mut pool = self.inner.borrow_mut();
    if layout.align() <= pool.config().align {
      pool.allocate(layout.size())
    } else {
      pool.system().allocate(layout.size())
    }
  }

  unsafe fn deallocate(
    &self,
    ptr: NonNull<u8>,
    layout: Layout,
  ) {
    if layout.size() == 0 {
      return;
    }

    let mut pool = self.inner.borrow_mut();
    unsafe {
      if layout.align() <= pool.config().align {
        pool.deallocate(ptr, layout.size());
      } else {
        pool.system().deallocate(ptr, layout.size());
      }
    }
  }
}
