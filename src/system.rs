use std::ptr::NonNull;

use libc::{c_void, free, malloc, realloc};
use tracing::warn;

use crate::{error::AllocError, stats::SystemStats};

/// Called when the system allocator comes back empty.
///
/// Returns `true` if it released memory and the request should be retried,
/// `false` to give up. The handler runs while the owning pool is borrowed and
/// must not allocate from or free into that pool.
pub type OomHandler = Box<dyn FnMut() -> bool>;

/// Passthrough to `malloc`/`realloc`/`free`.
///
/// Serves every request above the pool's pooled size and every arena the
/// pool grows into.
pub struct SystemDelegate {
  handler: Option<OomHandler>,
  limit: Option<usize>,
  stats: SystemStats,
}

impl SystemDelegate {
  pub fn new(limit: Option<usize>) -> Self {
    Self {
      handler: None,
      limit,
      stats: SystemStats::default(),
    }
  }

  /// Installs `handler`, returning the previously installed one.
  pub fn set_oom_handler(
    &mut self,
    handler: Option<OomHandler>,
  ) -> Option<OomHandler> {
    std::mem::replace(&mut self.handler, handler)
  }

  pub fn stats(&self) -> &SystemStats {
    &self.stats
  }

  fn within_limit(
    &self,
    released: usize,
    requested: usize,
  ) -> bool {
    match self.limit {
      Some(limit) => self
        .stats
        .outstanding_bytes
        .saturating_sub(released)
        .checked_add(requested)
        .is_some_and(|total| total <= limit),
      None => true,
    }
  }

  fn raw_malloc(
    &mut self,
    size: usize,
  ) -> Option<NonNull<u8>> {
    if !self.within_limit(0, size) {
      return None;
    }

    // malloc(0) may legitimately return null.
    let ptr = unsafe { malloc(size.max(1)) } as *mut u8;
    let ptr = NonNull::new(ptr)?;

    self.stats.record_allocation(size);

    Some(ptr)
  }

  unsafe fn raw_realloc(
    &mut self,
    ptr: NonNull<u8>,
    old_size: usize,
    new_size: usize,
  ) -> Option<NonNull<u8>> {
    if !self.within_limit(old_size, new_size) {
      return None;
    }

    let result = unsafe { realloc(ptr.as_ptr() as *mut c_void, new_size.max(1)) } as *mut u8;
    let result = NonNull::new(result)?;

    self.stats.record_reallocation(old_size, new_size);

    Some(result)
  }

  /// One `malloc` attempt, without consulting the out-of-memory handler.
  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    self.raw_malloc(size).ok_or_else(|| {
      self.stats.failed_attempts += 1;
      AllocError::OutOfMemory { size }
    })
  }

  /// Allocates `size` bytes, running the out-of-memory handler loop until
  /// the request succeeds or the handler gives up.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    if let Some(ptr) = self.raw_malloc(size) {
      return Ok(ptr);
    }

    loop {
      self.stats.failed_attempts += 1;

      if !self.invoke_handler(size) {
        warn!(size, "system allocator exhausted");
        return Err(AllocError::OutOfMemory { size });
      }

      if let Some(ptr) = self.raw_malloc(size) {
        return Ok(ptr);
      }
    }
  }

  /// Returns a block obtained from [`allocate`](Self::allocate) or
  /// [`try_allocate`](Self::try_allocate).
  ///
  /// # Safety
  ///
  /// `ptr` must come from this delegate, `size` must be the size it was
  /// requested with, and it must not be used afterwards.
  pub unsafe fn deallocate(
    &mut self,
    ptr: NonNull<u8>,
    size: usize,
  ) {
    unsafe { free(ptr.as_ptr() as *mut c_void) };

    self.stats.record_deallocation(size);
  }

  /// Resizes a block, with the same retry discipline as `allocate`. On
  /// failure the original block is untouched.
  ///
  /// # Safety
  ///
  /// Same contract as [`deallocate`](Self::deallocate) for `ptr` and
  /// `old_size`.
  pub unsafe fn reallocate(
    &mut self,
    ptr: NonNull<u8>,
    old_size: usize,
    new_size: usize,
  ) -> Result<NonNull<u8>, AllocError> {
    unsafe {
      if let Some(result) = self.raw_realloc(ptr, old_size, new_size) {
        return Ok(result);
      }

      loop {
        self.stats.failed_attempts += 1;

        if !self.invoke_handler(new_size) {
          warn!(old_size, new_size, "system reallocation failed");
          return Err(AllocError::OutOfMemory { size: new_size });
        }

        if let Some(result) = self.raw_realloc(ptr, old_size, new_size) {
          return Ok(result);
        }
      }
    }
  }

  fn invoke_handler(
    &mut self,
    size: usize,
  ) -> bool {
    let Some(handler) = self.handler.as_mut() else {
      return false;
    };

    self.stats.handler_calls += 1;
    warn!(size, "allocation failed, running out-of-memory handler");

    handler()
  }
}
