//! Block map bookkeeping: growing and recentring the map, linking and
//! releasing blocks at either end.

use std::ptr::{self, NonNull};

use tracing::{debug, trace};

use super::{Cursor, Deque};
use crate::{alloc::Allocator, error::AllocError};

/// Allocates a map of `size` null slots.
pub(super) fn allocate_map<T, A: Allocator>(
  alloc: &A,
  size: usize,
) -> Result<NonNull<*mut T>, AllocError> {
  let map = alloc.allocate_array::<*mut T>(size)?;
  unsafe { ptr::write_bytes(map.as_ptr(), 0, size) };

  Ok(map)
}

impl<T, A: Allocator> Deque<T, A> {
  pub(super) fn map_slot(
    &self,
    node: usize,
  ) -> *mut *mut T {
    debug_assert!(node < self.map_size, "map node {node} out of range");
    unsafe { self.map.as_ptr().add(node) }
  }

  pub(super) fn allocate_block(&self) -> Result<*mut T, AllocError> {
    self
      .alloc
      .allocate_array::<T>(Self::BLOCK_LEN)
      .map(NonNull::as_ptr)
  }

  /// Returns the block linked at `node` and clears the slot.
  ///
  /// # Safety
  ///
  /// The block must hold no live elements.
  pub(super) unsafe fn free_block(
    &mut self,
    node: usize,
  ) {
    unsafe {
      let slot = self.map_slot(node);
      debug_assert!(!(*slot).is_null(), "freeing unlinked block at node {node}");

      self
        .alloc
        .deallocate_array(NonNull::new_unchecked(*slot), Self::BLOCK_LEN);
      *slot = ptr::null_mut();
    }
  }

  /// Makes sure at least `nodes_to_add` unused map slots follow the back
  /// node.
  pub(super) fn reserve_map_at_back(
    &mut self,
    nodes_to_add: usize,
  ) -> Result<(), AllocError> {
    if nodes_to_add > self.map_size - 1 - self.finish.node {
      self.reallocate_map(nodes_to_add, false)?;
    }

    Ok(())
  }

  /// Makes sure at least `nodes_to_add` unused map slots precede the front
  /// node.
  pub(super) fn reserve_map_at_front(
    &mut self,
    nodes_to_add: usize,
  ) -> Result<(), AllocError> {
    if nodes_to_add > self.start.node {
      self.reallocate_map(nodes_to_add, true)?;
    }

    Ok(())
  }

  /// Recentres the live nodes when the map is roomy enough, otherwise moves
  /// them into the middle of a larger map. Blocks never move; only the
  /// pointers to them do.
  fn reallocate_map(
    &mut self,
    nodes_to_add: usize,
    add_at_front: bool,
  ) -> Result<(), AllocError> {
    let old_num_nodes = self.finish.node - self.start.node + 1;
    let new_num_nodes = old_num_nodes
      .checked_add(nodes_to_add)
      .ok_or(AllocError::CapacityOverflow)?;
    let front_gap = if add_at_front { nodes_to_add } else { 0 };

    let new_start = if self.map_size > 2 * new_num_nodes {
      let new_start = (self.map_size - new_num_nodes) / 2 + front_gap;

      unsafe {
        let base = self.map.as_ptr();
        ptr::copy(base.add(self.start.node), base.add(new_start), old_num_nodes);

        ptr::write_bytes(base, 0, new_start);
        let tail = new_start + old_num_nodes;
        ptr::write_bytes(base.add(tail), 0, self.map_size - tail);
      }

      trace!(
        map_size = self.map_size,
        from = self.start.node,
        to = new_start,
        "recentred deque map"
      );

      new_start
    } else {
      let new_map_size = self
        .map_size
        .checked_add(self.map_size.max(nodes_to_add))
        .and_then(|size| size.checked_add(2))
        .ok_or(AllocError::CapacityOverflow)?;
      let new_map = allocate_map::<T, A>(&self.alloc, new_map_size)?;
      let new_start = (new_map_size - new_num_nodes) / 2 + front_gap;

      unsafe {
        ptr::copy_nonoverlapping(
          self.map.as_ptr().add(self.start.node),
          new_map.as_ptr().add(new_start),
          old_num_nodes,
        );
        self.alloc.deallocate_array(self.map, self.map_size);
      }

      debug!(
        old_size = self.map_size,
        new_size = new_map_size,
        nodes = old_num_nodes,
        "reallocated deque map"
      );

      self.map = new_map;
      self.map_size = new_map_size;

      new_start
    };

    self.start.node = new_start;
    self.finish.node = new_start + old_num_nodes - 1;

    Ok(())
  }

  /// Links enough blocks in front of the front block for `n` more elements
  /// and returns the cursor `n` elements before the current front.
  ///
  /// If a block cannot be obtained, the blocks linked so far are returned
  /// and the deque is left as it was.
  pub(super) fn reserve_elements_at_front(
    &mut self,
    n: usize,
  ) -> Result<Cursor<T>, AllocError> {
    let vacancies = self.start.offset;

    if n > vacancies {
      let new_nodes = (n - vacancies).div_ceil(Self::BLOCK_LEN);
      self.reserve_map_at_front(new_nodes)?;

      for i in 1..=new_nodes {
        match self.allocate_block() {
          Ok(block) => unsafe { *self.map_slot(self.start.node - i) = block },
          Err(err) => {
            for j in 1..i {
              unsafe { self.free_block(self.start.node - j) };
            }
            return Err(err);
          }
        }
      }
    }

    Ok(self.start - n as isize)
  }

  /// Links enough blocks after the back block for `n` more elements and
  /// returns the cursor `n` elements past the current back.
  ///
  /// Same rollback as [`reserve_elements_at_front`](Self::reserve_elements_at_front).
  pub(super) fn reserve_elements_at_back(
    &mut self,
    n: usize,
  ) -> Result<Cursor<T>, AllocError> {
    let vacancies = Self::BLOCK_LEN - self.finish.offset - 1;

    if n > vacancies {
      let new_nodes = (n - vacancies).div_ceil(Self::BLOCK_LEN);
      self.reserve_map_at_back(new_nodes)?;

      for i in 1..=new_nodes {
        match self.allocate_block() {
          Ok(block) => unsafe { *self.map_slot(self.finish.node + i) = block },
          Err(err) => {
            for j in 1..i {
              unsafe { self.free_block(self.finish.node + j) };
            }
            return Err(err);
          }
        }
      }
    }

    Ok(self.finish + n as isize)
  }

  /// Moves the front forward by `n` slots whose elements are already gone,
  /// releasing the blocks left behind.
  pub(super) fn discard_front(
    &mut self,
    n: usize,
  ) {
    let new_start = self.start + n as isize;
    debug_assert!(new_start <= self.finish);

    for node in self.start.node..new_start.node {
      unsafe { self.free_block(node) };
    }

    self.start = new_start;
  }

  /// Moves the back backward by `n` slots whose elements are already gone,
  /// releasing the blocks left behind.
  pub(super) fn discard_back(
    &mut self,
    n: usize,
  ) {
    let new_finish = self.finish - n as isize;
    debug_assert!(new_finish >= self.start);

    for node in new_finish.node + 1..=self.finish.node {
      unsafe { self.free_block(node) };
    }

    self.finish = new_finish;
  }
}
