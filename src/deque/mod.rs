//! Double-ended queue stored as a map of fixed-size blocks.
//!
//! ```text
//!   map (map_capacity slots, live nodes kept near the middle)
//!   ┌─────┬─────┬─────┬─────┬─────┬─────┬─────┬─────┐
//!   │  ·  │  ·  │ b0  │ b1  │ b2  │  ·  │  ·  │  ·  │
//!   └─────┴─────┴──┬──┴──┬──┴──┬──┴─────┴─────┴─────┘
//!                  │     │     │
//!                  ▼     ▼     ▼
//!            [..xxxxx][xxxxxxxx][xxx.....]
//!               ▲                   ▲
//!             begin                end
//! ```
//!
//! Pushing at either end fills the boundary block and links a fresh block
//! once it is full. Blocks never move, so references into the deque stay
//! put across pushes at the ends; only the map of block pointers is ever
//! copied.

mod cursor;
mod iter;
mod map;

use std::{
  alloc::{Layout, handle_alloc_error},
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
  iter as std_iter,
  marker::PhantomData,
  mem,
  ops::{Bound, Index, IndexMut, RangeBounds},
  ptr::{self, NonNull},
};

pub use cursor::{Cursor, block_len};
pub use iter::{IntoIter, Iter, IterMut};

use crate::{
  alloc::{Allocator, Pool},
  construct::{destroy_run, has_trivial_destructor, move_run},
  error::{AllocError, BoundsError},
};
use cursor::element_ptr;

/// Smallest map a deque starts with.
const INITIAL_MAP_SIZE: usize = 8;

/// Escalates an allocation failure from an infallible operation.
#[cold]
fn alloc_failure(err: AllocError) -> ! {
  match err {
    AllocError::OutOfMemory { size } => {
      handle_alloc_error(Layout::from_size_align(size, 1).unwrap_or(Layout::new::<u8>()))
    }
    err => panic!("{err}"),
  }
}

/// A double-ended queue with O(1) pushes and pops at both ends and O(1)
/// random access.
///
/// Elements live in blocks of [`block_len::<T>()`](block_len) slots obtained
/// from `A`. Inserting or erasing in the middle shifts whichever side is
/// shorter.
pub struct Deque<T, A: Allocator = Pool> {
  map: NonNull<*mut T>,
  map_size: usize,
  start: Cursor<T>,
  finish: Cursor<T>,
  alloc: A,
  _marker: PhantomData<T>,
}

unsafe impl<T: Send, A: Allocator + Send> Send for Deque<T, A> {}
unsafe impl<T: Sync, A: Allocator + Sync> Sync for Deque<T, A> {}

impl<T> Deque<T> {
  /// An empty deque on the calling thread's shared pool.
  pub fn new() -> Self {
    Self::new_in(Pool::shared())
  }

  pub fn try_new() -> Result<Self, AllocError> {
    Self::try_new_in(Pool::shared())
  }

  /// An empty deque whose map already has room for `capacity` elements.
  pub fn with_capacity(capacity: usize) -> Self {
    Self::with_capacity_in(capacity, Pool::shared())
  }

  /// `n` clones of `value`.
  pub fn from_elem(
    n: usize,
    value: T,
  ) -> Self
  where
    T: Clone,
  {
    Self::from_elem_in(n, value, Pool::shared())
  }
}

impl<T, A: Allocator> Deque<T, A> {
  const BLOCK_LEN: usize = block_len::<T>();

  pub fn new_in(alloc: A) -> Self {
    Self::try_new_in(alloc).unwrap_or_else(|err| alloc_failure(err))
  }

  pub fn try_new_in(alloc: A) -> Result<Self, AllocError> {
    Self::try_with_capacity_in(0, alloc)
  }

  pub fn with_capacity_in(
    capacity: usize,
    alloc: A,
  ) -> Self {
    Self::try_with_capacity_in(capacity, alloc).unwrap_or_else(|err| alloc_failure(err))
  }

  /// Sizes the map for `capacity` elements and links the first block in
  /// its middle.
  pub fn try_with_capacity_in(
    capacity: usize,
    alloc: A,
  ) -> Result<Self, AllocError> {
    if capacity > Self::max_size_for_type() {
      return Err(AllocError::CapacityOverflow);
    }

    let num_nodes = capacity / Self::BLOCK_LEN + 1;
    let map_size = INITIAL_MAP_SIZE.max(num_nodes + 2);
    let map = map::allocate_map::<T, A>(&alloc, map_size)?;

    let block = match alloc.allocate_array::<T>(Self::BLOCK_LEN) {
      Ok(block) => block,
      Err(err) => {
        unsafe { alloc.deallocate_array(map, map_size) };
        return Err(err);
      }
    };

    let node = (map_size - num_nodes) / 2;
    unsafe { *map.as_ptr().add(node) = block.as_ptr() };

    Ok(Self {
      map,
      map_size,
      start: Cursor::new(node, 0),
      finish: Cursor::new(node, 0),
      alloc,
      _marker: PhantomData,
    })
  }

  pub fn from_elem_in(
    n: usize,
    value: T,
    alloc: A,
  ) -> Self
  where
    T: Clone,
  {
    let mut deque = Self::with_capacity_in(n, alloc);
    deque.extend(std_iter::repeat_n(value, n));
    deque
  }

  pub fn allocator(&self) -> &A {
    &self.alloc
  }

  fn max_size_for_type() -> usize {
    isize::MAX as usize / mem::size_of::<T>().max(1)
  }

  fn ptr_at(
    &self,
    cursor: Cursor<T>,
  ) -> *mut T {
    unsafe { element_ptr(self.map.as_ptr(), cursor) }
  }

  pub fn len(&self) -> usize {
    (self.finish - self.start) as usize
  }

  pub fn is_empty(&self) -> bool {
    self.start == self.finish
  }

  /// Largest number of elements a deque of `T` can address.
  pub fn max_size(&self) -> usize {
    Self::max_size_for_type()
  }

  /// Slots in the block map.
  pub fn map_capacity(&self) -> usize {
    self.map_size
  }

  /// Unused map slots before the front block.
  pub fn front_headroom(&self) -> usize {
    self.start.node
  }

  /// Unused map slots after the back block.
  pub fn back_headroom(&self) -> usize {
    self.map_size - 1 - self.finish.node
  }

  pub fn block_len(&self) -> usize {
    Self::BLOCK_LEN
  }

  /// Cursor at the first element.
  pub fn begin(&self) -> Cursor<T> {
    self.start
  }

  /// Cursor one past the last element.
  pub fn end(&self) -> Cursor<T> {
    self.finish
  }

  /// The element under `cursor`, if it lies in `[begin, end)`.
  pub fn cursor_get(
    &self,
    cursor: Cursor<T>,
  ) -> Option<&T> {
    (self.start <= cursor && cursor < self.finish).then(|| unsafe { &*self.ptr_at(cursor) })
  }

  pub fn cursor_get_mut(
    &mut self,
    cursor: Cursor<T>,
  ) -> Option<&mut T> {
    if self.start <= cursor && cursor < self.finish {
      Some(unsafe { &mut *self.ptr_at(cursor) })
    } else {
      None
    }
  }

  /// Index of the element under `cursor`, if it lies in `[begin, end]`.
  pub fn index_of(
    &self,
    cursor: Cursor<T>,
  ) -> Option<usize> {
    (self.start <= cursor && cursor <= self.finish).then(|| (cursor - self.start) as usize)
  }

  pub fn get(
    &self,
    index: usize,
  ) -> Option<&T> {
    (index < self.len()).then(|| unsafe { self.get_unchecked(index) })
  }

  pub fn get_mut(
    &mut self,
    index: usize,
  ) -> Option<&mut T> {
    if index < self.len() {
      Some(unsafe { self.get_unchecked_mut(index) })
    } else {
      None
    }
  }

  /// Checked access.
  pub fn at(
    &self,
    index: usize,
  ) -> Result<&T, BoundsError> {
    self.get(index).ok_or(BoundsError {
      index,
      len: self.len(),
    })
  }

  pub fn at_mut(
    &mut self,
    index: usize,
  ) -> Result<&mut T, BoundsError> {
    let len = self.len();
    self.get_mut(index).ok_or(BoundsError { index, len })
  }

  /// # Safety
  ///
  /// `index` must be below `len()`.
  pub unsafe fn get_unchecked(
    &self,
    index: usize,
  ) -> &T {
    debug_assert!(index < self.len());
    unsafe { &*self.ptr_at(self.start + index as isize) }
  }

  /// # Safety
  ///
  /// `index` must be below `len()`.
  pub unsafe fn get_unchecked_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    debug_assert!(index < self.len());
    unsafe { &mut *self.ptr_at(self.start + index as isize) }
  }

  pub fn front(&self) -> Option<&T> {
    self.get(0)
  }

  pub fn front_mut(&mut self) -> Option<&mut T> {
    self.get_mut(0)
  }

  pub fn back(&self) -> Option<&T> {
    self.len().checked_sub(1).and_then(|index| self.get(index))
  }

  pub fn back_mut(&mut self) -> Option<&mut T> {
    let index = self.len().checked_sub(1)?;
    self.get_mut(index)
  }

  pub fn iter(&self) -> Iter<'_, T> {
    Iter::new(self.map.as_ptr(), self.start, self.finish)
  }

  pub fn iter_mut(&mut self) -> IterMut<'_, T> {
    IterMut::new(self.map.as_ptr(), self.start, self.finish)
  }

  pub fn push_back(
    &mut self,
    value: T,
  ) {
    if let Err(err) = self.try_push_back(value) {
      alloc_failure(err);
    }
  }

  /// Appends `value`. On failure the deque is unchanged and `value` is
  /// dropped.
  pub fn try_push_back(
    &mut self,
    value: T,
  ) -> Result<(), AllocError> {
    if self.finish.offset + 1 < Self::BLOCK_LEN {
      unsafe { self.ptr_at(self.finish).write(value) };
      self.finish.offset += 1;
      return Ok(());
    }

    self.push_back_aux(value)
  }

  /// The back block is about to fill: link a new one after it first so
  /// `finish` always points into allocated memory.
  fn push_back_aux(
    &mut self,
    value: T,
  ) -> Result<(), AllocError> {
    self.reserve_map_at_back(1)?;
    let block = self.allocate_block()?;

    unsafe {
      *self.map_slot(self.finish.node + 1) = block;
      self.ptr_at(self.finish).write(value);
    }
    self.finish = Cursor::new(self.finish.node + 1, 0);

    Ok(())
  }

  pub fn push_front(
    &mut self,
    value: T,
  ) {
    if let Err(err) = self.try_push_front(value) {
      alloc_failure(err);
    }
  }

  /// Prepends `value`. On failure the deque is unchanged and `value` is
  /// dropped.
  pub fn try_push_front(
    &mut self,
    value: T,
  ) -> Result<(), AllocError> {
    if self.start.offset > 0 {
      self.start.offset -= 1;
      unsafe { self.ptr_at(self.start).write(value) };
      return Ok(());
    }

    self.reserve_map_at_front(1)?;
    let block = self.allocate_block()?;

    unsafe { *self.map_slot(self.start.node - 1) = block };
    self.start = Cursor::new(self.start.node - 1, Self::BLOCK_LEN - 1);
    unsafe { self.ptr_at(self.start).write(value) };

    Ok(())
  }

  pub fn pop_back(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }

    if self.finish.offset == 0 {
      unsafe { self.free_block(self.finish.node) };
      self.finish = Cursor::new(self.finish.node - 1, Self::BLOCK_LEN - 1);
    } else {
      self.finish.offset -= 1;
    }

    Some(unsafe { self.ptr_at(self.finish).read() })
  }

  pub fn pop_front(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }

    let value = unsafe { self.ptr_at(self.start).read() };

    if self.start.offset + 1 == Self::BLOCK_LEN {
      unsafe { self.free_block(self.start.node) };
      self.start = Cursor::new(self.start.node + 1, 0);
    } else {
      self.start.offset += 1;
    }

    Some(value)
  }

  /// Relocates `count` elements from `src` to `dst` one block-run at a time.
  /// The ranges may overlap; the copy direction is chosen so no element is
  /// overwritten before it is read.
  ///
  /// # Safety
  ///
  /// Every slot in both ranges must lie in a linked block, and `src` must
  /// hold `count` initialized elements.
  unsafe fn move_elements(
    &self,
    mut src: Cursor<T>,
    mut dst: Cursor<T>,
    count: usize,
  ) {
    if count == 0 || src == dst {
      return;
    }

    let block_len = Self::BLOCK_LEN;
    let mut remaining = count;

    if dst < src {
      while remaining > 0 {
        let run = remaining
          .min(block_len - src.offset)
          .min(block_len - dst.offset);
        unsafe { move_run(self.ptr_at(src), self.ptr_at(dst), run) };

        src += run as isize;
        dst += run as isize;
        remaining -= run;
      }
    } else {
      let mut src_end = src + count as isize;
      let mut dst_end = dst + count as isize;
      let room = |cursor: Cursor<T>| if cursor.offset == 0 { block_len } else { cursor.offset };

      while remaining > 0 {
        let run = remaining.min(room(src_end)).min(room(dst_end));

        src_end -= run as isize;
        dst_end -= run as isize;
        unsafe { move_run(self.ptr_at(src_end), self.ptr_at(dst_end), run) };

        remaining -= run;
      }
    }
  }

  /// Drops `count` elements starting at `from`.
  ///
  /// # Safety
  ///
  /// The range must hold initialized elements that are not read again.
  unsafe fn drop_elements(
    &self,
    mut from: Cursor<T>,
    count: usize,
  ) {
    if has_trivial_destructor::<T>() {
      return;
    }

    let mut remaining = count;
    while remaining > 0 {
      let run = remaining.min(Self::BLOCK_LEN - from.offset);
      unsafe { destroy_run(self.ptr_at(from), run) };

      from += run as isize;
      remaining -= run;
    }
  }

  /// Opens a gap of `n` uninitialized slots before `index` by shifting the
  /// shorter side outward, and returns a cursor to the first slot of the gap.
  fn insert_slots(
    &mut self,
    index: usize,
    n: usize,
  ) -> Result<Cursor<T>, AllocError> {
    let len = self.len();
    debug_assert!(index <= len);

    if n == 0 {
      return Ok(self.start + index as isize);
    }

    if len.checked_add(n).is_none_or(|total| total > self.max_size()) {
      return Err(AllocError::CapacityOverflow);
    }

    if index < len / 2 {
      let new_start = self.reserve_elements_at_front(n)?;
      unsafe { self.move_elements(self.start, new_start, index) };
      self.start = new_start;

      Ok(new_start + index as isize)
    } else {
      let new_finish = self.reserve_elements_at_back(n)?;
      let pos = self.start + index as isize;
      unsafe { self.move_elements(pos, pos + n as isize, len - index) };
      self.finish = new_finish;

      Ok(pos)
    }
  }

  /// Moves the contents of `values` into the slots starting at `dst`.
  ///
  /// # Safety
  ///
  /// The `values.len()` slots from `dst` must be linked and uninitialized.
  unsafe fn write_from_vec(
    &mut self,
    mut dst: Cursor<T>,
    mut values: Vec<T>,
  ) {
    let count = values.len();
    let mut src = values.as_ptr();
    let mut remaining = count;

    unsafe {
      values.set_len(0);

      while remaining > 0 {
        let run = remaining.min(Self::BLOCK_LEN - dst.offset);
        ptr::copy_nonoverlapping(src, self.ptr_at(dst), run);

        src = src.add(run);
        dst += run as isize;
        remaining -= run;
      }
    }
  }

  fn try_insert_vec(
    &mut self,
    index: usize,
    values: Vec<T>,
  ) -> Result<(), AllocError> {
    let len = self.len();
    assert!(index <= len, "insertion index {index} out of bounds for length {len}");

    let gap = self.insert_slots(index, values.len())?;
    unsafe { self.write_from_vec(gap, values) };

    Ok(())
  }

  /// Inserts `value` before `index`.
  ///
  /// # Panics
  ///
  /// If `index > len()`.
  pub fn insert(
    &mut self,
    index: usize,
    value: T,
  ) {
    if let Err(err) = self.try_insert(index, value) {
      alloc_failure(err);
    }
  }

  pub fn try_insert(
    &mut self,
    index: usize,
    value: T,
  ) -> Result<(), AllocError> {
    let len = self.len();
    assert!(index <= len, "insertion index {index} out of bounds for length {len}");

    if index == 0 {
      return self.try_push_front(value);
    }
    if index == len {
      return self.try_push_back(value);
    }

    let gap = self.insert_slots(index, 1)?;
    unsafe { self.ptr_at(gap).write(value) };

    Ok(())
  }

  /// Inserts `n` clones of `value` before `index`.
  pub fn insert_n(
    &mut self,
    index: usize,
    n: usize,
    value: T,
  ) where
    T: Clone,
  {
    if let Err(err) = self.try_insert_n(index, n, value) {
      alloc_failure(err);
    }
  }

  pub fn try_insert_n(
    &mut self,
    index: usize,
    n: usize,
    value: T,
  ) -> Result<(), AllocError>
  where
    T: Clone,
  {
    self.try_insert_vec(index, vec![value; n])
  }

  /// Inserts the items of `iter`, in order, before `index`.
  pub fn insert_iter<I: IntoIterator<Item = T>>(
    &mut self,
    index: usize,
    iter: I,
  ) {
    if let Err(err) = self.try_insert_iter(index, iter) {
      alloc_failure(err);
    }
  }

  pub fn try_insert_iter<I: IntoIterator<Item = T>>(
    &mut self,
    index: usize,
    iter: I,
  ) -> Result<(), AllocError> {
    self.try_insert_vec(index, iter.into_iter().collect())
  }

  /// Removes the `n` vacated slots starting at `first` by pulling the
  /// shorter side inward, then releases blocks left empty.
  fn close_gap(
    &mut self,
    first: usize,
    n: usize,
  ) {
    let len = self.len();
    let after = len - first - n;

    if first < (len - n) / 2 {
      unsafe { self.move_elements(self.start, self.start + n as isize, first) };
      self.discard_front(n);
    } else {
      let pos = self.start + first as isize;
      unsafe { self.move_elements(pos + n as isize, pos, after) };
      self.discard_back(n);
    }
  }

  /// Removes and returns the element at `index`.
  ///
  /// # Panics
  ///
  /// If `index >= len()`.
  pub fn erase(
    &mut self,
    index: usize,
  ) -> T {
    let len = self.len();
    if index >= len {
      panic!("{}", BoundsError { index, len });
    }

    let value = unsafe { self.ptr_at(self.start + index as isize).read() };
    self.close_gap(index, 1);

    value
  }

  /// Drops the elements in `range` and closes the gap.
  ///
  /// # Panics
  ///
  /// If the range is decreasing or ends past `len()`.
  pub fn erase_range<R: RangeBounds<usize>>(
    &mut self,
    range: R,
  ) {
    let len = self.len();
    let first = match range.start_bound() {
      Bound::Included(&start) => start,
      Bound::Excluded(&start) => start
        .checked_add(1)
        .unwrap_or_else(|| panic!("erase range start {start} out of bounds for length {len}")),
      Bound::Unbounded => 0,
    };
    let last = match range.end_bound() {
      Bound::Included(&end) => end
        .checked_add(1)
        .unwrap_or_else(|| panic!("erase range end {end} out of bounds for length {len}")),
      Bound::Excluded(&end) => end,
      Bound::Unbounded => len,
    };
    assert!(first <= last, "erase range starts at {first} but ends at {last}");
    assert!(last <= len, "erase range end {last} out of bounds for length {len}");

    if first == last {
      return;
    }

    struct CloseGap<'a, T, A: Allocator> {
      deque: &'a mut Deque<T, A>,
      first: usize,
      n: usize,
    }

    impl<T, A: Allocator> Drop for CloseGap<'_, T, A> {
      fn drop(&mut self) {
        self.deque.close_gap(self.first, self.n);
      }
    }

    let guard = CloseGap {
      deque: self,
      first,
      n: last - first,
    };
    let from = guard.deque.start + first as isize;
    unsafe { guard.deque.drop_elements(from, guard.n) };
  }

  /// Keeps the first `len` elements and drops the rest.
  pub fn truncate(
    &mut self,
    len: usize,
  ) {
    if len < self.len() {
      self.erase_range(len..);
    }
  }

  /// Drops every element. The front block stays linked.
  pub fn clear(&mut self) {
    self.erase_range(..);
  }

  pub fn resize(
    &mut self,
    new_len: usize,
    value: T,
  ) where
    T: Clone,
  {
    let len = self.len();
    if new_len <= len {
      self.truncate(new_len);
    } else {
      self.extend(std_iter::repeat_n(value, new_len - len));
    }
  }

  pub fn resize_with<F: FnMut() -> T>(
    &mut self,
    new_len: usize,
    f: F,
  ) {
    let len = self.len();
    if new_len <= len {
      self.truncate(new_len);
    } else {
      self.extend(std_iter::repeat_with(f).take(new_len - len));
    }
  }

  /// Replaces the contents with `n` clones of `value`, reusing the slots
  /// already in place.
  pub fn assign_n(
    &mut self,
    n: usize,
    value: T,
  ) where
    T: Clone,
  {
    self.truncate(n);
    for slot in self.iter_mut() {
      slot.clone_from(&value);
    }

    let missing = n - self.len();
    self.extend(std_iter::repeat_n(value, missing));
  }

  /// Replaces the contents with the items of `iter`.
  pub fn assign_iter<I: IntoIterator<Item = T>>(
    &mut self,
    iter: I,
  ) {
    let mut iter = iter.into_iter();
    let mut kept = 0;

    for slot in self.iter_mut() {
      match iter.next() {
        Some(value) => {
          *slot = value;
          kept += 1;
        }
        None => break,
      }
    }

    self.truncate(kept);
    self.extend(iter);
  }

  /// Exchanges the contents (and allocators) of two deques in O(1).
  pub fn swap(
    &mut self,
    other: &mut Self,
  ) {
    mem::swap(self, other);
  }

  /// Returns every block and the map to the allocator.
  ///
  /// # Safety
  ///
  /// The elements must already be dropped; the deque must not be used
  /// afterwards.
  unsafe fn release_storage(&mut self) {
    unsafe {
      for node in self.start.node..=self.finish.node {
        self.free_block(node);
      }
      self.alloc.deallocate_array(self.map, self.map_size);
    }
  }
}

impl<T, A: Allocator> Drop for Deque<T, A> {
  fn drop(&mut self) {
    struct Release<'a, T, A: Allocator>(&'a mut Deque<T, A>);

    impl<T, A: Allocator> Drop for Release<'_, T, A> {
      fn drop(&mut self) {
        unsafe { self.0.release_storage() };
      }
    }

    let guard = Release(self);
    let (start, len) = (guard.0.start, guard.0.len());
    unsafe { guard.0.drop_elements(start, len) };
  }
}

impl<T> Default for Deque<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone, A: Allocator> Clone for Deque<T, A> {
  fn clone(&self) -> Self {
    let mut copy = Self::with_capacity_in(self.len(), self.alloc.clone());
    copy.extend(self.iter().cloned());
    copy
  }
}

impl<T, A: Allocator> Extend<T> for Deque<T, A> {
  fn extend<I: IntoIterator<Item = T>>(
    &mut self,
    iter: I,
  ) {
    let iter = iter.into_iter();
    let (lower, _) = iter.size_hint();

    if lower > 0 {
      if let Err(err) = self.reserve_map_at_back(lower.div_ceil(Self::BLOCK_LEN)) {
        alloc_failure(err);
      }
    }

    for value in iter {
      self.push_back(value);
    }
  }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for Deque<T, A> {
  fn extend<I: IntoIterator<Item = &'a T>>(
    &mut self,
    iter: I,
  ) {
    self.extend(iter.into_iter().copied());
  }
}

impl<T> FromIterator<T> for Deque<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut deque = Deque::new();
    deque.extend(iter);
    deque
  }
}

impl<T, A: Allocator> Index<usize> for Deque<T, A> {
  type Output = T;

  fn index(
    &self,
    index: usize,
  ) -> &T {
    match self.at(index) {
      Ok(value) => value,
      Err(err) => panic!("{err}"),
    }
  }
}

impl<T, A: Allocator> IndexMut<usize> for Deque<T, A> {
  fn index_mut(
    &mut self,
    index: usize,
  ) -> &mut T {
    match self.at_mut(index) {
      Ok(value) => value,
      Err(err) => panic!("{err}"),
    }
  }
}

impl<T: PartialEq, A: Allocator, B: Allocator> PartialEq<Deque<T, B>> for Deque<T, A> {
  fn eq(
    &self,
    other: &Deque<T, B>,
  ) -> bool {
    self.len() == other.len() && self.iter().eq(other.iter())
  }
}

impl<T: Eq, A: Allocator> Eq for Deque<T, A> {}

impl<T: PartialOrd, A: Allocator> PartialOrd for Deque<T, A> {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<Ordering> {
    self.iter().partial_cmp(other.iter())
  }
}

impl<T: Ord, A: Allocator> Ord for Deque<T, A> {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    self.iter().cmp(other.iter())
  }
}

impl<T: Hash, A: Allocator> Hash for Deque<T, A> {
  fn hash<H: Hasher>(
    &self,
    state: &mut H,
  ) {
    state.write_usize(self.len());
    for value in self {
      value.hash(state);
    }
  }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Deque<T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T, A: Allocator> IntoIterator for Deque<T, A> {
  type Item = T;
  type IntoIter = IntoIter<T, A>;

  fn into_iter(self) -> IntoIter<T, A> {
    IntoIter::new(self)
  }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Deque<T, A> {
  type Item = &'a T;
  type IntoIter = Iter<'a, T>;

  fn into_iter(self) -> Iter<'a, T> {
    self.iter()
  }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Deque<T, A> {
  type Item = &'a mut T;
  type IntoIter = IterMut<'a, T>;

  fn into_iter(self) -> IterMut<'a, T> {
    self.iter_mut()
  }
}
