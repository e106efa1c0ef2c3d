use std::{
  cmp::Ordering,
  fmt,
  hash::{Hash, Hasher},
  marker::PhantomData,
  mem,
  ops::{Add, AddAssign, Sub, SubAssign},
};

/// Target size of one block, in bytes.
const BLOCK_BYTES: usize = 512;

/// Number of `T` per block: as many as fit in 512 bytes, and at least one.
pub const fn block_len<T>() -> usize {
  let size = mem::size_of::<T>();

  if size == 0 {
    BLOCK_BYTES
  } else if size < BLOCK_BYTES {
    BLOCK_BYTES / size
  } else {
    1
  }
}

/// A random-access position in a [`Deque`](super::Deque).
///
/// A cursor is a `(node, offset)` pair: `node` indexes the deque's block map
/// and `offset` is the slot inside that block, always below
/// [`block_len`]. Its logical position is `node * block_len + offset`, which
/// makes stepping, jumping and measuring distance O(1) no matter how many
/// blocks lie in between.
///
/// ```text
///   map:   [ ·  | b3 | b4 | b5 |  · ]
///                  │    │    │
///   block: [....xxxx][xxxxxxxx][xx......]
///              ▲                  ▲
///            begin               end
///   end - begin = BLOCK_LEN * (5 - 3) + 2 - 4
/// ```
///
/// Cursors do not borrow the deque. Any operation that grows the deque's
/// map (or recentres it) renumbers the nodes, so cursors taken before it
/// must not be reused.
pub struct Cursor<T> {
  pub(crate) node: usize,
  pub(crate) offset: usize,
  _marker: PhantomData<fn() -> T>,
}

impl<T> Cursor<T> {
  pub const BLOCK_LEN: usize = block_len::<T>();

  pub(crate) const fn new(
    node: usize,
    offset: usize,
  ) -> Self {
    Self {
      node,
      offset,
      _marker: PhantomData,
    }
  }

  /// Map slot of the block this cursor points into.
  pub fn node(&self) -> usize {
    self.node
  }

  /// Slot within the block.
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Moves one element forward (`++`).
  pub fn step_forward(&mut self) {
    self.offset += 1;

    if self.offset == Self::BLOCK_LEN {
      self.node += 1;
      self.offset = 0;
    }
  }

  /// Moves one element back (`--`).
  pub fn step_back(&mut self) {
    if self.offset == 0 {
      assert!(self.node > 0, "cursor stepped before the first map slot");
      self.node -= 1;
      self.offset = Self::BLOCK_LEN;
    }

    self.offset -= 1;
  }

  /// Moves `n` elements (either direction) in O(1).
  pub fn advance(
    &mut self,
    n: isize,
  ) {
    let block_len = Self::BLOCK_LEN as isize;
    let offset = self.offset as isize + n;

    if (0..block_len).contains(&offset) {
      self.offset = offset as usize;
      return;
    }

    // Floor division: an offset of -1 belongs to the previous block.
    let node = self.node as isize + offset.div_euclid(block_len);
    assert!(node >= 0, "cursor moved before the first map slot");

    self.node = node as usize;
    self.offset = offset.rem_euclid(block_len) as usize;
  }

  /// Signed number of elements from `origin` to `self`.
  pub fn distance_from(
    &self,
    origin: &Self,
  ) -> isize {
    let block_len = Self::BLOCK_LEN as isize;

    block_len * (self.node as isize - origin.node as isize) + self.offset as isize
      - origin.offset as isize
  }
}

impl<T> Clone for Cursor<T> {
  fn clone(&self) -> Self {
    *self
  }
}

impl<T> Copy for Cursor<T> {}

impl<T> PartialEq for Cursor<T> {
  fn eq(
    &self,
    other: &Self,
  ) -> bool {
    self.node == other.node && self.offset == other.offset
  }
}

impl<T> Eq for Cursor<T> {}

impl<T> PartialOrd for Cursor<T> {
  fn partial_cmp(
    &self,
    other: &Self,
  ) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl<T> Ord for Cursor<T> {
  fn cmp(
    &self,
    other: &Self,
  ) -> Ordering {
    (self.node, self.offset).cmp(&(other.node, other.offset))
  }
}

impl<T> Hash for Cursor<T> {
  fn hash<H: Hasher>(
    &self,
    state: &mut H,
  ) {
    self.node.hash(state);
    self.offset.hash(state);
  }
}

impl<T> fmt::Debug for Cursor<T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_struct("Cursor")
      .field("node", &self.node)
      .field("offset", &self.offset)
      .finish()
  }
}

impl<T> AddAssign<isize> for Cursor<T> {
  fn add_assign(
    &mut self,
    n: isize,
  ) {
    self.advance(n);
  }
}

impl<T> SubAssign<isize> for Cursor<T> {
  fn sub_assign(
    &mut self,
    n: isize,
  ) {
    self.advance(-n);
  }
}

impl<T> Add<isize> for Cursor<T> {
  type Output = Self;

  fn add(
    mut self,
    n: isize,
  ) -> Self {
    self.advance(n);
    self
  }
}

impl<T> Sub<isize> for Cursor<T> {
  type Output = Self;

  fn sub(
    mut self,
    n: isize,
  ) -> Self {
    self.advance(-n);
    self
  }
}

impl<T> Sub for Cursor<T> {
  type Output = isize;

  fn sub(
    self,
    origin: Self,
  ) -> isize {
    self.distance_from(&origin)
  }
}

/// Address of the element `cursor` points at.
///
/// # Safety
///
/// `map` must hold at least `cursor.node + 1` slots and the slot at
/// `cursor.node` must point to a live block.
pub(crate) unsafe fn element_ptr<T>(
  map: *const *mut T,
  cursor: Cursor<T>,
) -> *mut T {
  unsafe { (*map.add(cursor.node)).add(cursor.offset) }
}
