use std::{fmt, iter::FusedIterator, marker::PhantomData};

use super::{
  Deque,
  cursor::{Cursor, element_ptr},
};
use crate::alloc::{Allocator, Pool};

/// Borrowing iterator over a [`Deque`].
pub struct Iter<'a, T> {
  map: *const *mut T,
  front: Cursor<T>,
  back: Cursor<T>,
  _marker: PhantomData<&'a T>,
}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}

impl<T> Iter<'_, T> {
  pub(super) fn new(
    map: *const *mut T,
    front: Cursor<T>,
    back: Cursor<T>,
  ) -> Self {
    Self {
      map,
      front,
      back,
      _marker: PhantomData,
    }
  }
}

impl<T> Clone for Iter<'_, T> {
  fn clone(&self) -> Self {
    Self::new(self.map, self.front, self.back)
  }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list().entries(self.clone()).finish()
  }
}

impl<'a, T> Iterator for Iter<'a, T> {
  type Item = &'a T;

  fn next(&mut self) -> Option<&'a T> {
    if self.front == self.back {
      return None;
    }

    let item = unsafe { &*element_ptr(self.map, self.front) };
    self.front.step_forward();

    Some(item)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.len();
    (len, Some(len))
  }

  fn nth(
    &mut self,
    n: usize,
  ) -> Option<&'a T> {
    if n >= self.len() {
      self.front = self.back;
      return None;
    }

    self.front += n as isize;
    self.next()
  }

  fn count(self) -> usize {
    self.len()
  }

  fn last(mut self) -> Option<&'a T> {
    self.next_back()
  }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
  fn next_back(&mut self) -> Option<&'a T> {
    if self.front == self.back {
      return None;
    }

    self.back.step_back();
    Some(unsafe { &*element_ptr(self.map, self.back) })
  }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
  fn len(&self) -> usize {
    (self.back - self.front) as usize
  }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable borrowing iterator over a [`Deque`].
pub struct IterMut<'a, T> {
  map: *const *mut T,
  front: Cursor<T>,
  back: Cursor<T>,
  _marker: PhantomData<&'a mut T>,
}

unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

impl<T> IterMut<'_, T> {
  pub(super) fn new(
    map: *const *mut T,
    front: Cursor<T>,
    back: Cursor<T>,
  ) -> Self {
    Self {
      map,
      front,
      back,
      _marker: PhantomData,
    }
  }
}

impl<T: fmt::Debug> fmt::Debug for IterMut<'_, T> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_list()
      .entries(Iter::new(self.map, self.front, self.back))
      .finish()
  }
}

impl<'a, T> Iterator for IterMut<'a, T> {
  type Item = &'a mut T;

  fn next(&mut self) -> Option<&'a mut T> {
    if self.front == self.back {
      return None;
    }

    let item = unsafe { &mut *element_ptr(self.map, self.front) };
    self.front.step_forward();

    Some(item)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.len();
    (len, Some(len))
  }

  fn nth(
    &mut self,
    n: usize,
  ) -> Option<&'a mut T> {
    if n >= self.len() {
      self.front = self.back;
      return None;
    }

    self.front += n as isize;
    self.next()
  }

  fn count(self) -> usize {
    self.len()
  }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
  fn next_back(&mut self) -> Option<&'a mut T> {
    if self.front == self.back {
      return None;
    }

    self.back.step_back();
    Some(unsafe { &mut *element_ptr(self.map, self.back) })
  }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {
  fn len(&self) -> usize {
    (self.back - self.front) as usize
  }
}

impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator; pops from the front (or back) of the deque it consumed.
pub struct IntoIter<T, A: Allocator = Pool> {
  deque: Deque<T, A>,
}

impl<T, A: Allocator> IntoIter<T, A> {
  pub(super) fn new(deque: Deque<T, A>) -> Self {
    Self { deque }
  }
}

impl<T: Clone, A: Allocator> Clone for IntoIter<T, A> {
  fn clone(&self) -> Self {
    Self::new(self.deque.clone())
  }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.debug_tuple("IntoIter").field(&self.deque).finish()
  }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
  type Item = T;

  fn next(&mut self) -> Option<T> {
    self.deque.pop_front()
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.deque.len();
    (len, Some(len))
  }

  fn count(self) -> usize {
    self.deque.len()
  }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
  fn next_back(&mut self) -> Option<T> {
    self.deque.pop_back()
  }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {
  fn len(&self) -> usize {
    self.deque.len()
  }
}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}
