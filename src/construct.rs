//! Element lifetime helpers for segmented storage.
//!
//! Moving a value in Rust is always a bitwise copy, so relocating elements
//! between slots is a plain `memmove`. Only destruction needs a per-type
//! decision, and that decision is a compile-time constant.

use std::{mem, ptr};

/// Whether dropping a `T` is a no-op. Resolved at compile time, so the
/// element-wise drop loops below vanish for such types.
pub const fn has_trivial_destructor<T>() -> bool {
  !mem::needs_drop::<T>()
}

/// Drops `len` initialized values starting at `first`.
///
/// # Safety
///
/// The range must hold `len` initialized values that are not used again.
pub unsafe fn destroy_run<T>(
  first: *mut T,
  len: usize,
) {
  if has_trivial_destructor::<T>() || len == 0 {
    return;
  }

  unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first, len)) };
}

/// Relocates `len` values from `src` to `dst`. The ranges may overlap.
///
/// # Safety
///
/// `src` must hold `len` initialized values and `dst` must be valid for
/// `len` writes. Afterwards the values live at `dst` only; slots of `src`
/// outside `dst` are logically uninitialized.
pub unsafe fn move_run<T>(
  src: *const T,
  dst: *mut T,
  len: usize,
) {
  unsafe { ptr::copy(src, dst, len) };
}

#[cfg(test)]
mod tests {
  use std::{cell::Cell, mem::MaybeUninit, rc::Rc};

  use super::*;

  struct Counted(Rc<Cell<usize>>);

  impl Drop for Counted {
    fn drop(&mut self) {
      self.0.set(self.0.get() + 1);
    }
  }

  #[test]
  fn test_trivial_destructor_query() {
    assert!(has_trivial_destructor::<u64>());
    assert!(has_trivial_destructor::<(i32, [u8; 4])>());
    assert!(!has_trivial_destructor::<String>());
    assert!(!has_trivial_destructor::<Counted>());
  }

  #[test]
  fn test_destroy_run_drops_each_value() {
    let drops = Rc::new(Cell::new(0));
    let mut slots: [MaybeUninit<Counted>; 3] = [const { MaybeUninit::uninit() }; 3];
    for slot in &mut slots {
      slot.write(Counted(drops.clone()));
    }

    unsafe { destroy_run(slots.as_mut_ptr() as *mut Counted, 3) };
    assert_eq!(drops.get(), 3);
  }

  #[test]
  fn test_move_run_handles_overlap() {
    let mut values = [1, 2, 3, 4, 5, 0];
    let base = values.as_mut_ptr();

    unsafe { move_run(base, base.add(1), 5) };
    assert_eq!(&values[1..], &[1, 2, 3, 4, 5]);

    let base = values.as_mut_ptr();
    unsafe { move_run(base.add(1), base, 5) };
    assert_eq!(&values[..5], &[1, 2, 3, 4, 5]);
  }
}
