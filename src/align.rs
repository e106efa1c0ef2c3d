/// Rounds `value` up to the next multiple of `align`.
///
/// `align` must be a power of two. This is the rounding used to map a
/// request onto its size class.
///
/// # Examples
///
/// ```rust
/// use rdeque::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(1, 16), 16);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}
