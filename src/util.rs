//! Small numeric and formatting helpers.

use num_traits::{Euclid, PrimInt};
use std::fmt;

/// Returns `a mod b` in `[0, b)` for `b > 0`, whatever the sign of `a`.
///
/// Unlike `%`, which truncates toward zero, `normalized_modulo(-1, 5)` is 4.
/// For negative `b` the result is in `[0, |b|)`.
///
/// **Panics** if `b` is zero, or if `a` is the minimum value of a signed type
/// and `b` is -1 (the remainder overflows, as with `%`).
///
/// ```
/// use npz_store::util::normalized_modulo;
///
/// assert_eq!(normalized_modulo(-7, 5), 3);
/// assert_eq!(normalized_modulo(13, 5), 3);
/// ```
pub fn normalized_modulo<T: PrimInt + Euclid>(a: T, b: T) -> T {
    a.rem_euclid(&b)
}

/// Formats an integer as `0x` followed by at least `N` lowercase hex digits.
///
/// ```
/// use npz_store::util::Hex;
///
/// assert_eq!(Hex::<4, _>(255).to_string(), "0x00ff");
/// assert_eq!(format!("{}", Hex::<2, _>(0xabcu16)), "0xabc");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hex<const N: usize, T>(pub T);

impl<const N: usize, T: fmt::LowerHex> fmt::Display for Hex<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:0width$x}", self.0, width = N)
    }
}

/// Shorthand for [`Hex`]: `hex::<8, _>(value)`.
pub fn hex<const N: usize, T: fmt::LowerHex>(value: T) -> Hex<N, T> {
    Hex(value)
}
