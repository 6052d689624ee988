//! Count-field widths and requested element counts.

use std::fmt;

use crate::error::{FlexError, Result};

/// An unsigned integer type usable as a record's element-count field.
///
/// Also used as the output type for reported byte lengths, where a narrow
/// type (e.g. `u8`) rejects lengths it cannot hold instead of truncating them.
pub trait CountField: Copy + Default + Eq + Ord + fmt::Debug + Send + Sync + 'static {
    /// Bit width of the field.
    const BITS: u32;

    /// Largest count the field can hold, clamped to `usize`.
    const MAX: usize;

    /// The stored count.
    fn get(self) -> usize;

    /// Convert a count into the field type, failing if it does not fit.
    fn from_count(count: usize) -> Result<Self>;
}

macro_rules! impl_count_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CountField for $ty {
                const BITS: u32 = <$ty>::BITS;

                const MAX: usize = if (<$ty>::MAX as u128) > (usize::MAX as u128) {
                    usize::MAX
                } else {
                    <$ty>::MAX as usize
                };

                fn get(self) -> usize {
                    usize::try_from(self).unwrap_or(usize::MAX)
                }

                fn from_count(count: usize) -> Result<Self> {
                    <$ty>::try_from(count).map_err(|_| FlexError::CountOverflow {
                        count: count as u128,
                        max: <Self as CountField>::MAX,
                    })
                }
            }
        )*
    };
}

impl_count_field!(u8, u16, u32, u64, usize);

/// A caller-supplied element count of any primitive integer type.
///
/// Signed counts are accepted so that a negative request is rejected before
/// any size arithmetic runs, instead of wrapping into a huge unsigned value.
pub trait ElementCount: Copy + fmt::Debug {
    /// Convert to `usize`, rejecting negative and out-of-range values.
    fn to_count(self) -> Result<usize>;
}

macro_rules! impl_unsigned_count {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ElementCount for $ty {
                fn to_count(self) -> Result<usize> {
                    usize::try_from(self).map_err(|_| FlexError::CountOverflow {
                        count: self as u128,
                        max: usize::MAX,
                    })
                }
            }
        )*
    };
}

macro_rules! impl_signed_count {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ElementCount for $ty {
                fn to_count(self) -> Result<usize> {
                    if self < 0 {
                        return Err(FlexError::NegativeCount(self as i128));
                    }
                    usize::try_from(self).map_err(|_| FlexError::CountOverflow {
                        count: self as u128,
                        max: usize::MAX,
                    })
                }
            }
        )*
    };
}

impl_unsigned_count!(u8, u16, u32, u64, u128, usize);
impl_signed_count!(i8, i16, i32, i64, i128, isize);
