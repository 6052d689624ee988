//! Overflow-checked size arithmetic.
//!
//! Every byte count in the toolkit is produced here. Nothing wraps: an
//! overflow or an out-of-range count is reported as a `TooBig` error.

use tracing::debug;

use crate::error::{FlexError, Result};

/// Bytes occupied by `count` elements of `elem_size` bytes each.
///
/// Fails if `count` exceeds `count_max` (the largest value the record's
/// count field can hold) or if the multiplication overflows.
pub fn elements_bytes(count: usize, elem_size: usize, count_max: usize) -> Result<usize> {
    if count > count_max {
        debug!(count, max = count_max, "element count exceeds count field");
        return Err(FlexError::CountOverflow {
            count: count as u128,
            max: count_max,
        });
    }
    elem_size.checked_mul(count).ok_or_else(|| {
        debug!(count, elem_size, "element bytes overflow");
        FlexError::ArithmeticOverflow
    })
}

/// Total record size: header bytes followed by element bytes.
pub fn total_bytes(header_size: usize, elements_bytes: usize) -> Result<usize> {
    header_size.checked_add(elements_bytes).ok_or_else(|| {
        debug!(header_size, elements_bytes, "record size overflow");
        FlexError::ArithmeticOverflow
    })
}

/// Round `offset` up to the next multiple of `align` (a power of two).
pub const fn align_up(offset: usize, align: usize) -> usize {
    let mask = align - 1;
    (offset + mask) & !mask
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn plain_products() {
        assert_eq!(elements_bytes(13, 4, u32::MAX as usize).unwrap(), 52);
        assert_eq!(elements_bytes(0, 4, 0).unwrap(), 0);
        assert_eq!(total_bytes(24, 52).unwrap(), 76);
    }

    #[test]
    fn count_above_field_max() {
        let err = elements_bytes(259, 1, u8::MAX as usize).unwrap_err();
        assert_eq!(
            err,
            FlexError::CountOverflow {
                count: 259,
                max: 255
            }
        );
    }

    #[test]
    fn multiplication_overflow() {
        let err = elements_bytes(usize::MAX / 2 + 1, 2, usize::MAX).unwrap_err();
        assert_eq!(err, FlexError::ArithmeticOverflow);
    }

    #[test]
    fn addition_overflow() {
        assert_eq!(
            total_bytes(usize::MAX, 1).unwrap_err(),
            FlexError::ArithmeticOverflow
        );
    }

    #[test]
    fn align_up_rounds() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 4), 12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn matches_plain_arithmetic(count in 0usize..1 << 20, elem_size in 0usize..4096, header in 0usize..4096) {
            let bytes = elements_bytes(count, elem_size, usize::MAX).unwrap();
            prop_assert_eq!(bytes, count * elem_size);
            prop_assert_eq!(total_bytes(header, bytes).unwrap(), header + count * elem_size);
        }

        #[test]
        fn narrow_fields_reject_large_counts(count in 256usize..1 << 24, elem_size in 1usize..64) {
            let err = elements_bytes(count, elem_size, u8::MAX as usize).unwrap_err();
            let is_overflow = matches!(err, FlexError::CountOverflow { .. });
            prop_assert!(is_overflow);
        }

        #[test]
        fn overflow_never_wraps(count in 1usize.., elem_size in 1usize..) {
            match elements_bytes(count, elem_size, usize::MAX) {
                Ok(bytes) => prop_assert_eq!(bytes / elem_size, count),
                Err(err) => prop_assert_eq!(err, FlexError::ArithmeticOverflow),
            }
        }
    }
}
