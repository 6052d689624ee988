//! Record descriptors.
//!
//! A [`Shape`] pins down where a flexible record keeps its count field and
//! its trailing elements. Typed records derive theirs from their generic
//! parameters with [`Shape::of`], so two records can only be mixed when the
//! compiler already agrees they match. Raw byte-block records carry a
//! runtime descriptor that is compared before any byte moves.

use std::fmt;
use std::mem::{align_of, size_of};

use crate::count::CountField;
use crate::error::{FlexError, Result};
use crate::size::{align_up, elements_bytes, total_bytes};

/// Width of a count field stored inside a raw record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountWidth {
    U8,
    U16,
    U32,
    U64,
}

impl CountWidth {
    /// Width for a typed count field.
    pub const fn of<C: CountField>() -> Self {
        match C::BITS {
            8 => CountWidth::U8,
            16 => CountWidth::U16,
            32 => CountWidth::U32,
            _ => CountWidth::U64,
        }
    }

    /// Width from a bit count (8, 16, 32, or 64).
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            8 => Ok(CountWidth::U8),
            16 => Ok(CountWidth::U16),
            32 => Ok(CountWidth::U32),
            64 => Ok(CountWidth::U64),
            _ => Err(FlexError::InvalidShape("count width must be 8, 16, 32, or 64 bits")),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            CountWidth::U8 => 8,
            CountWidth::U16 => 16,
            CountWidth::U32 => 32,
            CountWidth::U64 => 64,
        }
    }

    /// Size of the field in bytes.
    pub const fn bytes(self) -> usize {
        (self.bits() / 8) as usize
    }

    /// Largest count the field can hold, clamped to `usize`.
    pub const fn max(self) -> usize {
        match self {
            CountWidth::U8 => <u8 as CountField>::MAX,
            CountWidth::U16 => <u16 as CountField>::MAX,
            CountWidth::U32 => <u32 as CountField>::MAX,
            CountWidth::U64 => <u64 as CountField>::MAX,
        }
    }
}

/// Layout of a flexible record: header (containing the count) then elements.
///
/// ```text
/// ┌────────────────────────────────┬───────────────────────────────┐
/// │ header (elements_offset bytes) │ elements (element_size × N)   │
/// │   ... count field ...          │                               │
/// └────────────────────────────────┴───────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    count_offset: usize,
    count_width: CountWidth,
    elements_offset: usize,
    element_size: usize,
    element_align: usize,
}

impl Shape {
    /// Validate an explicit descriptor.
    ///
    /// The count field must lie wholly inside the header, the element
    /// alignment must be a power of two that divides the element offset and
    /// the element size, and elements must be at least one byte wide.
    pub fn new(
        count_offset: usize,
        count_width: CountWidth,
        elements_offset: usize,
        element_size: usize,
        element_align: usize,
    ) -> Result<Self> {
        let count_end = count_offset
            .checked_add(count_width.bytes())
            .ok_or(FlexError::InvalidShape("count field offset overflows"))?;
        if count_end > elements_offset {
            return Err(FlexError::InvalidShape("count field overlaps elements"));
        }
        if element_size == 0 {
            return Err(FlexError::InvalidShape("element size must be non-zero"));
        }
        if !element_align.is_power_of_two() {
            return Err(FlexError::InvalidShape("element alignment must be a power of two"));
        }
        if elements_offset % element_align != 0 || element_size % element_align != 0 {
            return Err(FlexError::InvalidShape("elements are misaligned"));
        }
        Ok(Self {
            count_offset,
            count_width,
            elements_offset,
            element_size,
            element_align,
        })
    }

    /// Shape of the `#[repr(C)]` layout `{ header: H, count: C, elements: [E] }`.
    pub const fn of<H, E, C: CountField>() -> Self {
        let count_offset = align_up(size_of::<H>(), align_of::<C>());
        let elements_offset = align_up(count_offset + size_of::<C>(), align_of::<E>());
        Self {
            count_offset,
            count_width: CountWidth::of::<C>(),
            elements_offset,
            element_size: size_of::<E>(),
            element_align: align_of::<E>(),
        }
    }

    pub const fn count_offset(&self) -> usize {
        self.count_offset
    }

    pub const fn count_width(&self) -> CountWidth {
        self.count_width
    }

    /// Bytes preceding the first element, padding included.
    pub const fn header_size(&self) -> usize {
        self.elements_offset
    }

    pub const fn elements_offset(&self) -> usize {
        self.elements_offset
    }

    pub const fn element_size(&self) -> usize {
        self.element_size
    }

    pub const fn element_align(&self) -> usize {
        self.element_align
    }

    /// Largest element count representable in the count field.
    pub const fn max_count(&self) -> usize {
        self.count_width.max()
    }

    /// Alignment of the record as a whole.
    pub const fn align(&self) -> usize {
        let count_align = self.count_width.bytes();
        if count_align > self.element_align {
            count_align
        } else {
            self.element_align
        }
    }

    /// Bytes occupied by `count` elements.
    pub fn elements_bytes(&self, count: usize) -> Result<usize> {
        elements_bytes(count, self.element_size, self.max_count())
    }

    /// Bytes occupied by a record holding `count` elements.
    pub fn total_bytes(&self, count: usize) -> Result<usize> {
        total_bytes(self.elements_offset, self.elements_bytes(count)?)
    }

    /// Fail with `ShapeMismatch` unless `other` has exactly this layout.
    pub fn ensure_same(&self, other: &Shape) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(FlexError::ShapeMismatch {
                expected: *self,
                actual: *other,
            })
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count@{}:u{} elements@{}x{}",
            self.count_offset,
            self.count_width.bits(),
            self.elements_offset,
            self.element_size
        )
    }
}

/// Layout of an outer structure whose final member is a flexible record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncapShape {
    embedded_offset: usize,
    inner: Shape,
}

impl EncapShape {
    /// Shape of `#[repr(C)] { outer: O, record: { H, C, [E] } }`.
    pub const fn of<O, H, E, C: CountField>() -> Self {
        let inner = Shape::of::<H, E, C>();
        let inner_align = {
            let a = align_of::<H>();
            let b = inner.align();
            if a > b {
                a
            } else {
                b
            }
        };
        Self {
            embedded_offset: align_up(size_of::<O>(), inner_align),
            inner,
        }
    }

    /// Offset of the embedded record; everything before it is outer fields.
    pub const fn embedded_offset(&self) -> usize {
        self.embedded_offset
    }

    pub const fn inner(&self) -> &Shape {
        &self.inner
    }

    /// Bytes occupied by the whole structure with `count` inner elements.
    pub fn total_bytes(&self, count: usize) -> Result<usize> {
        total_bytes(self.embedded_offset, self.inner.total_bytes(count)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    struct Prefix {
        flags: u64,
        tag: u8,
    }

    #[test]
    fn typed_shape_matches_repr_c() {
        let shape = Shape::of::<Prefix, u32, u8>();
        // Prefix is 16 bytes (u64 + u8 + padding); u8 count at 16; u32 elements at 20.
        assert_eq!(shape.count_offset(), 16);
        assert_eq!(shape.count_width(), CountWidth::U8);
        assert_eq!(shape.elements_offset(), 20);
        assert_eq!(shape.element_size(), 4);
        assert_eq!(shape.max_count(), 255);
    }

    #[test]
    fn typed_shape_matches_struct_size() {
        let shape = Shape::of::<(), u32, usize>();
        assert_eq!(shape.total_bytes(13).unwrap(), size_of::<usize>() + 4 * 13);
        assert_eq!(shape.elements_bytes(13).unwrap(), 52);
    }

    #[test]
    fn aligned_elements_push_offset() {
        let shape = Shape::of::<(), u64, u16>();
        assert_eq!(shape.count_offset(), 0);
        assert_eq!(shape.elements_offset(), 8);
    }

    #[test]
    fn explicit_shape_validation() {
        assert!(Shape::new(0, CountWidth::U16, 8, 4, 4).is_ok());
        assert_eq!(
            Shape::new(6, CountWidth::U32, 8, 4, 4).unwrap_err(),
            FlexError::InvalidShape("count field overlaps elements")
        );
        assert!(Shape::new(0, CountWidth::U8, 4, 0, 1).is_err());
        assert!(Shape::new(0, CountWidth::U8, 4, 4, 3).is_err());
        assert!(Shape::new(0, CountWidth::U8, 2, 4, 4).is_err());
    }

    #[test]
    fn ensure_same_reports_both_shapes() {
        let a = Shape::new(0, CountWidth::U16, 8, 4, 4).unwrap();
        let b = Shape::new(0, CountWidth::U32, 8, 4, 4).unwrap();
        assert!(a.ensure_same(&a).is_ok());
        let err = a.ensure_same(&b).unwrap_err();
        assert_eq!(
            err,
            FlexError::ShapeMismatch {
                expected: a,
                actual: b
            }
        );
        assert_eq!(a.to_string(), "count@0:u16 elements@8x4");
    }

    #[test]
    fn encapsulated_offset() {
        let shape = EncapShape::of::<(u64, i32), Prefix, u32, u8>();
        assert_eq!(shape.embedded_offset(), 16);
        assert_eq!(shape.total_bytes(2).unwrap(), 16 + 20 + 8);
    }

    #[test]
    fn width_round_trip() {
        assert_eq!(CountWidth::from_bits(16).unwrap(), CountWidth::U16);
        assert!(CountWidth::from_bits(24).is_err());
        assert_eq!(CountWidth::U64.bytes(), 8);
    }
}
