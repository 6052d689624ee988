use std::fmt;

use bytes::Bytes;
use flexprims_layout::{CountField, Element, ElementCount, FlexError, Limits, Result, Shape};
use zerocopy::{FromZeros, IntoBytes};

use crate::dup::try_zeroed_slots;

/// A fixed header, an element count, and a run of elements.
///
/// Storage is owned by the record and sized once, at construction; its
/// length is the record's capacity. The count field says how many leading
/// slots are live and can never exceed the capacity or the range of `C`.
/// Slots past the count are zero after every copy or fill, so stale data
/// from an earlier, longer record never survives.
pub struct FlexRecord<H, E, C = u32> {
    pub(crate) header: H,
    pub(crate) count: C,
    pub(crate) slots: Vec<E>,
}

impl<H, E: Element, C: CountField> FlexRecord<H, E, C> {
    /// Layout of this record type.
    pub const SHAPE: Shape = Shape::of::<H, E, C>();

    /// Create an empty record with room for `capacity` elements.
    pub fn with_capacity(header: H, capacity: usize) -> Result<Self> {
        Self::SHAPE.total_bytes(capacity)?;
        Ok(Self {
            header,
            count: C::default(),
            slots: try_zeroed_slots(capacity)?,
        })
    }

    /// Create a full record from existing elements.
    pub fn from_elements(header: H, elements: Vec<E>) -> Result<Self> {
        let count = C::from_count(elements.len())?;
        Self::SHAPE.total_bytes(elements.len())?;
        Ok(Self {
            header,
            count,
            slots: elements,
        })
    }

    /// Potential size of a record of this type holding `count` elements.
    pub fn bytes_for(count: impl ElementCount) -> Result<usize> {
        Self::SHAPE.total_bytes(count.to_count()?)
    }

    /// Potential size of `count` elements of this record type.
    pub fn elements_bytes_for(count: impl ElementCount) -> Result<usize> {
        Self::SHAPE.elements_bytes(count.to_count()?)
    }

    pub fn shape(&self) -> Shape {
        Self::SHAPE
    }

    pub fn header(&self) -> &H {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut H {
        &mut self.header
    }

    /// Number of live elements.
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// The count field in its declared width.
    pub fn count_field(&self) -> C {
        self.count
    }

    /// Number of element slots owned by this record.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// The live elements.
    pub fn elements(&self) -> &[E] {
        &self.slots[..self.count()]
    }

    pub fn elements_mut(&mut self) -> &mut [E] {
        let count = self.count();
        &mut self.slots[..count]
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements().get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements().iter()
    }

    /// Raw bytes of the live elements.
    pub fn element_bytes(&self) -> &[u8] {
        self.elements().as_bytes()
    }

    /// Byte size of the live elements.
    pub fn elements_bytes(&self) -> Result<usize> {
        Self::SHAPE.elements_bytes(self.count())
    }

    /// Byte size of the header plus the live elements.
    pub fn total_bytes(&self) -> Result<usize> {
        Self::SHAPE.total_bytes(self.count())
    }

    /// Byte size of the header plus every owned slot.
    pub fn capacity_bytes(&self) -> Result<usize> {
        Self::SHAPE.total_bytes(self.capacity())
    }

    /// Overwrite the count field without touching element storage.
    ///
    /// Slots between the old and new count keep whatever they held.
    pub fn set_count(&mut self, count: impl ElementCount) -> Result<()> {
        let count = count.to_count()?;
        if count > self.capacity() {
            return Err(FlexError::CountOverflow {
                count: count as u128,
                max: self.capacity(),
            });
        }
        self.count = C::from_count(count)?;
        Ok(())
    }

    /// Append an element into the next free slot.
    pub fn push(&mut self, element: E) -> Result<()> {
        let count = self.count();
        if count == self.capacity() {
            return Err(FlexError::CountOverflow {
                count: count as u128 + 1,
                max: self.capacity(),
            });
        }
        let next = C::from_count(count + 1)?;
        self.slots[count] = element;
        self.count = next;
        Ok(())
    }

    /// Shrink to `count` live elements, zeroing the dropped ones.
    pub fn truncate(&mut self, count: usize) {
        let live = self.count();
        if count >= live {
            return;
        }
        self.slots[count..live].as_mut_bytes().fill(0);
        // count < live, which already fits in C
        if let Ok(field) = C::from_count(count) {
            self.count = field;
        }
    }

    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Split into the header and the live elements.
    pub fn into_parts(self) -> (H, Vec<E>) {
        let count = self.count();
        let mut slots = self.slots;
        slots.truncate(count);
        (self.header, slots)
    }

    /// Serialize the live elements into `dst`; see [`crate::record_to_bytes`].
    pub fn write_elements<W: CountField>(&self, dst: &mut [u8]) -> Result<W> {
        crate::ser::record_to_bytes(dst, self)
    }

    /// Serialize the live elements into a new buffer.
    pub fn to_element_bytes(&self) -> Result<Bytes> {
        crate::ser::elements_to_bytes(self, &Limits::default())
    }

    /// Replace the live elements with `count` elements read from `src`;
    /// see [`crate::bytes_to_record`].
    pub fn fill_from_bytes(&mut self, src: &[u8], count: impl ElementCount) -> Result<()> {
        crate::de::bytes_to_record(self, src, count)
    }
}

impl<H: Clone, E: Element, C: CountField> FlexRecord<H, E, C> {
    /// Copy `src` into this record; see [`crate::copy()`].
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        crate::copy::copy(self, src)
    }

    /// Exactly-sized duplicate of this record; see [`crate::duplicate`].
    pub fn try_clone(&self) -> Result<Self> {
        crate::dup::duplicate_record(self)
    }
}

impl<H: FromZeros, E: Element, C: CountField> FlexRecord<H, E, C> {
    /// An empty record with a zeroed header.
    pub fn zeroed(capacity: usize) -> Result<Self> {
        Self::with_capacity(H::new_zeroed(), capacity)
    }

    /// A new record sized exactly for `count` elements read from `src`;
    /// see [`crate::bytes_to_record_alloc`].
    pub fn from_bytes(src: &[u8], count: impl ElementCount) -> Result<Self> {
        crate::de::record_from_bytes(src, count, &Limits::default())
    }
}

impl<'a, H, E: Element, C: CountField> IntoIterator for &'a FlexRecord<H, E, C> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<H: PartialEq, E: Element + PartialEq, C: CountField> PartialEq for FlexRecord<H, E, C> {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.elements() == other.elements()
    }
}

impl<H: fmt::Debug, E: Element + fmt::Debug, C: CountField> fmt::Debug for FlexRecord<H, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlexRecord")
            .field("header", &self.header)
            .field("count", &self.count)
            .field("capacity", &self.capacity())
            .field("elements", &self.elements())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, zerocopy::FromZeros)]
    struct Header {
        flags: u32,
        tag: u16,
    }

    type Rec = FlexRecord<Header, u32, u8>;

    #[test]
    fn with_capacity_starts_empty_and_zeroed() {
        let rec = Rec::with_capacity(Header::default(), 4).unwrap();
        assert_eq!(rec.count(), 0);
        assert_eq!(rec.capacity(), 4);
        assert!(rec.is_empty());
        assert!(rec.slots.iter().all(|&e| e == 0));
    }

    #[test]
    fn capacity_bounded_by_count_field() {
        let err = Rec::with_capacity(Header::default(), 256).unwrap_err();
        assert!(matches!(err, FlexError::CountOverflow { count: 256, max: 255 }));
        let err = Rec::from_elements(Header::default(), vec![0; 300]).unwrap_err();
        assert!(matches!(err, FlexError::CountOverflow { .. }));
    }

    #[test]
    fn push_until_full() {
        let mut rec = Rec::with_capacity(Header::default(), 2).unwrap();
        rec.push(7).unwrap();
        rec.push(8).unwrap();
        assert_eq!(rec.elements(), &[7, 8]);
        assert!(matches!(
            rec.push(9),
            Err(FlexError::CountOverflow { count: 3, max: 2 })
        ));
        assert_eq!(rec.count(), 2);
    }

    #[test]
    fn set_count_within_capacity_only() {
        let mut rec = Rec::from_elements(Header::default(), vec![1, 2, 3]).unwrap();
        rec.set_count(1).unwrap();
        assert_eq!(rec.elements(), &[1]);
        // Storage is untouched, so growing back exposes the old values.
        rec.set_count(3).unwrap();
        assert_eq!(rec.elements(), &[1, 2, 3]);
        assert!(rec.set_count(4).is_err());
        assert!(matches!(rec.set_count(-1), Err(FlexError::NegativeCount(-1))));
    }

    #[test]
    fn truncate_wipes_dropped_elements() {
        let mut rec = Rec::from_elements(Header::default(), vec![1, 2, 3, 4]).unwrap();
        rec.truncate(1);
        assert_eq!(rec.count(), 1);
        rec.set_count(4).unwrap();
        assert_eq!(rec.elements(), &[1, 0, 0, 0]);
        rec.clear();
        assert!(rec.is_empty());
    }

    #[test]
    fn sizes_follow_shape() {
        let rec = Rec::from_elements(Header::default(), vec![5; 13]).unwrap();
        let offset = Rec::SHAPE.elements_offset();
        assert_eq!(offset, 12);
        assert_eq!(rec.elements_bytes().unwrap(), 52);
        assert_eq!(rec.total_bytes().unwrap(), offset + 52);
        assert_eq!(Rec::bytes_for(13).unwrap(), offset + 52);
        assert_eq!(Rec::elements_bytes_for(13u16).unwrap(), 52);
        assert!(Rec::bytes_for(259).is_err());
        assert!(Rec::bytes_for(-3).is_err());
        assert_eq!(rec.element_bytes().len(), 52);
    }

    #[test]
    fn into_parts_drops_dead_slots() {
        let mut rec = Rec::from_elements(Header { flags: 1, tag: 2 }, vec![9, 8, 7]).unwrap();
        rec.set_count(2).unwrap();
        let (header, elements) = rec.into_parts();
        assert_eq!(header, Header { flags: 1, tag: 2 });
        assert_eq!(elements, vec![9, 8]);
    }

    #[test]
    fn equality_ignores_capacity() {
        let a = Rec::from_elements(Header::default(), vec![1, 2]).unwrap();
        let mut b = Rec::zeroed(5).unwrap();
        b.push(1).unwrap();
        b.push(2).unwrap();
        assert_eq!(a, b);
        assert_eq!((&b).into_iter().copied().sum::<u32>(), 3);
    }
}
