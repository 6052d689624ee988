use std::fmt;

use flexprims_layout::{CountField, EncapShape, Element, Result};
use zerocopy::FromZeros;

use crate::record::FlexRecord;

/// Outer fields followed by an embedded flexible record.
///
/// Allocating operations build these with the outer fields zeroed; see
/// [`crate::duplicate_into`] and [`crate::bytes_to_encapsulated_alloc`].
pub struct Encapsulated<O, H, E, C = u32> {
    outer: O,
    record: FlexRecord<H, E, C>,
}

impl<O, H, E: Element, C: CountField> Encapsulated<O, H, E, C> {
    /// Layout of this structure.
    pub const SHAPE: EncapShape = EncapShape::of::<O, H, E, C>();

    pub fn new(outer: O, record: FlexRecord<H, E, C>) -> Self {
        Self { outer, record }
    }

    pub fn outer(&self) -> &O {
        &self.outer
    }

    pub fn outer_mut(&mut self) -> &mut O {
        &mut self.outer
    }

    /// The embedded flexible record.
    pub fn record(&self) -> &FlexRecord<H, E, C> {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut FlexRecord<H, E, C> {
        &mut self.record
    }

    pub fn into_parts(self) -> (O, FlexRecord<H, E, C>) {
        (self.outer, self.record)
    }

    /// Byte size of the outer fields plus the embedded record's live size.
    pub fn total_bytes(&self) -> Result<usize> {
        Self::SHAPE.total_bytes(self.record.count())
    }
}

impl<O: FromZeros, H: Clone, E: Element, C: CountField> Encapsulated<O, H, E, C> {
    /// Wrap an exactly-sized duplicate of `src` with zeroed outer fields.
    pub fn try_wrap(src: &FlexRecord<H, E, C>) -> Result<Self> {
        crate::dup::encapsulate_record(src)
    }
}

impl<O, H, E, C> PartialEq for Encapsulated<O, H, E, C>
where
    O: PartialEq,
    H: PartialEq,
    E: Element + PartialEq,
    C: CountField,
{
    fn eq(&self, other: &Self) -> bool {
        self.outer == other.outer && self.record == other.record
    }
}

impl<O, H, E, C> fmt::Debug for Encapsulated<O, H, E, C>
where
    O: fmt::Debug,
    H: fmt::Debug,
    E: Element + fmt::Debug,
    C: CountField,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Encapsulated")
            .field("outer", &self.outer)
            .field("record", &self.record)
            .finish()
    }
}
