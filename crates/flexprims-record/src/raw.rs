//! Single-allocation records described at runtime.
//!
//! A [`RawRecord`] owns one byte block laid out as
//!
//! ```text
//! ┌──────────────────────────────────────────┬──────────────────────────┐
//! │ header (elements_offset bytes)           │ elements                 │
//! │   ... count (native-endian, count_width) │ element_size × capacity  │
//! └──────────────────────────────────────────┴──────────────────────────┘
//! ```
//!
//! The layout comes from a [`Shape`] instead of generic parameters, so two
//! raw records are only mixed after their shapes compare equal. The count
//! lives inside the block and is kept within the block's capacity: header
//! field access never reaches it, and every count update is bounds-checked.

use bytes::Bytes;
use flexprims_layout::{
    CountField, CountWidth, Element, ElementCount, FlexError, Limits, Result, Shape,
};
use tracing::{debug, trace};
use zerocopy::{Immutable, IntoBytes};

use crate::copy::copy_and_wipe;
use crate::dup::try_zeroed_bytes;
use crate::record::FlexRecord;
use crate::ser::reported_len;

/// A flexible record stored as one contiguous, shape-described byte block.
#[derive(Clone, PartialEq, Eq)]
pub struct RawRecord {
    shape: Shape,
    block: Vec<u8>,
}

impl RawRecord {
    /// A zeroed block with room for `capacity` elements and a count of zero.
    pub fn zeroed(shape: Shape, capacity: usize) -> Result<Self> {
        if shape.element_size() == 0 {
            return Err(FlexError::InvalidShape("element size must be non-zero"));
        }
        let total = shape.total_bytes(capacity)?;
        Ok(Self {
            shape,
            block: try_zeroed_bytes(total)?,
        })
    }

    /// Adopt an existing block.
    ///
    /// The block must hold the whole header and a whole number of elements,
    /// and the stored count must not exceed the elements present. The number
    /// of element slots is also capped at the count field's maximum, the same
    /// bound [`RawRecord::zeroed`] and typed records apply to capacity.
    pub fn from_block(shape: Shape, block: Vec<u8>) -> Result<Self> {
        if shape.element_size() == 0 {
            return Err(FlexError::InvalidShape("element size must be non-zero"));
        }
        let header = shape.header_size();
        if block.len() < header {
            debug!(len = block.len(), header, "raw block shorter than header");
            return Err(FlexError::SourceTooShort {
                required: header,
                available: block.len(),
            });
        }
        let region = block.len() - header;
        let extra = region % shape.element_size();
        if extra != 0 {
            debug!(extra, element_size = shape.element_size(), "raw block has partial element");
            return Err(FlexError::TrailingBytes { extra });
        }
        let capacity = region / shape.element_size();
        if capacity > shape.max_count() {
            return Err(FlexError::CountOverflow {
                count: capacity as u128,
                max: shape.max_count(),
            });
        }

        let record = Self { shape, block };
        let count = record.count();
        if count > capacity {
            let required = shape.total_bytes(count)?;
            debug!(count, capacity, "raw block count exceeds its elements");
            return Err(FlexError::SourceTooShort {
                required,
                available: record.block.len(),
            });
        }
        Ok(record)
    }

    /// Lay out a typed record as a raw block with the same shape.
    ///
    /// Padding between the header and the count field is zero.
    pub fn from_typed<H, E, C>(src: &FlexRecord<H, E, C>) -> Result<Self>
    where
        H: IntoBytes + Immutable,
        E: Element,
        C: CountField,
    {
        let shape = FlexRecord::<H, E, C>::SHAPE;
        let mut raw = Self::zeroed(shape, src.capacity())?;
        let header = src.header().as_bytes();
        raw.block[..header.len()].copy_from_slice(header);
        raw.elements_region_mut().copy_from_slice(src.slots.as_bytes());
        raw.store_count(src.count())?;
        Ok(raw)
    }

    /// Allocate a record sized exactly for `count` elements read from `src`.
    pub fn from_bytes(shape: Shape, src: &[u8], count: impl ElementCount) -> Result<Self> {
        Self::from_bytes_with(shape, src, count, &Limits::default())
    }

    /// [`RawRecord::from_bytes`] with an explicit sanity ceiling.
    pub fn from_bytes_with(
        shape: Shape,
        src: &[u8],
        count: impl ElementCount,
        limits: &Limits,
    ) -> Result<Self> {
        let (count, bytes) = checked_source(&shape, src, count, limits)?;
        let mut raw = Self::zeroed(shape, count)?;
        raw.elements_region_mut()[..bytes].copy_from_slice(&src[..bytes]);
        raw.store_count(count)?;
        trace!(bytes, count, "allocated raw record from bytes");
        Ok(raw)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Number of element slots in the block.
    pub fn capacity(&self) -> usize {
        (self.block.len() - self.shape.header_size()) / self.shape.element_size()
    }

    /// The stored element count.
    pub fn count(&self) -> usize {
        let offset = self.shape.count_offset();
        let field = &self.block[offset..offset + self.shape.count_width().bytes()];
        let count = match self.shape.count_width() {
            CountWidth::U8 => u64::from(field[0]),
            CountWidth::U16 => u64::from(u16::from_ne_bytes(load(field))),
            CountWidth::U32 => u64::from(u32::from_ne_bytes(load(field))),
            CountWidth::U64 => u64::from_ne_bytes(load(field)),
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Overwrite the stored count without touching element bytes.
    pub fn set_count(&mut self, count: impl ElementCount) -> Result<()> {
        let count = count.to_count()?;
        if count > self.capacity() {
            return Err(FlexError::CountOverflow {
                count: count as u128,
                max: self.capacity(),
            });
        }
        self.store_count(count)
    }

    /// Header bytes, count field included.
    pub fn header(&self) -> &[u8] {
        &self.block[..self.shape.header_size()]
    }

    /// `len` header bytes starting at `offset`.
    pub fn field(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let end = self.field_end(offset, len)?;
        Ok(&self.block[offset..end])
    }

    /// Mutable header bytes. The range may not overlap the count field.
    pub fn field_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8]> {
        let end = self.field_end(offset, len)?;
        let count_start = self.shape.count_offset();
        let count_end = count_start + self.shape.count_width().bytes();
        if offset < count_end && count_start < end {
            debug!(offset, end, "header field overlaps count");
            return Err(FlexError::FieldOutOfBounds { offset, end });
        }
        Ok(&mut self.block[offset..end])
    }

    /// Bytes of the live elements.
    pub fn elements(&self) -> &[u8] {
        let start = self.shape.elements_offset();
        &self.block[start..start + self.count() * self.shape.element_size()]
    }

    pub fn elements_mut(&mut self) -> &mut [u8] {
        let start = self.shape.elements_offset();
        let end = start + self.count() * self.shape.element_size();
        &mut self.block[start..end]
    }

    /// Bytes of live element `index`.
    pub fn element(&self, index: usize) -> Option<&[u8]> {
        self.elements().chunks_exact(self.shape.element_size()).nth(index)
    }

    pub fn elements_bytes(&self) -> Result<usize> {
        self.shape.elements_bytes(self.count())
    }

    pub fn total_bytes(&self) -> Result<usize> {
        self.shape.total_bytes(self.count())
    }

    /// The whole block, unused slots included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.block
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.block)
    }

    /// Copy `src` into this block, zeroing every slot past the copied ones.
    ///
    /// Both records must have the same shape.
    pub fn copy_from(&mut self, src: &RawRecord) -> Result<()> {
        self.shape.ensure_same(&src.shape)?;
        let required = src.total_bytes()?;
        if self.capacity() < src.count() || self.block.len() < required {
            debug!(required, capacity = self.block.len(), "copy destination too small");
            return Err(FlexError::DestinationTooSmall {
                required,
                capacity: self.block.len(),
            });
        }

        let header = self.shape.header_size();
        self.block[..header].copy_from_slice(src.header());
        copy_and_wipe(self.elements_region_mut(), src.elements());
        trace!(bytes = required, count = src.count(), "copied raw record");
        Ok(())
    }

    /// An exactly-sized duplicate: capacity equals this record's count.
    pub fn try_clone(&self) -> Result<Self> {
        let total = self.total_bytes()?;
        let mut block = try_zeroed_bytes(total)?;
        block.copy_from_slice(&self.block[..total]);
        trace!(bytes = total, "duplicated raw record");
        Ok(Self {
            shape: self.shape,
            block,
        })
    }

    /// Replace the live elements with `count` elements read from `src`.
    pub fn fill_from_bytes(&mut self, src: &[u8], count: impl ElementCount) -> Result<()> {
        self.fill_from_bytes_with(src, count, &Limits::default())
    }

    /// [`RawRecord::fill_from_bytes`] with an explicit sanity ceiling.
    pub fn fill_from_bytes_with(
        &mut self,
        src: &[u8],
        count: impl ElementCount,
        limits: &Limits,
    ) -> Result<()> {
        let (count, bytes) = checked_source(&self.shape, src, count, limits)?;
        if self.capacity() < count {
            let capacity = self.block.len() - self.shape.header_size();
            debug!(count, slots = self.capacity(), "deserialize destination too small");
            return Err(FlexError::DestinationTooSmall {
                required: bytes,
                capacity,
            });
        }
        copy_and_wipe(self.elements_region_mut(), &src[..bytes]);
        self.store_count(count)?;
        trace!(bytes, count, "deserialized into raw record");
        Ok(())
    }

    /// Copy the live element bytes into the front of `dst`, returning the
    /// length written as `W`.
    pub fn write_elements<W: CountField>(&self, dst: &mut [u8]) -> Result<W> {
        self.write_elements_with(dst, &Limits::default())
    }

    /// [`RawRecord::write_elements`] with an explicit sanity ceiling.
    pub fn write_elements_with<W: CountField>(&self, dst: &mut [u8], limits: &Limits) -> Result<W> {
        limits.check(dst.len())?;
        let bytes = self.elements_bytes()?;
        if bytes > dst.len() {
            debug!(required = bytes, capacity = dst.len(), "serialize destination too small");
            return Err(FlexError::DestinationTooSmall {
                required: bytes,
                capacity: dst.len(),
            });
        }
        let len = reported_len::<W>(bytes)?;
        dst[..bytes].copy_from_slice(self.elements());
        Ok(len)
    }

    /// The live element bytes in a new exactly-sized buffer.
    pub fn to_element_bytes(&self) -> Result<Bytes> {
        let bytes = self.elements_bytes()?;
        Limits::default().check(bytes)?;
        let mut buf = try_zeroed_bytes(bytes)?;
        buf.copy_from_slice(self.elements());
        Ok(Bytes::from(buf))
    }

    fn elements_region_mut(&mut self) -> &mut [u8] {
        let start = self.shape.elements_offset();
        &mut self.block[start..]
    }

    fn field_end(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.shape.header_size() => Ok(end),
            end => Err(FlexError::FieldOutOfBounds {
                offset,
                end: end.unwrap_or(usize::MAX),
            }),
        }
    }

    fn store_count(&mut self, count: usize) -> Result<()> {
        let offset = self.shape.count_offset();
        let width = self.shape.count_width();
        let field = &mut self.block[offset..offset + width.bytes()];
        match width {
            CountWidth::U8 => field.copy_from_slice(u8::from_count(count)?.as_bytes()),
            CountWidth::U16 => field.copy_from_slice(u16::from_count(count)?.as_bytes()),
            CountWidth::U32 => field.copy_from_slice(u32::from_count(count)?.as_bytes()),
            CountWidth::U64 => field.copy_from_slice(u64::from_count(count)?.as_bytes()),
        }
        Ok(())
    }
}

impl std::fmt::Debug for RawRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawRecord")
            .field("shape", &self.shape.to_string())
            .field("count", &self.count())
            .field("capacity", &self.capacity())
            .finish()
    }
}

fn load<const N: usize>(field: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(field);
    buf
}

fn checked_source(
    shape: &Shape,
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<(usize, usize)> {
    let count = count.to_count()?;
    let bytes = shape.elements_bytes(count)?;
    limits.check(bytes)?;
    if bytes > src.len() {
        debug!(required = bytes, available = src.len(), "source buffer too short");
        return Err(FlexError::SourceTooShort {
            required: bytes,
            available: src.len(),
        });
    }
    Ok((count, bytes))
}
