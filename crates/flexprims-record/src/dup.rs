//! Allocate-and-copy for plain and encapsulated records.
//!
//! Each operation makes at most one allocation request, sized exactly for
//! the source's live elements. Failures leave the output slot untouched.

use std::mem::size_of;

use flexprims_layout::{CountField, Element, FlexError, Result};
use tracing::{debug, trace};
use zerocopy::FromZeros;

use crate::encap::Encapsulated;
use crate::record::FlexRecord;

/// Copy `src` into a freshly allocated record stored in `slot`.
///
/// The new record's capacity equals `src.count()`.
///
/// Failure modes:
/// - `slot` already holds a record (`SlotOccupied`).
/// - The required size overflows (`TooBig` kinds).
/// - The allocator refuses the request (`OutOfMemory`).
pub fn duplicate<H, E, C>(
    slot: &mut Option<FlexRecord<H, E, C>>,
    src: &FlexRecord<H, E, C>,
) -> Result<()>
where
    H: Clone,
    E: Element,
    C: CountField,
{
    ensure_vacant(slot)?;
    *slot = Some(duplicate_record(src)?);
    Ok(())
}

/// Copy `src` into the record embedded in a freshly allocated encapsulating
/// structure stored in `slot`. Outer fields are zeroed.
pub fn duplicate_into<O, H, E, C>(
    slot: &mut Option<Encapsulated<O, H, E, C>>,
    src: &FlexRecord<H, E, C>,
) -> Result<()>
where
    O: FromZeros,
    H: Clone,
    E: Element,
    C: CountField,
{
    ensure_vacant(slot)?;
    *slot = Some(encapsulate_record(src)?);
    Ok(())
}

/// An exactly-sized duplicate of `src` behind zeroed outer fields.
pub(crate) fn encapsulate_record<O, H, E, C>(
    src: &FlexRecord<H, E, C>,
) -> Result<Encapsulated<O, H, E, C>>
where
    O: FromZeros,
    H: Clone,
    E: Element,
    C: CountField,
{
    let bytes = Encapsulated::<O, H, E, C>::SHAPE.total_bytes(src.count())?;
    let record = duplicate_record(src)?;
    trace!(bytes, "duplicated into encapsulating record");
    Ok(Encapsulated::new(O::new_zeroed(), record))
}

pub(crate) fn duplicate_record<H, E, C>(src: &FlexRecord<H, E, C>) -> Result<FlexRecord<H, E, C>>
where
    H: Clone,
    E: Element,
    C: CountField,
{
    let count = src.count();
    let bytes = FlexRecord::<H, E, C>::SHAPE.total_bytes(count)?;
    let mut slots = try_zeroed_slots::<E>(count)?;
    slots.copy_from_slice(src.elements());
    trace!(bytes, count, "duplicated flexible record");
    Ok(FlexRecord {
        header: src.header.clone(),
        count: src.count,
        slots,
    })
}

pub(crate) fn ensure_vacant<T>(slot: &Option<T>) -> Result<()> {
    if slot.is_some() {
        debug!("output slot already populated");
        return Err(FlexError::SlotOccupied);
    }
    Ok(())
}

/// Allocate `capacity` zeroed element slots, reporting allocator failure.
pub(crate) fn try_zeroed_slots<E: Element>(capacity: usize) -> Result<Vec<E>> {
    let bytes = capacity
        .checked_mul(size_of::<E>())
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(FlexError::ArithmeticOverflow)?;
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity).map_err(|_| {
        debug!(bytes, "element allocation failed");
        FlexError::OutOfMemory { bytes }
    })?;
    slots.resize(capacity, E::new_zeroed());
    Ok(slots)
}

/// Allocate `len` zeroed bytes, reporting allocator failure.
pub(crate) fn try_zeroed_bytes(len: usize) -> Result<Vec<u8>> {
    try_zeroed_slots::<u8>(len)
}
