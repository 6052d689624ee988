//! Populate records from caller-supplied byte buffers.
//!
//! The element count always comes from the caller, never from the buffer.
//! Every request is checked in the same order before any byte moves:
//!
//! 1. the count is non-negative and fits the record's count field
//! 2. the implied byte length does not overflow
//! 3. the byte length is within the sanity ceiling
//! 4. the source slice holds at least that many bytes
//!
//! Only the first `count * size_of::<E>()` bytes of the source are read.

use std::mem::size_of;

use flexprims_layout::{
    elements_bytes, CountField, Element, ElementCount, FlexError, Limits, Result,
};
use tracing::{debug, trace};
use zerocopy::{FromZeros, IntoBytes};

use crate::copy::copy_and_wipe;
use crate::dup::ensure_vacant;
use crate::encap::Encapsulated;
use crate::record::FlexRecord;

/// Fill the preallocated record `dst` with `count` elements read from `src`.
///
/// Slots of `dst` past the new count are zeroed. Uses the default
/// [`Limits`]; see [`bytes_to_record_with`].
pub fn bytes_to_record<H, E, C>(
    dst: &mut FlexRecord<H, E, C>,
    src: &[u8],
    count: impl ElementCount,
) -> Result<()>
where
    E: Element,
    C: CountField,
{
    bytes_to_record_with(dst, src, count, &Limits::default())
}

/// [`bytes_to_record`] with an explicit sanity ceiling.
pub fn bytes_to_record_with<H, E, C>(
    dst: &mut FlexRecord<H, E, C>,
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<()>
where
    E: Element,
    C: CountField,
{
    let (count, bytes) = checked_source::<E, C>(src, count, limits)?;
    if dst.capacity() < count {
        let capacity = dst.capacity().saturating_mul(size_of::<E>());
        debug!(count, slots = dst.capacity(), "deserialize destination too small");
        return Err(FlexError::DestinationTooSmall {
            required: bytes,
            capacity,
        });
    }
    let field = C::from_count(count)?;

    copy_and_wipe(dst.slots.as_mut_bytes(), &src[..bytes]);
    dst.count = field;
    trace!(bytes, count, "deserialized into flexible record");
    Ok(())
}

/// Allocate a record sized exactly for `count` elements read from `src` and
/// store it in `slot`. The header is zeroed.
///
/// Nothing is allocated unless every check passes; on failure `slot` is
/// left as it was.
pub fn bytes_to_record_alloc<H, E, C>(
    slot: &mut Option<FlexRecord<H, E, C>>,
    src: &[u8],
    count: impl ElementCount,
) -> Result<()>
where
    H: FromZeros,
    E: Element,
    C: CountField,
{
    bytes_to_record_alloc_with(slot, src, count, &Limits::default())
}

/// [`bytes_to_record_alloc`] with an explicit sanity ceiling.
pub fn bytes_to_record_alloc_with<H, E, C>(
    slot: &mut Option<FlexRecord<H, E, C>>,
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<()>
where
    H: FromZeros,
    E: Element,
    C: CountField,
{
    ensure_vacant(slot)?;
    *slot = Some(record_from_bytes(src, count, limits)?);
    Ok(())
}

/// Like [`bytes_to_record_alloc`], but the new record is embedded in an
/// encapsulating structure whose outer fields are zeroed.
pub fn bytes_to_encapsulated_alloc<O, H, E, C>(
    slot: &mut Option<Encapsulated<O, H, E, C>>,
    src: &[u8],
    count: impl ElementCount,
) -> Result<()>
where
    O: FromZeros,
    H: FromZeros,
    E: Element,
    C: CountField,
{
    bytes_to_encapsulated_alloc_with(slot, src, count, &Limits::default())
}

/// [`bytes_to_encapsulated_alloc`] with an explicit sanity ceiling.
pub fn bytes_to_encapsulated_alloc_with<O, H, E, C>(
    slot: &mut Option<Encapsulated<O, H, E, C>>,
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<()>
where
    O: FromZeros,
    H: FromZeros,
    E: Element,
    C: CountField,
{
    ensure_vacant(slot)?;
    let (count, _) = checked_source::<E, C>(src, count, limits)?;
    Encapsulated::<O, H, E, C>::SHAPE.total_bytes(count)?;
    let record = record_from_bytes(src, count, limits)?;
    *slot = Some(Encapsulated::new(O::new_zeroed(), record));
    Ok(())
}

pub(crate) fn record_from_bytes<H, E, C>(
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<FlexRecord<H, E, C>>
where
    H: FromZeros,
    E: Element,
    C: CountField,
{
    let (count, bytes) = checked_source::<E, C>(src, count, limits)?;
    let field = C::from_count(count)?;
    let mut record = FlexRecord::<H, E, C>::zeroed(count)?;

    record.slots.as_mut_bytes()[..bytes].copy_from_slice(&src[..bytes]);
    record.count = field;
    trace!(bytes, count, "allocated flexible record from bytes");
    Ok(record)
}

/// Validate a request for `count` elements of `E` from `src`, returning the
/// count and its byte length.
fn checked_source<E: Element, C: CountField>(
    src: &[u8],
    count: impl ElementCount,
    limits: &Limits,
) -> Result<(usize, usize)> {
    let count = count.to_count().inspect_err(|err| {
        debug!(?count, %err, "rejected element count");
    })?;
    let bytes = elements_bytes(count, size_of::<E>(), C::MAX).inspect_err(|err| {
        debug!(count, max = C::MAX, %err, "element byte length not computable");
    })?;
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
