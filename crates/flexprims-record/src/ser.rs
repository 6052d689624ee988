//! Write a record's elements out as raw bytes.
//!
//! Only the element region is written: header and count stay behind, so the
//! output is exactly `count * size_of::<E>()` bytes. The reported length is
//! returned in a caller-chosen [`CountField`] type and is checked to fit
//! before anything is copied.

use bytes::{BufMut, Bytes, BytesMut};
use flexprims_layout::{CountField, Element, FlexError, Limits, Result};
use tracing::{debug, trace};

use crate::dup::{ensure_vacant, try_zeroed_bytes};
use crate::record::FlexRecord;

/// Copy the live elements of `src` into the front of `dst`.
///
/// Returns the number of bytes written as `W`. Fails without writing if
/// `dst` is larger than the sanity ceiling, too small for the elements, or
/// the length does not fit in `W`.
pub fn record_to_bytes<W, H, E, C>(dst: &mut [u8], src: &FlexRecord<H, E, C>) -> Result<W>
where
    W: CountField,
    E: Element,
    C: CountField,
{
    record_to_bytes_with(dst, src, &Limits::default())
}

/// [`record_to_bytes`] with an explicit sanity ceiling.
pub fn record_to_bytes_with<W, H, E, C>(
    dst: &mut [u8],
    src: &FlexRecord<H, E, C>,
    limits: &Limits,
) -> Result<W>
where
    W: CountField,
    E: Element,
    C: CountField,
{
    limits.check(dst.len())?;
    let bytes = src.elements_bytes()?;
    if bytes > dst.len() {
        debug!(required = bytes, capacity = dst.len(), "serialize destination too small");
        return Err(FlexError::DestinationTooSmall {
            required: bytes,
            capacity: dst.len(),
        });
    }
    let len = reported_len::<W>(bytes)?;

    dst[..bytes].copy_from_slice(src.element_bytes());
    trace!(bytes, count = src.count(), "serialized flexible record");
    Ok(len)
}

/// Serialize the live elements of `src` into an exactly-sized buffer stored
/// in `slot`, returning its length as `W`.
pub fn record_to_bytes_alloc<W, H, E, C>(
    slot: &mut Option<Bytes>,
    src: &FlexRecord<H, E, C>,
) -> Result<W>
where
    W: CountField,
    E: Element,
    C: CountField,
{
    record_to_bytes_alloc_with(slot, src, &Limits::default())
}

/// [`record_to_bytes_alloc`] with an explicit sanity ceiling.
pub fn record_to_bytes_alloc_with<W, H, E, C>(
    slot: &mut Option<Bytes>,
    src: &FlexRecord<H, E, C>,
    limits: &Limits,
) -> Result<W>
where
    W: CountField,
    E: Element,
    C: CountField,
{
    ensure_vacant(slot)?;
    let len = reported_len::<W>(src.elements_bytes()?)?;
    *slot = Some(elements_to_bytes(src, limits)?);
    Ok(len)
}

/// Append the live elements of `src` to `dst`, returning the byte count.
pub fn record_to_buf<H, E, C>(dst: &mut BytesMut, src: &FlexRecord<H, E, C>) -> Result<usize>
where
    E: Element,
    C: CountField,
{
    let bytes = src.elements_bytes()?;
    Limits::default().check(bytes)?;
    dst.reserve(bytes);
    dst.put_slice(src.element_bytes());
    Ok(bytes)
}

pub(crate) fn elements_to_bytes<H, E, C>(src: &FlexRecord<H, E, C>, limits: &Limits) -> Result<Bytes>
where
    E: Element,
    C: CountField,
{
    let bytes = src.elements_bytes()?;
    limits.check(bytes)?;
    let mut buf = try_zeroed_bytes(bytes)?;
    buf.copy_from_slice(src.element_bytes());
    trace!(bytes, count = src.count(), "serialized flexible record into new buffer");
    Ok(Bytes::from(buf))
}

/// `bytes` as the caller's length type.
pub(crate) fn reported_len<W: CountField>(bytes: usize) -> Result<W> {
    W::from_count(bytes).map_err(|_| {
        debug!(len = bytes, bits = W::BITS, "serialized length not representable");
        FlexError::LengthUnrepresentable {
            len: bytes,
            bits: W::BITS,
        }
    })
}
