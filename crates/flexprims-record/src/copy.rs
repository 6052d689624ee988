use flexprims_layout::{CountField, Element, FlexError, Result};
use tracing::{debug, trace};
use zerocopy::IntoBytes;

use crate::record::FlexRecord;

/// Copy `src` into the preallocated record `dst`.
///
/// The header is copied, then the live elements, then every slot of `dst`
/// past the copied elements is zeroed. `dst`'s count becomes `src`'s count.
///
/// Fails with `DestinationTooSmall` if `dst` owns fewer slots than `src` has
/// live elements. On failure `dst` is left exactly as it was.
pub fn copy<H, E, C>(dst: &mut FlexRecord<H, E, C>, src: &FlexRecord<H, E, C>) -> Result<()>
where
    H: Clone,
    E: Element,
    C: CountField,
{
    let required = src.total_bytes()?;
    let capacity = dst.capacity_bytes()?;
    if dst.capacity() < src.count() || capacity < required {
        debug!(required, capacity, "copy destination too small");
        return Err(FlexError::DestinationTooSmall { required, capacity });
    }

    dst.header.clone_from(&src.header);
    copy_and_wipe(dst.slots.as_mut_bytes(), src.elements().as_bytes());
    dst.count = src.count;
    trace!(bytes = required, count = src.count(), "copied flexible record");
    Ok(())
}

/// Copy `src` to the front of `dst` and zero the rest of `dst`.
///
/// Callers have already checked `src.len() <= dst.len()`.
pub(crate) fn copy_and_wipe(dst: &mut [u8], src: &[u8]) {
    let (head, tail) = dst.split_at_mut(src.len());
    head.copy_from_slice(src);
    tail.fill(0);
}
