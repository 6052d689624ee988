//! Overflow-checked size arithmetic and shape descriptors for flexible records.
//!
//! A flexible record is a fixed header holding an element count, followed by
//! a run of same-typed elements whose length depends on that count. This is
//! the lowest layer of flexprims: every byte count the other crates use is
//! computed here, and every failure is reported through [`FlexError`].
//!
//! - [`size`]: checked multiply/add producing byte counts
//! - [`count`]: count-field widths and requested element counts
//! - [`shape`]: record descriptors (offsets and widths)
//! - [`config`]: the sanity ceiling applied at buffer boundaries

pub mod config;
pub mod count;
pub mod error;
pub mod shape;
pub mod size;

pub use config::{Limits, DEFAULT_SANITY_CEILING};
pub use count::{CountField, ElementCount};
pub use error::{ErrorKind, FlexError, Result};
pub use shape::{CountWidth, EncapShape, Shape};
pub use size::{align_up, elements_bytes, total_bytes};
pub use zerocopy;

/// Plain-data element types a flexible record can carry.
///
/// Elements are moved as raw bytes, so they must have no padding, accept
/// any bit pattern, and be valid when zeroed.
pub trait Element:
    zerocopy::FromBytes + zerocopy::IntoBytes + zerocopy::Immutable + Copy
{
}

impl<T> Element for T where
    T: zerocopy::FromBytes + zerocopy::IntoBytes + zerocopy::Immutable + Copy
{
}
