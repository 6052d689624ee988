//! Bounds-checked operations on flexible records.
//!
//! A flexible record is a header with an element count followed by a run of
//! elements. This crate moves such records around without ever trusting a
//! size it has not checked:
//!
//! - [`copy()`]: into a preallocated record, zeroing the unused tail
//! - [`duplicate`] / [`duplicate_into`]: allocate an exact-size copy
//! - [`bytes_to_record`] / [`bytes_to_record_alloc`]: fill from a buffer
//! - [`record_to_bytes`] / [`record_to_bytes_alloc`]: write elements out
//!
//! Typed records ([`FlexRecord`]) get their layout from generic parameters;
//! [`RawRecord`] carries a runtime [`Shape`] and keeps header, count, and
//! elements in one block. All failures are [`FlexError`]s and leave the
//! destination untouched.

pub mod copy;
pub mod de;
pub mod dup;
pub mod encap;
pub mod raw;
pub mod record;
pub mod ser;

pub use copy::copy;
pub use de::{
    bytes_to_encapsulated_alloc, bytes_to_encapsulated_alloc_with, bytes_to_record,
    bytes_to_record_alloc, bytes_to_record_alloc_with, bytes_to_record_with,
};
pub use dup::{duplicate, duplicate_into};
pub use encap::Encapsulated;
pub use flexprims_layout::{
    CountField, CountWidth, Element, ElementCount, ErrorKind, FlexError, Limits, Result, Shape,
};
pub use raw::RawRecord;
pub use record::FlexRecord;
pub use ser::{
    record_to_buf, record_to_bytes, record_to_bytes_alloc, record_to_bytes_alloc_with,
    record_to_bytes_with,
};
