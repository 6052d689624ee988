//! Overflow-safe handling of flexible records.
//!
//! A flexible record is a fixed header holding an element count, followed by
//! a data-dependent run of same-typed elements. flexprims copies, duplicates,
//! and (de)serializes such records with every size checked up front and no
//! stale trailing data left behind.
//!
//! # Crate Structure
//!
//! - [`layout`]: Size arithmetic, count fields, shape descriptors, limits
//! - [`record`]: Typed and raw records and the operations on them
//!
//! ```
//! use flexprims::record::{copy, FlexRecord};
//!
//! let src = FlexRecord::<u32, u16, u8>::from_elements(7, vec![1, 2, 3]).unwrap();
//! let mut dst = FlexRecord::<u32, u16, u8>::zeroed(8).unwrap();
//! copy(&mut dst, &src).unwrap();
//! assert_eq!(dst.elements(), &[1, 2, 3]);
//! ```

/// Re-export layout types.
pub mod layout {
    pub use flexprims_layout::*;
}

/// Re-export record types and operations.
pub mod record {
    pub use flexprims_record::*;
}
