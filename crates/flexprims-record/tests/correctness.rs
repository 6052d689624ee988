//! End-to-end behavior of every record operation, exercised through the
//! public API only.

use flexprims_record::{
    bytes_to_record, bytes_to_record_alloc, copy, duplicate, duplicate_into, record_to_bytes,
    record_to_bytes_alloc, CountWidth, Encapsulated, ErrorKind, FlexError, FlexRecord, Limits,
    RawRecord, Shape,
};
use proptest::prelude::*;

const MAGIC1: u32 = 0xAAAA_AAAA;
const MAGIC2: u32 = 0x5555_5555;

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Default,
    zerocopy::FromZeros,
    zerocopy::IntoBytes,
    zerocopy::Immutable,
)]
#[repr(C)]
struct Header {
    version: u32,
    flags: u32,
}

#[derive(Debug, PartialEq, Eq, zerocopy::FromZeros)]
struct Outer {
    id: u64,
    state: u32,
}

type Rec = FlexRecord<Header, u32, u32>;

fn magic_record(count: usize) -> Rec {
    let mut elements = vec![MAGIC1; count];
    if let Some(last) = elements.last_mut() {
        *last = MAGIC2;
    }
    Rec::from_elements(Header { version: 1, flags: 0x10 }, elements).unwrap()
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

#[test]
fn test_copy_shrink_then_retry() {
    let mut src = magic_record(12);
    let mut dst = Rec::zeroed(10).unwrap();
    let before = Rec::zeroed(10).unwrap();

    let err = copy(&mut dst, &src).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooBig);
    assert_eq!(dst, before);
    assert_eq!(dst.capacity(), 10);

    src.set_count(10).unwrap();
    copy(&mut dst, &src).unwrap();
    assert_eq!(dst.count(), 10);
    assert_eq!(dst.elements(), &src.elements()[..10]);
    assert_eq!(dst.header(), src.header());
    // Shrinking src's count hid its trailing MAGIC2.
    assert!(dst.iter().all(|&e| e == MAGIC1));
}

#[test]
fn test_copy_destroys_longer_destination() {
    let mut dst = magic_record(8);
    let src = magic_record(3);
    copy(&mut dst, &src).unwrap();
    assert_eq!(dst.elements(), &[MAGIC1, MAGIC1, MAGIC2]);

    dst.set_count(8).unwrap();
    assert_eq!(&dst.elements()[3..], &[0; 5]);
}

#[test]
fn test_duplicate_and_encapsulate() {
    let src = magic_record(4);

    let mut slot = None;
    duplicate(&mut slot, &src).unwrap();
    let dup = slot.take().unwrap();
    assert_eq!(dup, src);
    assert_eq!(dup.capacity(), 4);

    let mut encap: Option<Encapsulated<Outer, Header, u32, u32>> = None;
    duplicate_into(&mut encap, &src).unwrap();
    let encap = encap.unwrap();
    assert_eq!(*encap.outer(), Outer { id: 0, state: 0 });
    assert_eq!(encap.record(), &src);
    assert_eq!(
        encap.total_bytes().unwrap(),
        Encapsulated::<Outer, Header, u32, u32>::SHAPE.embedded_offset() + 12 + 16
    );

    let wrapped = Encapsulated::<Outer, _, _, _>::try_wrap(&src).unwrap();
    assert_eq!(wrapped.record().elements(), src.elements());
}

#[test]
fn test_duplicate_into_populated_slot_is_invalid() {
    let src = magic_record(2);
    let mut slot = Some(magic_record(1));
    let err = duplicate(&mut slot, &src).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.errno(), FlexError::SlotOccupied.errno());
    assert_eq!(slot.unwrap().count(), 1);
}

#[test]
fn test_deserialize_rejections_leave_slot_empty() {
    let src = words(&[1, 2, 3]);
    let mut slot: Option<Rec> = None;

    for err in [
        bytes_to_record_alloc(&mut slot, &src, -1i64).unwrap_err(),
        bytes_to_record_alloc(&mut slot, &src, 4).unwrap_err(),
        bytes_to_record_alloc(&mut slot, &src, u64::MAX).unwrap_err(),
    ] {
        assert_eq!(err.kind(), ErrorKind::TooBig);
    }
    assert!(slot.is_none());

    bytes_to_record_alloc(&mut slot, &src, 3).unwrap();
    let rec = slot.unwrap();
    assert_eq!(rec.elements(), &[1, 2, 3]);
    assert_eq!(*rec.header(), Header::default());
}

#[test]
fn test_deserialize_then_serialize() {
    let src = words(&[7, 8, 9, 10]);
    let mut rec = Rec::zeroed(6).unwrap();
    bytes_to_record(&mut rec, &src, 4).unwrap();

    let mut out = vec![0u8; 16];
    let len: u16 = record_to_bytes(&mut out, &rec).unwrap();
    assert_eq!(len, 16);
    assert_eq!(out, src);

    let mut short = vec![0xCCu8; 15];
    let err = record_to_bytes::<u16, _, _, _>(&mut short, &rec).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TooBig);
    assert!(short.iter().all(|&b| b == 0xCC));
    assert_eq!(rec.elements(), &[7, 8, 9, 10]);

    let mut slot = None;
    let len: u8 = record_to_bytes_alloc(&mut slot, &rec).unwrap();
    assert_eq!(usize::from(len), slot.unwrap().len());
}

#[test]
fn test_ceiling_is_configurable() {
    let src = words(&[1; 8]);
    let mut rec = Rec::zeroed(8).unwrap();
    let limits = Limits::with_ceiling(16);
    assert!(matches!(
        flexprims_record::bytes_to_record_with(&mut rec, &src, 8, &limits),
        Err(FlexError::AboveCeiling { size: 32, ceiling: 16 })
    ));
    assert!(flexprims_record::bytes_to_record_with(&mut rec, &src, 4, &limits).is_ok());
}

#[test]
fn test_raw_and_typed_agree() {
    let typed = magic_record(5);
    let raw = RawRecord::from_typed(&typed).unwrap();
    let shape = Shape::new(8, CountWidth::U32, 12, 4, 4).unwrap();
    assert_eq!(raw.shape(), &shape);
    assert_eq!(raw.total_bytes().unwrap(), typed.total_bytes().unwrap());

    let mut out = [0u8; 20];
    let len: u32 = raw.write_elements(&mut out).unwrap();
    assert_eq!(len, 20);
    assert_eq!(&out[..], typed.element_bytes());

    let adopted = RawRecord::from_block(shape, raw.as_bytes().to_vec()).unwrap();
    assert_eq!(adopted.count(), 5);
    assert_eq!(adopted, raw);
}

proptest! {
    #[test]
    fn prop_copy_preserves_prefix_and_zeroes_tail(
        src_elems in proptest::collection::vec(any::<u32>(), 0..32),
        extra in 0usize..16,
        fill in any::<u32>(),
    ) {
        let src = Rec::from_elements(Header::default(), src_elems.clone()).unwrap();
        let capacity = src_elems.len() + extra;
        let header = Header { version: 9, flags: 9 };
        let mut dst = Rec::from_elements(header, vec![fill; capacity]).unwrap();

        copy(&mut dst, &src).unwrap();
        prop_assert_eq!(dst.count(), src.count());
        prop_assert_eq!(dst.capacity(), capacity);
        prop_assert_eq!(dst.elements(), src_elems.as_slice());

        dst.set_count(capacity).unwrap();
        prop_assert!(dst.elements()[src_elems.len()..].iter().all(|&e| e == 0));
    }

    #[test]
    fn prop_undersized_copy_never_mutates(
        src_len in 1usize..32,
        short_by in 1usize..8,
    ) {
        let src = Rec::from_elements(Header::default(), vec![MAGIC1; src_len]).unwrap();
        let capacity = src_len.saturating_sub(short_by);
        let header = Header { version: 3, flags: 3 };
        let mut dst = Rec::from_elements(header, vec![MAGIC2; capacity]).unwrap();

        let err = copy(&mut dst, &src).unwrap_err();
        let is_too_small = matches!(err, FlexError::DestinationTooSmall { .. });
        prop_assert!(is_too_small);
        prop_assert_eq!(dst.header().version, 3);
        prop_assert!(dst.elements().iter().all(|&e| e == MAGIC2));
    }
}
