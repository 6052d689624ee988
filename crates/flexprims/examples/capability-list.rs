//! Capability list: decode a device's codec list into a flexible record.
//!
//! A device answers a capability query with a bare run of 32-bit codec
//! identifiers; the caller learns the count separately. This example
//! allocates an exact-size record for the reply, copies it into a fixed
//! cache slot, and serializes it back out.
//!
//! Usage:
//!   cargo run --example capability-list

use flexprims::record::{
    bytes_to_record_alloc, copy, record_to_bytes_alloc, ErrorKind, FlexRecord, Result,
};

#[derive(Debug, Clone, Default, zerocopy::FromZeros)]
struct CapsHeader {
    vendor_id: u32,
    flags: u32,
}

type CapsList = FlexRecord<CapsHeader, u32, u32>;

const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_le_bytes(*code)
}

fn device_reply() -> (Vec<u8>, usize) {
    let codecs = [fourcc(b"H264"), fourcc(b"HEVC"), fourcc(b"VP90"), fourcc(b"AV01")];
    let bytes = codecs.iter().flat_map(|c| c.to_ne_bytes()).collect();
    (bytes, codecs.len())
}

fn main() -> Result<()> {
    let (reply, count) = device_reply();

    let mut slot: Option<CapsList> = None;
    bytes_to_record_alloc(&mut slot, &reply, count)?;
    let Some(mut caps) = slot else {
        return Ok(());
    };
    caps.header_mut().vendor_id = 0x1af4;
    println!(
        "decoded {} codecs ({} bytes)",
        caps.count(),
        caps.total_bytes()?
    );

    // A cache sized for two entries cannot take the full list.
    let mut small = CapsList::zeroed(2)?;
    match copy(&mut small, &caps) {
        Err(err) if err.kind() == ErrorKind::TooBig => println!("cache too small: {err}"),
        other => other?,
    }

    let mut cache = CapsList::zeroed(8)?;
    copy(&mut cache, &caps)?;
    for code in &cache {
        println!("  {}", String::from_utf8_lossy(&code.to_le_bytes()));
    }

    caps.truncate(2);
    let mut wire = None;
    let len: u16 = record_to_bytes_alloc(&mut wire, &caps)?;
    println!("re-serialized {len} bytes for the first two codecs");
    Ok(())
}
