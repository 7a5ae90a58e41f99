//! Unsigned LEB128 varint encoding for opcode operands, grounded on the
//! `write_u64_as_uleb128`/`read_uleb128_as_u64` pattern used by binary
//! module formats that interleave fixed-width fields with variable-length
//! indices: 7-bit little-endian groups, high bit set on every byte but the
//! last.

use crate::error::{Error, Result};

/// Append `val` to `out` as an unsigned LEB128 varint.
pub fn write_uleb128(out: &mut Vec<u8>, mut val: u64) {
    loop {
        let low7 = (val & 0x7f) as u8;
        val >>= 7;
        if val == 0 {
            out.push(low7);
            break;
        }
        out.push(low7 | 0x80);
    }
}

/// Decode an unsigned LEB128 varint from the start of `data`, returning the
/// decoded value and the number of bytes consumed. Rejects encodings wider
/// than 64 bits and values that overflow `u32` (the only operand width the
/// opcode set uses).
pub fn read_uleb128_u32(data: &[u8]) -> Result<(u32, usize)> {
    let (value, consumed) = read_uleb128_u64(data)?;
    let value: u32 = value.try_into().map_err(|_| Error::VarintOverflow)?;
    Ok((value, consumed))
}

/// Decode an unsigned LEB128 varint from the start of `data` into a `u64`.
pub fn read_uleb128_u64(data: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift: u32 = 0;
    for (consumed, &byte) in data.iter().enumerate() {
        let low7 = (byte & 0x7f) as u64;
        if shift >= u64::BITS || (low7 << shift) >> shift != low7 {
            return Err(Error::VarintOverflow);
        }
        value |= low7 << shift;
        if byte & 0x80 == 0 {
            return Ok((value, consumed + 1));
        }
        shift += 7;
    }
    Err(Error::VarintTruncated)
}
