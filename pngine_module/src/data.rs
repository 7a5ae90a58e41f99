//! The data blob table section: `count: u16` then `count` entries of
//! `{length: u32, bytes[length]}`. Carries shader source, descriptor
//! encodings, and literal vertex/index arrays, addressed by dense 16-bit ID.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone)]
pub struct DataTable<'a> {
    offsets: Vec<(usize, usize)>,
    buf: &'a [u8],
}

impl<'a> DataTable<'a> {
    pub fn parse(section: &'a [u8]) -> Result<DataTable<'a>> {
        if section.len() < 2 {
            return Err(Error::UnexpectedEof);
        }
        let count = LittleEndian::read_u16(&section[0..2]);
        let mut offsets = Vec::with_capacity(count as usize);
        let mut pos = 2usize;
        for _ in 0..count {
            if pos + 4 > section.len() {
                return Err(Error::UnexpectedEof);
            }
            let length = LittleEndian::read_u32(&section[pos..pos + 4]) as usize;
            pos += 4;
            if pos + length > section.len() {
                return Err(Error::UnexpectedEof);
            }
            offsets.push((pos, length));
            pos += length;
        }
        Ok(DataTable {
            offsets,
            buf: section,
        })
    }

    pub fn len(&self) -> u16 {
        self.offsets.len() as u16
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn get(&self, id: u16) -> Result<&'a [u8]> {
        let (start, length) = *self
            .offsets
            .get(id as usize)
            .ok_or(Error::DataIdOutOfRange(id, self.len()))?;
        Ok(&self.buf[start..start + length])
    }
}

/// Serialize `blobs` (in ID order) into the data table section layout.
pub fn write_data_table(out: &mut Vec<u8>, blobs: &[&[u8]]) -> Result<()> {
    let count: u16 = blobs
        .len()
        .try_into()
        .map_err(|_| Error::InvalidModule("more than 65535 data blobs"))?;
    out.extend_from_slice(&count.to_le_bytes());
    for blob in blobs {
        let length: u32 = blob
            .len()
            .try_into()
            .map_err(|_| Error::InvalidModule("data blob larger than 4 GiB"))?;
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(blob);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_several_blobs() {
        let blobs: Vec<&[u8]> = vec![b"shader source", b"\x01\x02\x03", &[]];
        let mut buf = Vec::new();
        write_data_table(&mut buf, &blobs).unwrap();
        let table = DataTable::parse(&buf).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(0).unwrap(), b"shader source");
        assert_eq!(table.get(1).unwrap(), b"\x01\x02\x03");
        assert_eq!(table.get(2).unwrap(), b"" as &[u8]);
    }

    #[test]
    fn out_of_range_id_is_an_error() {
        let mut buf = Vec::new();
        write_data_table(&mut buf, &[b"x"]).unwrap();
        let table = DataTable::parse(&buf).unwrap();
        assert_eq!(table.get(9).unwrap_err(), Error::DataIdOutOfRange(9, 1));
    }
}
