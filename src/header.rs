//! The fixed 8-byte entry header.
//!
//! ```text
//! offset  size  field
//!      0     1  header_size    8 + filename_size (informational only)
//!      1     1  padding1       always 0
//!      2     4  content_size   u32 LE
//!      6     1  filename_size
//!      7     1  padding2       always 0
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};

use crate::error::{truncated, Result};

/// Encoded size of a [`Header`] in bytes.
pub const HEADER_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub header_size:   u8,
    pub padding1:      u8,
    pub content_size:  u32,
    pub filename_size: u8,
    pub padding2:      u8,
}

impl Header {
    /// Header for an entry with the given field lengths, `header_size`
    /// derived as `8 + filename_size`.
    pub fn for_sizes(filename_size: u8, content_size: u32) -> Self {
        Self {
            header_size: (HEADER_SIZE as u8).wrapping_add(filename_size),
            padding1: 0,
            content_size,
            filename_size,
            padding2: 0,
        }
    }

    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u8(self.header_size)?;
        writer.write_u8(self.padding1)?;
        writer.write_u32::<LittleEndian>(self.content_size)?;
        writer.write_u8(self.filename_size)?;
        writer.write_u8(self.padding2)?;
        Ok(())
    }

    /// Read one header.  Returns `Ok(None)` when the stream is exhausted
    /// before the first byte, and `Truncated` when it ends anywhere after.
    pub fn read<R: Read>(mut reader: R) -> Result<Option<Self>> {
        let header_size = match read_first_byte(&mut reader)? {
            Some(b) => b,
            None    => return Ok(None),
        };
        Ok(Some(Self {
            header_size,
            padding1:      reader.read_u8().map_err(truncated("header"))?,
            content_size:  reader.read_u32::<LittleEndian>().map_err(truncated("header"))?,
            filename_size: reader.read_u8().map_err(truncated("header"))?,
            padding2:      reader.read_u8().map_err(truncated("header"))?,
        }))
    }
}

fn read_first_byte<R: Read>(reader: &mut R) -> io::Result<Option<u8>> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
