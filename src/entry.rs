//! A single STAR entry: header, filename, content and SHA-1 digest.
//!
//! On disk each entry is laid out as
//!
//! ```text
//! [ header (8 B) | filename (filename_size B) | content (content_size B) | sha1 (20 B) ]
//! ```
//!
//! Entries are concatenated with nothing in between; there is no archive
//! header, footer or entry count.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{truncated, Result, StarError};
use crate::hashing::{sha1, Digest, HashingReader, DIGEST_SIZE};
use crate::header::{Header, HEADER_SIZE};
use crate::summary::EntrySummary;

/// Longest filename the one-byte `filename_size` field can describe.
pub const MAX_FILENAME_SIZE: usize = u8::MAX as usize;

/// Upper bound on the up-front allocation for an entry's content; larger
/// entries grow the buffer as bytes actually arrive.
const MAX_PREALLOC: usize = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    header:   Header,
    filename: Vec<u8>,
    content:  Vec<u8>,
    digest:   Digest,
}

impl Entry {
    // ── Construction ─────────────────────────────────────────────────────────

    /// Build an entry from in-memory content.  `filename` is stored as given
    /// (raw bytes, not necessarily UTF-8) and should already use `/`
    /// separators.
    pub fn new(filename: impl Into<Vec<u8>>, content: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        check_filename(&filename)?;
        let content_size = u32::try_from(content.len())
            .map_err(|_| too_large(&filename))?;
        let digest = sha1(&content);
        Ok(Self {
            header: Header::for_sizes(filename.len() as u8, content_size),
            filename,
            content,
            digest,
        })
    }

    /// Build an entry by draining `reader`, hashing the content as it is read.
    pub fn from_reader<R: Read>(filename: impl Into<Vec<u8>>, reader: R) -> Result<Self> {
        let filename = filename.into();
        check_filename(&filename)?;

        // One byte past the limit is enough to tell that the source is too big.
        let limit = u64::from(u32::MAX) + 1;
        let mut hashing = HashingReader::new(reader.take(limit));
        let mut content = Vec::new();
        hashing.read_to_end(&mut content)?;

        let content_size = u32::try_from(content.len())
            .map_err(|_| too_large(&filename))?;
        let digest = hashing.digest();
        Ok(Self {
            header: Header::for_sizes(filename.len() as u8, content_size),
            filename,
            content,
            digest,
        })
    }

    /// Build an entry from the file at `path`, stored under `filename`.
    pub fn from_file<P: AsRef<Path>>(path: P, filename: impl Into<Vec<u8>>) -> Result<Self> {
        let filename = filename.into();
        // Reject before touching the file.
        check_filename(&filename)?;
        let file = File::open(path.as_ref())?;
        // The read limit in `from_reader` still applies if the file grows.
        if file.metadata()?.len() > u64::from(u32::MAX) {
            return Err(too_large(&filename));
        }
        Self::from_reader(filename, io::BufReader::new(file))
    }

    // ── Codec ────────────────────────────────────────────────────────────────

    /// Decode one entry.  `Ok(None)` means the stream ended cleanly on an
    /// entry boundary.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Option<Self>> {
        let header = match Header::read(&mut reader)? {
            Some(h) => h,
            None    => return Ok(None),
        };

        let mut filename = vec![0u8; usize::from(header.filename_size)];
        reader.read_exact(&mut filename).map_err(truncated("filename"))?;

        let content_size = header.content_size as usize;
        let mut hashing = HashingReader::new((&mut reader).take(u64::from(header.content_size)));
        let mut content = Vec::with_capacity(content_size.min(MAX_PREALLOC));
        hashing.read_to_end(&mut content)?;
        if content.len() != content_size {
            return Err(StarError::Truncated { field: "content" });
        }
        let actual = hashing.digest();

        let mut digest = [0u8; DIGEST_SIZE];
        reader.read_exact(&mut digest).map_err(truncated("digest"))?;

        if actual != digest {
            return Err(StarError::DigestMismatch {
                filename: String::from_utf8_lossy(&filename).into_owned(),
                expected: hex::encode(digest),
                actual:   hex::encode(actual),
            });
        }

        let entry = Self { header, filename, content, digest };
        debug!(filename = %entry.filename(), size = entry.content_size(), "decoded entry");
        Ok(Some(entry))
    }

    /// Encode this entry and return the number of bytes written.
    ///
    /// The stored header is written back untouched, so an entry decoded
    /// from a stream re-encodes to the exact same bytes.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<u64> {
        self.header.write(&mut writer)?;
        writer.write_all(&self.filename)?;
        writer.write_all(&self.content)?;
        writer.write_all(&self.digest)?;
        debug!(filename = %self.filename(), size = self.content_size(), "encoded entry");
        Ok(self.encoded_len())
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Filename as text; invalid UTF-8 is replaced.
    pub fn filename(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.filename)
    }

    pub fn filename_bytes(&self) -> &[u8] {
        &self.filename
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_size(&self) -> u32 {
        self.header.content_size
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Digest as lowercase hex.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Number of bytes [`write_to`](Self::write_to) produces for this entry.
    pub fn encoded_len(&self) -> u64 {
        (HEADER_SIZE + self.filename.len() + self.content.len() + DIGEST_SIZE) as u64
    }

    /// Human-readable description used by `info`.
    pub fn summary(&self) -> String {
        EntrySummary::from(self).to_string()
    }
}

fn check_filename(filename: &[u8]) -> Result<()> {
    if filename.len() > MAX_FILENAME_SIZE {
        return Err(StarError::FilenameTooLong {
            filename: String::from_utf8_lossy(filename).into_owned(),
        });
    }
    Ok(())
}

fn too_large(filename: &[u8]) -> StarError {
    StarError::FileTooLarge { filename: String::from_utf8_lossy(filename).into_owned() }
}
