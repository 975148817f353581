//! SHA-1 over data as it is read.

use sha1_smol::Sha1;
use std::io::{self, Read};

/// Length of a SHA-1 digest in bytes.
pub const DIGEST_SIZE: usize = 20;

pub type Digest = [u8; DIGEST_SIZE];

pub fn sha1(data: &[u8]) -> Digest {
    Sha1::from(data).digest().bytes()
}

/// A reader wrapper that feeds every byte it yields into a SHA-1 hasher.
pub struct HashingReader<R> {
    inner:      R,
    hasher:     Sha1,
    bytes_read: u64,
}

impl<R> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha1::new(),
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Digest of everything read so far.
    pub fn digest(&self) -> Digest {
        self.hasher.digest().bytes()
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes_read += n as u64;
        Ok(n)
    }
}
