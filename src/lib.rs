pub mod header;
pub mod entry;
pub mod hashing;
pub mod archive;
pub mod summary;
pub mod error;

use std::path::Path;

pub use header::{Header, HEADER_SIZE};
pub use entry::{Entry, MAX_FILENAME_SIZE};
pub use hashing::{sha1, Digest, HashingReader, DIGEST_SIZE};
pub use archive::{metadata_last, Archive, BuildOptions, EntryOrder};
pub use summary::{EntrySummary, Summary};
pub use error::{Result, StarError};

/// Read the STAR archive stored at `path`.
pub fn read_archive<P: AsRef<Path>>(path: P) -> Result<Archive> {
    Archive::open(path)
}

/// Pack every regular file below `dir` into an archive, in walk order.
pub fn build_archive<P: AsRef<Path>>(dir: P) -> Result<Archive> {
    Archive::from_directory(dir)
}

pub fn build_archive_with<P: AsRef<Path>>(dir: P, opts: BuildOptions) -> Result<Archive> {
    Archive::from_directory_with(dir, opts)
}

pub fn unpack<P: AsRef<Path>>(archive: &Archive, output_dir: P) -> Result<()> {
    archive.unpack(output_dir)
}

pub fn serialize(archive: &Archive) -> Result<Vec<u8>> {
    archive.serialize()
}

/// Text listing of every entry followed by the entry count and total size.
pub fn summarize(archive: &Archive) -> String {
    archive.summary().to_string()
}
