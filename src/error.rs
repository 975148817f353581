use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::entry::MAX_FILENAME_SIZE;

#[derive(Error, Debug)]
pub enum StarError {
    /// The stream ended inside an entry.  Ending exactly on an entry
    /// boundary is not an error.
    #[error("unexpected end of input while reading {field}")]
    Truncated { field: &'static str },
    #[error("SHA1 mismatch on file '{filename}': expected {expected}, actual {actual}")]
    DigestMismatch {
        filename: String,
        expected: String,
        actual:   String,
    },
    #[error("invalid STAR file - no file entries found")]
    NoEntries,
    #[error("'{}' is not a file", .path.display())]
    NotAFile { path: PathBuf },
    #[error("'{}' is not a directory", .path.display())]
    NotADirectory { path: PathBuf },
    #[error("filename '{filename}' is too long, needs to be at most {} bytes", MAX_FILENAME_SIZE)]
    FilenameTooLong { filename: String },
    #[error("file '{filename}' is too large, needs to be at most {} bytes", u32::MAX)]
    FileTooLarge { filename: String },
    #[error("refusing to unpack '{filename}' outside the output directory")]
    UnsafePath { filename: String },
    #[error("directory walk failed: {0}")]
    Walk(#[from] jwalk::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StarError>;

/// Map an `UnexpectedEof` from a fixed-width read onto [`StarError::Truncated`].
pub(crate) fn truncated(field: &'static str) -> impl FnOnce(io::Error) -> StarError {
    move |e| match e.kind() {
        io::ErrorKind::UnexpectedEof => StarError::Truncated { field },
        _                            => StarError::Io(e),
    }
}
