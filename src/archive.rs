//! High-level [`Archive`] API: read, build, unpack, write and describe.
//!
//! ```no_run
//! use stargazer::archive::Archive;
//!
//! // Pack
//! let archive = Archive::from_directory("mod_files")?;
//! archive.write_to_path("mod_files_packed.star")?;
//!
//! // Unpack
//! let archive = Archive::open("mod_files_packed.star")?;
//! archive.unpack("mod_files_extracted")?;
//! # Ok::<(), stargazer::StarError>(())
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};

use jwalk::{Parallelism, WalkDir};
use tracing::{debug, info};

use crate::entry::Entry;
use crate::error::{Result, StarError};
use crate::summary::Summary;

// ── BuildOptions ──────────────────────────────────────────────────────────────

/// Comparator deciding the on-disk order of entries built from a directory.
pub type EntryOrder = fn(&Entry, &Entry) -> Ordering;

/// Configuration for [`Archive::from_directory_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Applied as a stable sort after the walk.  Without it entries keep
    /// walk order: depth-first, siblings sorted by file name.
    pub order: Option<EntryOrder>,
}

/// Orders `metadata.xml`/`metadata.txt` and then `install.txt` after all
/// other entries, leaving everything else in its existing order.
pub fn metadata_last(a: &Entry, b: &Entry) -> Ordering {
    fn rank(e: &Entry) -> u8 {
        match e.filename_bytes() {
            b"metadata.xml" | b"metadata.txt" => 1,
            b"install.txt"                    => 2,
            _                                 => 0,
        }
    }
    rank(a).cmp(&rank(b))
}

// ── Archive ───────────────────────────────────────────────────────────────────

/// An ordered sequence of entries.  Order is the on-disk order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    pub fn from_entries(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    // ── Read ──────────────────────────────────────────────────────────────────

    /// Decode entries until the stream ends.  The first bad entry aborts the
    /// whole read; a stream with no entries at all is rejected.
    pub fn read<R: Read>(mut reader: R) -> Result<Self> {
        let mut entries = Vec::new();
        while let Some(entry) = Entry::read_from(&mut reader)? {
            entries.push(entry);
        }
        if entries.is_empty() {
            return Err(StarError::NoEntries);
        }
        info!(entries = entries.len(), "parsed archive");
        Ok(Self { entries })
    }

    /// Read the archive stored in the regular file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !fs::metadata(path)?.is_file() {
            return Err(StarError::NotAFile { path: path.to_owned() });
        }
        debug!(path = %path.display(), "opening archive");
        Self::read(BufReader::new(File::open(path)?))
    }

    // ── Build ─────────────────────────────────────────────────────────────────

    pub fn from_directory<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::from_directory_with(root, BuildOptions::default())
    }

    /// One entry per regular file below `root`, named by its `/`-separated
    /// path relative to `root`.  Directories produce no entries and
    /// symbolic links are not followed.
    pub fn from_directory_with<P: AsRef<Path>>(root: P, opts: BuildOptions) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(StarError::NotADirectory { path: root.to_owned() });
        }

        let walker = WalkDir::new(root)
            .sort(true)
            .skip_hidden(false)
            .parallelism(Parallelism::Serial);

        let mut entries = Vec::new();
        for dent in walker {
            let dent = dent?;
            if !dent.file_type().is_file() {
                continue;
            }
            let path = dent.path();
            let filename = archive_name(root, &path)?;
            debug!(path = %path.display(), "adding file");
            entries.push(Entry::from_file(&path, filename)?);
        }

        if let Some(order) = opts.order {
            entries.sort_by(order);
        }
        info!(root = %root.display(), entries = entries.len(), "built archive");
        Ok(Self { entries })
    }

    // ── Write ─────────────────────────────────────────────────────────────────

    /// Encode every entry in order; returns the number of bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<u64> {
        let mut total = 0;
        for entry in &self.entries {
            total += entry.write_to(&mut writer)?;
        }
        Ok(total)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        let len = self.entries.iter().map(Entry::encoded_len).sum::<u64>();
        let mut buf = Vec::with_capacity(len as usize);
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Create (or truncate) the file at `path` and write the archive to it.
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<u64> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        let written = self.write_to(&mut writer)?;
        writer.flush()?;
        info!(path = %path.display(), bytes = written, "wrote archive");
        Ok(written)
    }

    /// Write every entry's content below `dest`, creating directories as
    /// needed and overwriting existing files.  Stops at the first failure;
    /// files already written stay on disk.
    pub fn unpack<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        let dest = dest.as_ref();
        for entry in &self.entries {
            let target = unpack_path(dest, entry)?;
            info!("Unpacking '{}'...", entry.filename());
            debug!(target = %target.display(), "unpack target");
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, entry.content())?;
        }
        info!(dest = %dest.display(), entries = self.entries.len(), "unpacked archive");
        Ok(())
    }

    // ── Metadata ─────────────────────────────────────────────────────────────

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entries' content sizes.
    pub fn content_size(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.content_size())).sum()
    }

    pub fn summary(&self) -> Summary {
        Summary::from(self)
    }
}

impl<'a> IntoIterator for &'a Archive {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// `path` relative to `root`, joined with `/` whatever the host separator.
/// On Unix the name keeps the exact bytes of each path component.
fn archive_name(root: &Path, path: &Path) -> Result<Vec<u8>> {
    let relative = path
        .strip_prefix(root)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let mut name = Vec::new();
    for (i, component) in relative.components().enumerate() {
        if i > 0 {
            name.push(b'/');
        }
        name.extend_from_slice(&os_str_bytes(component.as_os_str()));
    }
    Ok(name)
}

/// Resolve an entry's `/`-separated filename below `dest`.  Names that are
/// empty or would climb out of `dest` are refused.
fn unpack_path(dest: &Path, entry: &Entry) -> Result<PathBuf> {
    let unsafe_path = || StarError::UnsafePath { filename: entry.filename().into_owned() };

    let mut target = dest.to_path_buf();
    let mut depth = 0usize;
    for part in entry.filename_bytes().split(|&b| b == b'/') {
        if part.is_empty() || part == b"." {
            continue;
        }
        let part = bytes_os_str(part);
        let mut components = Path::new(&part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(c)), None) => target.push(c),
            _ => return Err(unsafe_path()),
        }
        depth += 1;
    }
    if depth == 0 {
        return Err(unsafe_path());
    }
    Ok(target)
}

#[cfg(unix)]
fn os_str_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(s.as_bytes())
}

#[cfg(not(unix))]
fn os_str_bytes(s: &OsStr) -> Cow<'_, [u8]> {
    Cow::Owned(s.to_string_lossy().into_owned().into_bytes())
}

#[cfg(unix)]
fn bytes_os_str(b: &[u8]) -> Cow<'_, OsStr> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(OsStr::from_bytes(b))
}

#[cfg(not(unix))]
fn bytes_os_str(b: &[u8]) -> Cow<'_, OsStr> {
    Cow::Owned(String::from_utf8_lossy(b).into_owned().into())
}
