//! Text and JSON descriptions of an archive's contents.

use serde::Serialize;
use std::fmt;

use crate::archive::Archive;
use crate::entry::Entry;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub filename:     String,
    pub content_size: u32,
    pub sha1:         String,
}

impl From<&Entry> for EntrySummary {
    fn from(e: &Entry) -> Self {
        EntrySummary {
            filename:     e.filename().into_owned(),
            content_size: e.content_size(),
            sha1:         e.digest_hex(),
        }
    }
}

impl fmt::Display for EntrySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.filename)?;
        writeln!(f, "  Filesize: {} bytes", self.content_size)?;
        writeln!(f, "  SHA1: {}", self.sha1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub entries:            Vec<EntrySummary>,
    pub total_entries:      usize,
    pub total_content_size: u64,
}

impl From<&Archive> for Summary {
    fn from(archive: &Archive) -> Self {
        let entries: Vec<EntrySummary> = archive.iter().map(EntrySummary::from).collect();
        Summary {
            total_entries:      entries.len(),
            entries,
            total_content_size: archive.content_size(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "Total contents: {}", self.total_entries)?;
        writeln!(f, "Total content size: {} bytes", self.total_content_size)
    }
}
