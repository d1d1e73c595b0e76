//! Read-only view over a DAR bundle.

use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::ParserError;

/// A DAR archive held in memory. Entries are addressed by the relative
/// paths the manifest lists; there is no directory listing beyond that.
pub struct DarReader {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl DarReader {
    pub fn new(bytes: Vec<u8>) -> Result<Self, ParserError> {
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(ParserError::BadArchive)?;
        Ok(Self { archive })
    }

    /// The bytes of the entry at `path`.
    pub fn open(&mut self, path: &str) -> Result<Vec<u8>, ParserError> {
        let mut entry = self.archive.by_name(path).map_err(|err| match err {
            ZipError::FileNotFound => ParserError::MissingEntry(path.to_string()),
            other => ParserError::BadArchive(other),
        })?;
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}
