//! The ZIP package holding the parts of a presentation.

use crate::xml::{self, Element};
use restyle_core::{Error, Result};
use std::io::{Cursor, Read, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// All parts of a package as raw bytes, in archive order.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Read every part of a ZIP archive into memory.
    pub fn read<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive
                .by_index(index)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", index, e)))?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().trim_start_matches('/').to_string();
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", name, e)))?;
            parts.push((name, data));
        }

        Ok(Self { parts })
    }

    /// Whether a part exists.
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    /// Raw bytes of a part.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// A part decoded as UTF-8 text.
    pub fn read_string(&self, name: &str) -> Result<String> {
        let data = self
            .get(name)
            .ok_or_else(|| Error::Zip(format!("File not found in archive '{}'", name)))?;
        decode_utf8(name, data)
    }

    /// A part parsed as XML.
    pub fn read_xml(&self, name: &str) -> Result<Element> {
        let content = self.read_string(name)?;
        xml::parse(&content).map_err(|e| Error::Xml(format!("{}: {}", name, e)))
    }

    /// Add or replace a part, keeping the position of a replaced part.
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Remove a part, returning its bytes.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        let index = self.parts.iter().position(|(n, _)| n == name)?;
        Some(self.parts.remove(index).1)
    }

    /// Remove every part whose name matches.
    pub fn remove_where(&mut self, mut predicate: impl FnMut(&str) -> bool) -> usize {
        let before = self.parts.len();
        self.parts.retain(|(n, _)| !predicate(n));
        before - self.parts.len()
    }

    /// Part names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Write the package as a ZIP archive into memory.
    ///
    /// The content types part always goes first.
    pub fn write(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        let ordered = self
            .parts
            .iter()
            .filter(|(n, _)| n == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|(n, _)| n != CONTENT_TYPES_PART));

        for (name, data) in ordered {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", name, e)))?;
            writer.write_all(data)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::Zip(format!("Failed to finish archive: {}", e)))?;
        Ok(cursor.into_inner())
    }
}

fn decode_utf8(name: &str, data: &[u8]) -> Result<String> {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::Xml(format!("'{}' is not valid UTF-8: {}", name, e)))
}
