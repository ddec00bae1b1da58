//! KMZ packaging.
//!
//! A KMZ file is a zip archive whose first entry is the KML document.

use std::io::{Cursor, Write};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::error::Result;

pub const KML_ENTRY: &str = "doc.kml";

/// Stores `data` as the single deflated entry `entry` of a new archive.
pub fn kmz(entry: &str, data: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(entry, options)?;
    zip.write_all(data)?;
    Ok(zip.finish()?.into_inner())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    pub fn read_entry(bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        data
    }

    #[test]
    fn single_entry() {
        let kml = b"<kml/>".repeat(100);
        let bytes = kmz(KML_ENTRY, &kml).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(bytes.len() < kml.len());

        let archive = ZipArchive::new(Cursor::new(&bytes[..])).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(read_entry(&bytes, KML_ENTRY), kml);
    }
}
