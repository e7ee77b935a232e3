//! Release tarball reading and extraction
//!
//! Release manifests ship as plain, gzip or zstd compressed tarballs. The
//! compression is detected from the file's magic bytes rather than its
//! extension. bzip2 and xz tarballs are recognized but rejected.

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tar::Archive;

use crate::error::{CoreError, Result};

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    None,
    Gzip,
    Zstd,
    Bzip2,
    Xz,
}

impl Codec {
    fn detect(magic: &[u8]) -> Self {
        if magic.starts_with(GZIP_MAGIC) {
            Codec::Gzip
        } else if magic.starts_with(ZSTD_MAGIC) {
            Codec::Zstd
        } else if magic.starts_with(BZIP2_MAGIC) {
            Codec::Bzip2
        } else if magic.starts_with(XZ_MAGIC) {
            Codec::Xz
        } else {
            Codec::None
        }
    }
}

/// Open an archive, transparently decompressing gzip and zstd
fn open_archive(archive_path: &Path) -> Result<Archive<Box<dyn Read>>> {
    let mut file = File::open(archive_path)?;
    let mut magic = [0u8; 6];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    let reader: Box<dyn Read> = match Codec::detect(&magic[..read]) {
        Codec::None => Box::new(file),
        Codec::Gzip => Box::new(GzDecoder::new(file)),
        Codec::Zstd => Box::new(zstd::stream::read::Decoder::new(file)?),
        Codec::Bzip2 => return Err(unsupported(archive_path, "bzip2")),
        Codec::Xz => return Err(unsupported(archive_path, "xz")),
    };
    Ok(Archive::new(reader))
}

fn unsupported(archive_path: &Path, format: &'static str) -> CoreError {
    CoreError::UnsupportedCompression {
        archive: archive_path.to_path_buf(),
        format,
    }
}

/// List member paths exactly as stored, in archive order
///
/// Directory members always carry a trailing `/`, whatever the producing
/// tool wrote in the header.
pub fn list_members(archive_path: &Path) -> Result<Vec<String>> {
    let mut archive = open_archive(archive_path)?;
    let mut members = Vec::new();

    for entry in archive.entries()? {
        let entry = entry?;
        let mut path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        if entry.header().entry_type().is_dir() && !path.ends_with('/') {
            path.push('/');
        }
        members.push(path);
    }

    Ok(members)
}

/// Extract an archive over an existing directory
///
/// Existing files are overwritten; ownership recorded in the archive is not
/// applied. `dest` must already exist.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let mut archive = open_archive(archive_path)?;
    archive.set_preserve_ownerships(false);
    archive.set_overwrite(true);
    archive.unpack(dest)?;
    Ok(())
}
