//! Builds and unpacks the world snapshot archive.
//!
//! A snapshot is a gzip-compressed tar stream of a fixed selection of the
//! server directory's top-level entries: every `*.json` config file, the
//! `world` directory (recursively), and `server.properties`. Nothing else is
//! archived, and restore only accepts directory and regular-file entries.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;

const CONFIG_SUFFIX: &str = ".json";
const WORLD_DIR: &str = "world";
const PROPERTIES_FILE: &str = "server.properties";

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unsupported archive entry kind: {0}")]
    UnsupportedEntry(String),
}

fn selected(name: &str) -> bool {
    name.ends_with(CONFIG_SUFFIX) || name == WORLD_DIR || name == PROPERTIES_FILE
}

/// Snapshots the selected entries of `dir` into a `tar.gz` byte stream.
///
/// Directory entries are written as headers only, immediately followed by
/// their children; regular files carry their full contents and mode bits.
/// Any open/stat/read failure aborts the build; callers must discard the
/// partial output.
pub fn build(dir: &Path) -> Result<Vec<u8>, ArchiveError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut archive = tar::Builder::new(encoder);

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !selected(&name.to_string_lossy()) {
            continue;
        }
        append_entry(&mut archive, &entry.path(), Path::new(&name))?;
    }

    let encoder = archive.into_inner()?;
    Ok(encoder.finish()?)
}

fn append_entry<W: Write>(
    archive: &mut tar::Builder<W>,
    path: &Path,
    relative: &Path,
) -> io::Result<()> {
    if path.is_dir() {
        archive.append_dir(relative, path)?;
        for child in fs::read_dir(path)? {
            let child = child?;
            append_entry(archive, &child.path(), &relative.join(child.file_name()))?;
        }
        Ok(())
    } else {
        let mut file = File::open(path)?;
        archive.append_file(relative, &mut file)
    }
}

/// Unpacks a `tar.gz` byte stream produced by [`build`] into `dir`.
///
/// Directory entries are created with their parents; regular files are
/// created or overwritten with the archived contents and permissions. Any
/// other entry kind is rejected so a corrupt or foreign archive can never be
/// partially restored into the server directory.
pub fn unpack(bytes: &[u8], dir: &Path) -> Result<(), ArchiveError> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = dir.join(entry.path()?);

        match entry.header().entry_type() {
            tar::EntryType::Directory => fs::create_dir_all(&path)?,
            tar::EntryType::Regular => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut file = File::create(&path)?;
                io::copy(&mut entry, &mut file)?;
                #[cfg(unix)]
                if let Ok(mode) = entry.header().mode() {
                    use std::os::unix::fs::PermissionsExt;
                    file.set_permissions(fs::Permissions::from_mode(mode))?;
                }
            }
            other => {
                return Err(ArchiveError::UnsupportedEntry(format!("{other:?}")));
            }
        }
    }

    Ok(())
}
