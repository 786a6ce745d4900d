//! Archive production.
//!
//! The finished build tree is serialized into a single zip whose entries are
//! all rooted under the plugin identifier, the exact layout WordPress
//! expects from an uploaded plugin archive. Archiving is a *capability*:
//! when no backend is available the pipeline degrades to folder-only output
//! with a warning instead of failing, so [`ArchiveBackend`] exposes
//! availability separately from the write itself.

use anyhow::Result;
use std::fs::File;
use std::io;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;

use crate::core::WpackError;

/// Capability interface for serializing a build tree into a container file.
pub trait ArchiveBackend {
    /// Whether this backend can produce archives in the current environment.
    fn is_available(&self) -> bool;

    /// Walks `build_dir` and writes `output_file`, one entry per file and
    /// directory (empty directories included), every path prefixed with
    /// `root_name/`.
    ///
    /// # Errors
    ///
    /// [`WpackError::ArchiveUnavailable`] when the backend cannot run at
    /// all, [`WpackError::ArchiveIo`] when writing fails part-way.
    fn archive(&self, build_dir: &Path, output_file: &Path, root_name: &str) -> Result<()>;
}

/// The zip backend, always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipBackend;

impl ArchiveBackend for ZipBackend {
    fn is_available(&self) -> bool {
        true
    }

    fn archive(&self, build_dir: &Path, output_file: &Path, root_name: &str) -> Result<()> {
        let archive_io = |reason: String| WpackError::ArchiveIo {
            path: output_file.display().to_string(),
            reason,
        };

        let file = File::create(output_file).map_err(|e| archive_io(e.to_string()))?;
        let mut writer = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for entry in WalkDir::new(build_dir).follow_links(true) {
            let entry = entry.map_err(|e| archive_io(e.to_string()))?;
            if entry.depth() == 0 {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(build_dir)
                .map_err(|e| archive_io(e.to_string()))?;
            let name = format!("{root_name}/{}", unix_path(relative));

            if entry.file_type().is_dir() {
                writer.add_directory(name, options).map_err(|e| archive_io(e.to_string()))?;
            } else {
                writer.start_file(name, options).map_err(|e| archive_io(e.to_string()))?;
                let mut source =
                    File::open(entry.path()).map_err(|e| archive_io(e.to_string()))?;
                io::copy(&mut source, &mut writer).map_err(|e| archive_io(e.to_string()))?;
            }
        }

        writer.finish().map_err(|e| archive_io(e.to_string()))?;
        tracing::debug!(target: "archive", "wrote {}", output_file.display());
        Ok(())
    }
}

/// Archive entry names always use forward slashes, also on Windows.
fn unix_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
