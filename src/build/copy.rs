//! Directory tree mirroring with per-file rewriting.
//!
//! [`copy_tree`] walks a source tree pre-order (a directory is visited
//! before its children, so empty intermediate directories still materialize
//! in the destination), passes every `.php` file through the rewriter, and
//! copies everything else byte-for-byte. Symbolic links are followed for
//! content, but relative destination paths are computed from the unresolved
//! walk path so a symlinked fixture can neither flatten nor escape the tree.
//!
//! The vendor tree is materialized by the installer directly inside the
//! build tree, so `source == dest` is explicitly supported: eligible files
//! are rewritten in place and everything else is left untouched.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::constants::PHP_EXTENSION;
use crate::prefixer::{NamespaceRewriter, RewriteMode};
use crate::utils::fs::ensure_dir;

/// Mirrors `source` into `dest`, rewriting eligible files.
///
/// A missing `source` is a no-op; callers treat optional trees (`assets/`,
/// a project without `src/`) uniformly. With `rewriter` set to `None` the
/// copy is verbatim.
pub fn copy_tree(
    source: &Path,
    dest: &Path,
    rewriter: Option<&NamespaceRewriter>,
    mode: RewriteMode,
) -> Result<()> {
    if !source.is_dir() {
        tracing::debug!(target: "build", "skipping absent tree {}", source.display());
        return Ok(());
    }
    let in_place = source == dest;

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Failed to relativize {}", entry.path().display()))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            if !in_place {
                ensure_dir(&target)?;
            }
        } else {
            copy_file_inner(entry.path(), &target, rewriter, mode, in_place)?;
        }
    }
    Ok(())
}

/// Copies a single file, rewriting it when eligible. Used for the top-level
/// plugin entry file.
pub fn copy_file(
    source: &Path,
    dest: &Path,
    rewriter: Option<&NamespaceRewriter>,
    mode: RewriteMode,
) -> Result<()> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    copy_file_inner(source, dest, rewriter, mode, source == dest)
}

fn copy_file_inner(
    source: &Path,
    dest: &Path,
    rewriter: Option<&NamespaceRewriter>,
    mode: RewriteMode,
    in_place: bool,
) -> Result<()> {
    if let Some(rewriter) = rewriter {
        if is_rewritable(source) {
            // Non-UTF-8 content falls back to a verbatim copy; the rewriter
            // only ever sees text.
            let bytes = fs::read(source)
                .with_context(|| format!("Failed to read file: {}", source.display()))?;
            match String::from_utf8(bytes) {
                Ok(content) => {
                    let rewritten = rewriter.rewrite(&content, mode);
                    fs::write(dest, rewritten)
                        .with_context(|| format!("Failed to write file: {}", dest.display()))?;
                    return Ok(());
                }
                Err(_) => {
                    tracing::debug!(
                        target: "build",
                        "{} is not valid UTF-8, copying verbatim",
                        source.display()
                    );
                }
            }
        }
    }

    if !in_place {
        fs::copy(source, dest).with_context(|| {
            format!("Failed to copy {} to {}", source.display(), dest.display())
        })?;
    }
    Ok(())
}

fn is_rewritable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PHP_EXTENSION))
}
