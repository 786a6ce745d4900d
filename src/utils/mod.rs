//! Cross-platform utilities supporting the build pipeline.

pub mod fs;

pub use fs::{ensure_dir, read_text_file, remove_dir_all, write_text_file};
