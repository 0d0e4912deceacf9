//! Build descriptor lookup in an extracted package tree.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const MAKEFILE: &str = "Makefile";

/// Finds the first `Makefile` under `dir`.
///
/// The walk is top-down. Within a directory, files are visited before
/// subdirectories and names are compared lexicographically, so a shallower
/// `Makefile` wins over one nested further down the same branch.
pub fn find_makefile(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .sort_by(files_first)
        .into_iter()
        .filter_map(|e| e.ok())
        .find(|e| e.file_type().is_file() && e.file_name() == MAKEFILE)
        .map(DirEntry::into_path)
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
