use crate::config::absolutize;
use crate::error::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const PACKAGE_EXTENSION: &str = "lepkg";

/// Directory name used as the archive root, resolved through `.` and trailing slashes.
pub fn base_name(source_dir: &Path) -> Result<String> {
    let abs = absolutize(source_dir)?;
    abs.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} has no base name", source_dir.display()),
            ))
        })
}

/// `<basename>.lepkg`, relative to the working directory.
pub fn default_output(source_dir: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(format!(
        "{}.{}",
        base_name(source_dir)?,
        PACKAGE_EXTENSION
    )))
}

/// Packs `source_dir` into a gzip-compressed tarball rooted at its base name.
pub fn create_package(source_dir: &Path, output: Option<&Path>) -> Result<PathBuf> {
    if !source_dir.is_dir() {
        return Err(Error::NotFound {
            kind: "Directory",
            path: source_dir.to_path_buf(),
        });
    }

    let root = base_name(source_dir)?;
    let output = match output {
        Some(o) => o.to_path_buf(),
        None => default_output(source_dir)?,
    };
    debug!(
        "Archiving {} as {}/ into {}",
        source_dir.display(),
        root,
        output.display()
    );

    let file = File::create(&output)?;
    // Compared against walked paths so a package written inside its own
    // source tree is not packed into itself.
    let output_abs = absolutize(&output)?;

    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if absolutize(entry.path())? == output_abs {
            debug!("Skipping package output {}", entry.path().display());
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        let name = if rel.as_os_str().is_empty() {
            PathBuf::from(&root)
        } else {
            Path::new(&root).join(rel)
        };

        if entry.file_type().is_dir() {
            builder.append_dir(&name, entry.path())?;
        } else {
            builder.append_path_with_name(entry.path(), &name)?;
        }
    }
    builder.into_inner()?.finish()?;

    info!("Created package {}", output.display());
    Ok(output)
}
