use crate::config::Config;
use crate::error::{Error, Result};
use crate::runner::{self, RunOutput};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, warn};

/// Result of unpacking a package into the packages root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub package_name: String,
    pub target_dir: PathBuf,
    pub entries: u64,
}

/// File name with its final extension stripped (`hello.lepkg` -> `hello`).
///
/// Leading dots are part of the name, so `.hidden.lepkg` gives `.hidden` and
/// `..lepkg` keeps its full name rather than collapsing to `.`.
pub fn package_name(package_file: &Path) -> Result<String> {
    let file_name = package_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dots = file_name.len() - file_name.trim_start_matches('.').len();
    let name = match file_name[dots..].rfind('.') {
        Some(idx) => &file_name[..dots + idx],
        None => file_name.as_str(),
    };

    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidPackageName {
            path: package_file.to_path_buf(),
        });
    }
    Ok(name.to_string())
}

fn open_archive(package_file: &Path) -> Result<Archive<GzDecoder<File>>> {
    let file = File::open(package_file)?;
    Ok(Archive::new(GzDecoder::new(file)))
}

fn count_entries(package_file: &Path) -> Result<u64> {
    let mut archive = open_archive(package_file)?;
    let mut total = 0;
    for entry in archive.entries()? {
        entry?;
        total += 1;
    }
    Ok(total)
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template("Extracting: [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

/// Unpacks `package_file` into `<packages_dir>/<package_name>`, replacing
/// whatever was installed there before.
pub fn extract_package(config: &Config, package_file: &Path) -> Result<Extracted> {
    if !package_file.is_file() {
        return Err(Error::NotFound {
            kind: "File",
            path: package_file.to_path_buf(),
        });
    }
    let package_name = package_name(package_file)?;
    let target_dir = config.package_dir(&package_name);

    // Read the listing before touching the previous install.
    let total = count_entries(package_file)?;

    if target_dir.exists() {
        debug!("Removing previous install at {}", target_dir.display());
        std::fs::remove_dir_all(&target_dir)?;
    }
    std::fs::create_dir_all(&target_dir)?;

    let pb = progress_bar(total);
    let mut archive = open_archive(package_file)?;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();
        if !entry.unpack_in(&target_dir)? {
            warn!("Skipped entry outside package root: {}", path.display());
        }
        pb.set_message(path.display().to_string());
        pb.inc(1);
    }
    pb.finish();

    info!(
        "Extracted {} entries from {} into {}",
        total,
        package_file.display(),
        target_dir.display()
    );

    Ok(Extracted {
        package_name,
        target_dir,
        entries: total,
    })
}

/// Runs the configured install command next to `makefile`.
///
/// Only the first program (the elevation wrapper when one is configured) is
/// looked up on the caller's `PATH`; the build tool behind it is resolved by
/// the wrapper.
pub fn run_install<F>(config: &Config, makefile: &Path, on_line: F) -> Result<RunOutput>
where
    F: FnMut(&str),
{
    let cwd = makefile.parent().unwrap_or_else(|| Path::new("."));
    runner::run_streaming(&config.install_command(), cwd, on_line)
}

/// Names of installed packages, sorted.
pub fn list_packages(config: &Config) -> Result<Vec<String>> {
    let dir_it = match std::fs::read_dir(&config.packages_dir) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in dir_it {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
