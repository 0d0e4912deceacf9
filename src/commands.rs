//! Command handlers behind the `-z`, `-i` and `-l` flags.
//!
//! Messages go to the given writer so the binary passes stdout and tests pass
//! a buffer.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::{archive, descriptor, install};
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub fn pack<W: Write>(source_dir: &Path, output: Option<&Path>, out: &mut W) -> Result<()> {
    let output = archive::create_package(source_dir, output)?;
    writeln!(out, "Package {} created successfully.", output.display())?;
    Ok(())
}

/// Extracts the package, then runs its install command if a Makefile is
/// found. Install failures are written to `out`; the extracted tree stays.
pub fn install<W: Write>(config: &Config, package_file: &Path, out: &mut W) -> Result<()> {
    debug!("Packages root: {}", config.packages_dir.display());

    let extracted = install::extract_package(config, package_file)?;
    writeln!(
        out,
        "Package {} extracted to {}.",
        package_file.display(),
        extracted.target_dir.display()
    )?;

    let Some(makefile) = descriptor::find_makefile(&extracted.target_dir) else {
        writeln!(out, "Makefile not found, installation skipped.")?;
        return Ok(());
    };
    writeln!(out, "Makefile found: {}", makefile.display())?;
    writeln!(out, "Running {}...", config.install_command().join(" "))?;
    out.flush()?;

    let mut write_err = None;
    let result = install::run_install(config, &makefile, |line| {
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            write_err.get_or_insert(e);
        }
    });
    if let Some(e) = write_err {
        return Err(e.into());
    }

    match result {
        Ok(_) => writeln!(out, "Installation completed successfully.")?,
        Err(e) if e.is_reported() => {
            writeln!(out, "Error during installation: {e}")?;
            if let Error::BuildFailed { stdout, stderr, .. } = &e {
                writeln!(out, "stderr: {stderr}")?;
                writeln!(out, "stdout: {stdout}")?;
            }
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

pub fn list<W: Write>(config: &Config, out: &mut W) -> Result<()> {
    let names = install::list_packages(config)?;
    if names.is_empty() {
        writeln!(out, "No packages installed.")?;
    }
    for name in names {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

/// Writes anticipated failures to `out` and swallows them; anything else is
/// handed back to the caller as fatal.
pub fn report<W: Write>(outcome: Result<()>, out: &mut W) -> Result<()> {
    match outcome {
        Err(e) if e.is_reported() => {
            writeln!(out, "{e}")?;
            Ok(())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn test_config(root: &Path) -> Config {
        Config {
            packages_dir: root.join("packages"),
            elevate: None,
            build_tool: "echo".to_string(),
            install_target: "install".to_string(),
        }
    }

    fn packed(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let src = root.join("src").join(name);
        fs::create_dir_all(&src).unwrap();
        for (rel, contents) in files {
            let path = src.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
        let pkg = root.join(format!("{name}.lepkg"));
        archive::create_package(&src, Some(&pkg)).unwrap();
        pkg
    }

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_install_without_makefile_reports_skip() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());
        let pkg = packed(tmp.path(), "docs", &[("index.html", "")]);

        let mut buf = Vec::new();
        install(&cfg, &pkg, &mut buf).unwrap();

        let text = output(buf);
        assert!(text.contains("extracted to"));
        assert!(text.ends_with("Makefile not found, installation skipped.\n"));
    }

    #[test]
    fn test_install_streams_build_output() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());
        let pkg = packed(tmp.path(), "tool", &[("Makefile", "install:\n")]);

        let mut buf = Vec::new();
        install(&cfg, &pkg, &mut buf).unwrap();

        let text = output(buf);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].starts_with("Makefile found: "));
        assert_eq!(
            &lines[2..],
            &["Running echo install...", "install", "Installation completed successfully."]
        );
    }

    #[test]
    fn test_install_build_failure_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = test_config(tmp.path());
        cfg.build_tool = "false".to_string();
        let pkg = packed(tmp.path(), "bad", &[("Makefile", "install:\n")]);

        let mut buf = Vec::new();
        install(&cfg, &pkg, &mut buf).unwrap();

        let text = output(buf);
        assert!(text.contains("Error during installation: `false install` exited with status 1"));
        assert!(text.contains("stderr: "));
        assert!(cfg.package_dir("bad").join("bad/Makefile").is_file());
    }

    #[test]
    fn test_install_missing_tool_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cfg = test_config(tmp.path());
        cfg.elevate = Some("lepkg-no-such-sudo".to_string());
        let pkg = packed(tmp.path(), "tool", &[("Makefile", "install:\n")]);

        let mut buf = Vec::new();
        install(&cfg, &pkg, &mut buf).unwrap();

        assert!(output(buf).contains("'lepkg-no-such-sudo' not found."));
    }

    #[test]
    fn test_report_prints_anticipated_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());
        let missing = tmp.path().join("ghost.lepkg");

        let mut buf = Vec::new();
        report(install(&cfg, &missing, &mut buf), &mut buf).unwrap();
        assert_eq!(
            output(buf),
            format!("File {} does not exist.\n", missing.display())
        );
        assert!(!cfg.packages_dir.exists());

        let fatal = Err(Error::Io(std::io::Error::other("disk full")));
        assert!(report(fatal, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_pack_and_list_messages() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = test_config(tmp.path());

        let mut buf = Vec::new();
        list(&cfg, &mut buf).unwrap();
        assert_eq!(output(buf), "No packages installed.\n");

        let src = tmp.path().join("hello");
        fs::create_dir_all(&src).unwrap();
        let pkg = tmp.path().join("hello.lepkg");
        let mut buf = Vec::new();
        pack(&src, Some(&pkg), &mut buf).unwrap();
        assert_eq!(
            output(buf),
            format!("Package {} created successfully.\n", pkg.display())
        );

        install(&cfg, &pkg, &mut Vec::new()).unwrap();
        let mut buf = Vec::new();
        list(&cfg, &mut buf).unwrap();
        assert_eq!(output(buf), "hello\n");
    }
}
