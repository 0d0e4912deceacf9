use crate::error::{Error, Result};
use path_absolutize::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the per-user tool directory under `$HOME`.
pub const LEPKG_DIR: &str = ".lepkg";
pub const CONFIG_FILE: &str = "lepkg.cfg";
/// Overrides `packages_dir` from the config file when set.
pub const PACKAGES_DIR_ENV: &str = "LEPKG_PACKAGES_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Root holding one directory per installed package.
    pub packages_dir: PathBuf,
    /// Privilege escalation wrapper, `None` to run the build tool directly.
    pub elevate: Option<String>,
    pub build_tool: String,
    pub install_target: String,
}

impl Config {
    /// Defaults rooted at the given home directory.
    pub fn with_home(home: &Path) -> Config {
        Config {
            packages_dir: home.join(LEPKG_DIR).join(".packages"),
            elevate: Some("sudo".to_string()),
            build_tool: "make".to_string(),
            install_target: "install".to_string(),
        }
    }

    /// Loads `~/.lepkg/lepkg.cfg` and applies the environment override.
    pub fn from_env() -> Result<Config> {
        let home = home_dir()?;
        let cfg = Config::load(&home, &home.join(LEPKG_DIR).join(CONFIG_FILE))?;
        cfg.with_packages_dir_override(std::env::var_os(PACKAGES_DIR_ENV).map(PathBuf::from))
    }

    /// Reads a `key: value` config file. A missing file yields the defaults.
    pub fn load(home: &Path, path: &Path) -> Result<Config> {
        let mut cfg = Config::with_home(home);
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(cfg);
            }
            Err(e) => return Err(e.into()),
        };

        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(Error::Config(format!(
                    "{}:{}: expected `key: value`",
                    path.display(),
                    lineno + 1
                )));
            };
            let value = value.trim();
            match key.trim() {
                "packages_dir" => cfg.packages_dir = absolutize(Path::new(value))?,
                "elevate" if value.is_empty() => cfg.elevate = None,
                "elevate" => cfg.elevate = Some(value.to_string()),
                "build_tool" => cfg.build_tool = value.to_string(),
                "install_target" => cfg.install_target = value.to_string(),
                other => warn!("Unknown config key in {}: {}", path.display(), other),
            }
        }

        Ok(cfg)
    }

    pub fn with_packages_dir_override(mut self, dir: Option<PathBuf>) -> Result<Config> {
        if let Some(dir) = dir.filter(|d| !d.as_os_str().is_empty()) {
            debug!("Packages dir overridden to {}", dir.display());
            self.packages_dir = absolutize(&dir)?;
        }
        Ok(self)
    }

    /// Argument vector of the install step, elevation wrapper first.
    pub fn install_command(&self) -> Vec<String> {
        self.elevate
            .iter()
            .cloned()
            .chain([self.build_tool.clone(), self.install_target.clone()])
            .collect()
    }

    pub fn package_dir(&self, package_name: &str) -> PathBuf {
        self.packages_dir.join(package_name)
    }
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| Error::Config("home directory not found".to_string()))
}

pub(crate) fn absolutize(path: &Path) -> Result<PathBuf> {
    Ok(path.absolutize()?.to_path_buf())
}
