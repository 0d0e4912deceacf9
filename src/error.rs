use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind} {} does not exist.", path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("Cannot derive a package name from {}.", path.display())]
    InvalidPackageName { path: PathBuf },

    #[error("'{program}' not found. Ensure it is installed.")]
    BuildToolMissing { program: String },

    #[error("`{command}` exited with status {}", code.map_or_else(|| "unknown".to_string(), |c| c.to_string()))]
    BuildFailed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Anticipated failures: printed to the user, not fatal to the program.
    pub fn is_reported(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::InvalidPackageName { .. }
                | Error::BuildToolMissing { .. }
                | Error::BuildFailed { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_variants() {
        let missing = Error::NotFound {
            kind: "File",
            path: PathBuf::from("nope.lepkg"),
        };
        assert!(missing.is_reported());
        assert_eq!(missing.to_string(), "File nope.lepkg does not exist.");

        let invalid = Error::InvalidPackageName {
            path: PathBuf::from(".."),
        };
        assert!(invalid.is_reported());
        assert_eq!(invalid.to_string(), "Cannot derive a package name from ...");

        let failed = Error::BuildFailed {
            command: "make install".to_string(),
            code: Some(2),
            stdout: String::new(),
            stderr: "boom".to_string(),
        };
        assert!(failed.is_reported());
        assert_eq!(failed.to_string(), "`make install` exited with status 2");

        let io = Error::from(std::io::Error::other("disk full"));
        assert!(!io.is_reported());
    }
}
