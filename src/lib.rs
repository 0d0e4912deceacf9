//! lepkg: pack a directory into a `.lepkg` tarball, or unpack one into the
//! per-user packages root and run its `make install`.

pub mod archive;
pub mod commands;
pub mod config;
pub mod descriptor;
mod error;
pub mod install;
pub mod runner;

pub use archive::{create_package, default_output, PACKAGE_EXTENSION};
pub use config::Config;
pub use descriptor::find_makefile;
pub use error::{Error, Result};
pub use install::{extract_package, list_packages, package_name, run_install, Extracted};
pub use runner::{run_streaming, RunOutput};
