//! External build command execution with live stdout.

use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, warn};

/// Captured output of a command that exited successfully.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Resolves `program` on `PATH`.
pub fn ensure_program(program: &str) -> Result<PathBuf> {
    which::which(program).map_err(|e| {
        debug!("Lookup of {} failed: {}", program, e);
        Error::BuildToolMissing {
            program: program.to_string(),
        }
    })
}

/// Runs `argv` in `cwd`, handing each stdout line to `on_line` as soon as it
/// is read. Stderr is drained on a separate thread so neither pipe can fill
/// up and stall the child. Returns once stdout hits EOF and the child has
/// exited.
pub fn run_streaming<F>(argv: &[String], cwd: &Path, mut on_line: F) -> Result<RunOutput>
where
    F: FnMut(&str),
{
    let (program, args) = argv.split_first().ok_or_else(|| Error::BuildToolMissing {
        program: String::new(),
    })?;
    let command = argv.join(" ");
    let resolved = ensure_program(program)?;
    debug!("Running `{}` in {}", command, cwd.display());

    let mut child = Command::new(&resolved)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::BuildToolMissing {
                program: program.clone(),
            },
            _ => Error::Io(e),
        })?;

    let stderr_pipe = child.stderr.take();
    let stderr_thread = thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr_pipe {
            if let Err(e) = pipe.read_to_end(&mut buf) {
                warn!("Failed to read child stderr: {}", e);
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    });

    let mut stdout = String::new();
    if let Some(pipe) = child.stdout.take() {
        let mut reader = BufReader::new(pipe);
        let mut raw = Vec::new();
        loop {
            raw.clear();
            if reader.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            on_line(line.trim_end_matches(&['\n', '\r'][..]));
            stdout.push_str(&line);
        }
    }

    let status = child.wait()?;
    let stderr = stderr_thread.join().unwrap_or_default();

    if !status.success() {
        return Err(Error::BuildFailed {
            command,
            code: status.code(),
            stdout,
            stderr,
        });
    }

    Ok(RunOutput { stdout, stderr })
}
