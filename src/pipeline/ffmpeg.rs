use crate::error::Error;

use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::{Command, Stdio};

/// Lines of ffmpeg's stderr kept in the error; the banner and stream dump
/// before them are noise.
const STDERR_TAIL_LINES: usize = 20;

/// Runs ffmpeg to completion with its output captured.
pub fn run(program: &str, args: &[OsString], stage: &'static str) -> Result<(), Error> {
    log::debug!("Running {} {:?}", program, args);
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FFmpegNotAvailable(program.to_string()),
            _ => Error::Io(e),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(Error::FfmpegFailed {
            stage,
            status: output.status,
            stderr: stderr_tail(&String::from_utf8_lossy(&output.stderr)),
        })
    }
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
