use crate::error::Error;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Owns the two staging directories of a run. Both are removed when the
/// value is dropped, whichever way the run ends.
#[derive(Debug)]
pub struct Staging {
    directories: [PathBuf; 2],
}

impl Staging {
    pub const FRAMES_DIR: &'static str = "temp_frames";
    pub const UPSCALED_DIR: &'static str = "temp_upscaled_frames";

    /// Staging directories live next to the input video.
    pub fn base_for(input: &Path) -> PathBuf {
        match input.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn paths(base: &Path) -> [PathBuf; 2] {
        [base.join(Self::FRAMES_DIR), base.join(Self::UPSCALED_DIR)]
    }

    /// Creates both directories fresh. Leftovers of an interrupted run are
    /// removed first so their frames never reach this run.
    pub fn create(base: &Path) -> Result<Self, Error> {
        Self::create_at(Self::paths(base))
    }

    fn create_at(directories: [PathBuf; 2]) -> Result<Self, Error> {
        // The guard exists before anything is touched, so a failure on the
        // second directory still removes the first.
        let staging = Self { directories };
        for path in &staging.directories {
            Self::remove_leftover(path)?;
            fs::create_dir(path)?;
            log::debug!("Created staging directory {}", path.display());
        }
        Ok(staging)
    }

    fn remove_leftover(path: &Path) -> Result<(), Error> {
        match fs::symlink_metadata(path) {
            Ok(metadata) if metadata.is_dir() => {
                log::warn!("Removing leftover staging directory {}", path.display());
                fs::remove_dir_all(path)?;
            }
            Ok(_) => fs::remove_file(path)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    pub fn frames_dir(&self) -> &Path {
        &self.directories[0]
    }

    pub fn upscaled_dir(&self) -> &Path {
        &self.directories[1]
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        log::info!("Cleaning up temporary files...");
        for directory in &self.directories {
            match fs::remove_dir_all(directory) {
                Ok(()) => log::debug!("Removed staging directory {}", directory.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => log::warn!("Failed to remove {}: {}", directory.display(), e),
            }
        }
    }
}
