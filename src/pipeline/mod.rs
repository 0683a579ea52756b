mod extract;
mod ffmpeg;
mod upscale;
mod progress;
mod merge;

use extract::Extract;
use upscale::Upscale;
use merge::Merge;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::model::Backend;
use crate::staging::Staging;

use std::path::PathBuf;

pub struct Pipeline;

impl Pipeline {
    pub fn execute(arguments: &Arguments) -> Result<PathBuf, Error> {
        Self::execute_with(arguments, |arguments| arguments.model.create(arguments.scale, arguments.device))
    }

    /// Runs extract, upscale and merge in order with a backend built by
    /// `create_backend`. Staging directories exist only while this runs.
    pub fn execute_with<F>(arguments: &Arguments, create_backend: F) -> Result<PathBuf, Error>
    where
        F: FnOnce(&Arguments) -> Result<Backend, Error>,
    {
        if !arguments.input.is_file() {
            return Err(Error::InputNotFound(arguments.input.clone()));
        }

        let backend = create_backend(arguments)?;
        let staging = Staging::create(&Staging::base_for(&arguments.input))?;

        let frames = Extract::execute(arguments, staging.frames_dir())?;
        let upscaled = Upscale::execute(arguments, &backend, &frames, staging.upscaled_dir())?;
        Merge::execute(arguments, &upscaled)?;

        Ok(arguments.output.clone())
    }
}
