use crate::arguments::Arguments;
use crate::error::Error;
use crate::frame::{Frame, FrameSet};

use std::ffi::OsString;
use std::fs;
use std::path::Path;

use super::ffmpeg;

pub struct Extract;

impl Extract {

    const STAGE: &'static str = "extracting frames";

    pub fn ffmpeg_args(arguments: &Arguments, output_dir: &Path) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-i".into(), arguments.input.clone().into_os_string(),
            "-vf".into(), format!("fps={}", arguments.frame_rate).into(),
            Frame::pattern(output_dir).into_os_string(),
        ]
    }

    pub fn execute(arguments: &Arguments, output_dir: &Path) -> Result<FrameSet, Error> {
        log::info!("Extracting frames from {}...", arguments.input.display());
        fs::create_dir_all(output_dir)?;

        ffmpeg::run(&arguments.ffmpeg, &Self::ffmpeg_args(arguments, output_dir), Self::STAGE)?;

        let frames = FrameSet::scan(output_dir)?;
        if frames.is_empty() {
            return Err(Error::NoFramesExtracted(arguments.input.clone()));
        }
        log::info!("Extracted {} frames", frames.len());
        Ok(frames)
    }

}
