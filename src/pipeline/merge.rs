use crate::arguments::Arguments;
use crate::error::Error;
use crate::frame::FrameSet;

use std::ffi::OsString;

use super::ffmpeg;

pub struct Merge;

impl Merge {

    const STAGE: &'static str = "reassembling video";
    const ENCODER: &'static str = "libx264";
    const PIXEL_FORMAT: &'static str = "yuv420p";

    pub fn ffmpeg_args(arguments: &Arguments, frames: &FrameSet) -> Vec<OsString> {
        vec![
            "-hide_banner".into(),
            "-y".into(),
            "-framerate".into(), arguments.frame_rate.to_string().into(),
            "-i".into(), frames.pattern().into_os_string(),
            "-c:v".into(), Self::ENCODER.into(),
            "-pix_fmt".into(), Self::PIXEL_FORMAT.into(),
            "-crf".into(), arguments.crf.to_string().into(),
            arguments.output.clone().into_os_string(),
        ]
    }

    pub fn execute(arguments: &Arguments, frames: &FrameSet) -> Result<(), Error> {
        log::info!("Reassembling video to {}...", arguments.output.display());
        ffmpeg::run(&arguments.ffmpeg, &Self::ffmpeg_args(arguments, frames), Self::STAGE)?;
        log::info!("Video saved to {}", arguments.output.display());
        Ok(())
    }

}
