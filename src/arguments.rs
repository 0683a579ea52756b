use crate::error::Error;
use crate::model::{Model, Scale};

use std::path::{Path, PathBuf};

pub struct Arguments {
    pub input: PathBuf,
    pub output: PathBuf,
    pub scale: Scale,
    pub model: Model,
    pub device: u32,
    pub jobs: usize,
    pub frame_rate: u32,
    pub crf: u8,
    pub ffmpeg: String,
    pub help: bool,
}

/// Raw values as read from the command line, before defaults are derived.
#[derive(Default)]
struct Parsed {
    positional: Vec<String>,
    model: Option<String>,
    device: Option<u32>,
    jobs: Option<usize>,
    frame_rate: Option<u32>,
    crf: Option<u8>,
    ffmpeg: Option<String>,
    help: bool,
}

impl Arguments {
    pub const FFMPEG_ENV: &'static str = "VIDEO_UPSCALER_FFMPEG";
    const DEFAULT_FFMPEG: &'static str = "ffmpeg";
    const DEFAULT_FRAME_RATE: u32 = 30;
    const DEFAULT_CRF: u8 = 18;
    const MAX_CRF: u8 = 51;

    pub fn parse() -> Result<Self, Error> {
        Self::parse_with_env(std::env::args().skip(1), std::env::var(Self::FFMPEG_ENV).ok())
    }

    /// Parses everything after the program name.
    pub fn parse_from<I>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::parse_with_env(args, None)
    }

    /// `env_ffmpeg` only fills in for a missing `--ffmpeg`.
    fn parse_with_env<I>(args: I, env_ffmpeg: Option<String>) -> Result<Self, Error>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut parsed = Self::parse_arguments(&args)?;
        if parsed.ffmpeg.is_none() {
            parsed.ffmpeg = env_ffmpeg.filter(|ffmpeg| !ffmpeg.is_empty());
        }
        if parsed.help {
            return Ok(Self::help_only());
        }
        Self::from_parsed(parsed)
    }

    fn parse_arguments(args: &[String]) -> Result<Parsed, Error> {
        let mut parsed = Parsed::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "-m" | "--model" => parsed.model = Some(Self::get_next_arg(args, &mut i, "model")?),
                "-d" | "--device" => parsed.device = Some(Self::parse_numeric_arg(args, &mut i, "device")?),
                "-j" | "--jobs" => parsed.jobs = Some(Self::parse_numeric_arg(args, &mut i, "jobs")?),
                "-r" | "--fps" => parsed.frame_rate = Some(Self::parse_numeric_arg(args, &mut i, "fps")?),
                "-q" | "--crf" => parsed.crf = Some(Self::parse_numeric_arg(args, &mut i, "crf")?),
                "--ffmpeg" => parsed.ffmpeg = Some(Self::get_next_arg(args, &mut i, "ffmpeg")?),
                "-h" | "--help" => parsed.help = true,
                arg if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(Error::UnknownArgument(arg.to_string()))
                }
                arg => parsed.positional.push(arg.to_string()),
            }
            i += 1;
        }

        Ok(parsed)
    }

    fn get_next_arg(args: &[String], index: &mut usize, arg_name: &str) -> Result<String, Error> {
        *index += 1;
        args.get(*index)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(|| Error::EmptyArgument(arg_name.to_string()))
    }

    fn parse_numeric_arg<T: std::str::FromStr>(args: &[String], index: &mut usize, arg_name: &str) -> Result<T, Error> {
        let value = Self::get_next_arg(args, index, arg_name)?;
        value.parse().map_err(|_| Error::InvalidArgument(format!("{}: {}", arg_name, value)))
    }

    fn from_parsed(parsed: Parsed) -> Result<Self, Error> {
        let mut positional = parsed.positional.into_iter();
        let input = positional.next()
            .map(PathBuf::from)
            .ok_or_else(|| Error::MissingArgument("input_video".to_string()))?;
        let scale = positional.next()
            .map(|value| value.parse::<Scale>())
            .transpose()?
            .unwrap_or_default();
        let output = positional.next()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::default_output(&input, scale));
        if let Some(extra) = positional.next() {
            return Err(Error::UnknownArgument(extra));
        }

        let model = Model::select(parsed.model.as_deref(), scale)?;

        let jobs = parsed.jobs.unwrap_or(1);
        if jobs == 0 {
            return Err(Error::InvalidArgument("jobs must be at least 1".to_string()));
        }

        let frame_rate = parsed.frame_rate.unwrap_or(Self::DEFAULT_FRAME_RATE);
        if frame_rate == 0 {
            return Err(Error::InvalidArgument("fps must be at least 1".to_string()));
        }

        let crf = parsed.crf.unwrap_or(Self::DEFAULT_CRF);
        if crf > Self::MAX_CRF {
            return Err(Error::InvalidArgument(format!("crf must be between 0 and {}, got {}", Self::MAX_CRF, crf)));
        }

        Ok(Self {
            input,
            output,
            scale,
            model,
            device: parsed.device.unwrap_or(0),
            jobs,
            frame_rate,
            crf,
            ffmpeg: parsed.ffmpeg.unwrap_or_else(|| Self::DEFAULT_FFMPEG.to_string()),
            help: false,
        })
    }

    fn help_only() -> Self {
        Self {
            input: PathBuf::new(),
            output: PathBuf::new(),
            scale: Scale::default(),
            model: Model::Lanczos(Scale::default()),
            device: 0,
            jobs: 1,
            frame_rate: Self::DEFAULT_FRAME_RATE,
            crf: Self::DEFAULT_CRF,
            ffmpeg: Self::DEFAULT_FFMPEG.to_string(),
            help: true,
        }
    }

    /// `clip.mp4` becomes `clip_upscaled_<scale>x.mp4` next to the input.
    /// Other extensions are kept, a missing one becomes `.mp4`.
    pub fn default_output(input: &Path, scale: Scale) -> PathBuf {
        let suffix = format!("_upscaled_{}x", scale);
        let file_name = input.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let file_name = match file_name.strip_suffix(".mp4") {
            Some(stem) => format!("{}{}.mp4", stem, suffix),
            None => match input.extension() {
                Some(extension) => format!(
                    "{}{}.{}",
                    input.file_stem().unwrap_or_default().to_string_lossy(),
                    suffix,
                    extension.to_string_lossy()
                ),
                None => format!("{}{}.mp4", file_name, suffix),
            },
        };
        input.with_file_name(file_name)
    }

    pub fn print_help() {
        println!("Usage: video_upscaler <input_video> [scale] [output_video] [OPTIONS]");
        println!("  scale: 2 or 4 (default: 2)");
        println!("  output_video: defaults to <input>_upscaled_<scale>x.mp4");
        println!("Options:");
        println!("  -m, --model MODEL   Upscaler: {} (default: {})", Model::NAMES.join(", "), Model::default_name());
        println!("  -d, --device INDEX  Compute device index (default: 0)");
        println!("  -j, --jobs COUNT    Frames upscaled in parallel (default: 1)");
        println!("  -r, --fps RATE      Sampling and output frame rate (default: {})", Self::DEFAULT_FRAME_RATE);
        println!("  -q, --crf VALUE     Encoder quality 0-{} (default: {})", Self::MAX_CRF, Self::DEFAULT_CRF);
        println!("      --ffmpeg PATH   FFmpeg program (default: ${} or ffmpeg)", Self::FFMPEG_ENV);
        println!("  -h, --help          Show this help message");
    }

    pub fn print_options(&self) {
        log::info!("Input:      {}", self.input.display());
        log::info!("Output:     {}", self.output.display());
        log::info!("Scale:      {}x", self.scale);
        log::info!("Model:      {}", self.model);
        log::info!("Device:     {}", self.device);
        log::info!("Frame rate: {}", self.frame_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Arguments, Error> {
        Arguments::parse_from(args.iter().copied())
    }

    #[test]
    fn defaults_with_only_an_input() {
        let arguments = parse(&["videos/clip.mp4"]).unwrap();
        assert_eq!(arguments.input, PathBuf::from("videos/clip.mp4"));
        assert_eq!(arguments.scale, Scale::X2);
        assert_eq!(arguments.output, PathBuf::from("videos/clip_upscaled_2x.mp4"));
        assert_eq!(arguments.device, 0);
        assert_eq!(arguments.jobs, 1);
        assert_eq!(arguments.frame_rate, 30);
        assert_eq!(arguments.crf, 18);
        assert_eq!(arguments.ffmpeg, "ffmpeg");
        assert!(!arguments.help);
    }

    #[test]
    fn scale_four_derives_the_output_name() {
        let arguments = parse(&["clip.mp4", "4"]).unwrap();
        assert_eq!(arguments.scale, Scale::X4);
        assert_eq!(arguments.output, PathBuf::from("clip_upscaled_4x.mp4"));
    }

    #[test]
    fn explicit_output_wins() {
        let arguments = parse(&["clip.mp4", "4", "out/big.mp4"]).unwrap();
        assert_eq!(arguments.output, PathBuf::from("out/big.mp4"));
    }

    #[test]
    fn default_output_for_other_extensions() {
        assert_eq!(
            Arguments::default_output(Path::new("a/movie.mkv"), Scale::X2),
            PathBuf::from("a/movie_upscaled_2x.mkv")
        );
        assert_eq!(
            Arguments::default_output(Path::new("movie"), Scale::X4),
            PathBuf::from("movie_upscaled_4x.mp4")
        );
        // Only the file name is rewritten.
        assert_eq!(
            Arguments::default_output(Path::new("x.mp4.d/clip.mp4"), Scale::X2),
            PathBuf::from("x.mp4.d/clip_upscaled_2x.mp4")
        );
    }

    #[test]
    fn missing_input_is_reported() {
        let error = parse(&[]).err().unwrap();
        assert!(matches!(error, Error::MissingArgument(_)));
        assert!(error.is_usage());
    }

    #[test]
    fn invalid_scale_is_rejected() {
        assert!(matches!(parse(&["clip.mp4", "3"]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn options_are_parsed_anywhere() {
        let arguments = parse(&[
            "-j", "4", "clip.mp4", "--device", "1", "4", "-m", "lanczos", "--fps", "24", "-q", "20",
            "--ffmpeg", "/opt/ffmpeg",
        ])
        .unwrap();
        assert_eq!(arguments.jobs, 4);
        assert_eq!(arguments.device, 1);
        assert_eq!(arguments.scale, Scale::X4);
        assert_eq!(arguments.model, Model::Lanczos(Scale::X4));
        assert_eq!(arguments.frame_rate, 24);
        assert_eq!(arguments.crf, 20);
        assert_eq!(arguments.ffmpeg, "/opt/ffmpeg");
    }

    #[test]
    fn bad_option_values_are_rejected() {
        assert!(matches!(parse(&["clip.mp4", "--jobs", "0"]), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "--jobs", "many"]), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "--crf", "60"]), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "--fps", "0"]), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "--device"]), Err(Error::EmptyArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "--bogus"]), Err(Error::UnknownArgument(_))));
        assert!(matches!(parse(&["a.mp4", "2", "b.mp4", "c.mp4"]), Err(Error::UnknownArgument(_))));
        assert!(matches!(parse(&["clip.mp4", "-m", "waifu2x"]), Err(Error::UnsupportedModel(_))));
    }

    #[test]
    fn command_line_ffmpeg_wins_over_the_environment() {
        let explicit = Arguments::parse_with_env(["clip.mp4", "--ffmpeg", "ffmpeg"], Some("/opt/ffmpeg".to_string()));
        assert_eq!(explicit.unwrap().ffmpeg, "ffmpeg");

        let from_env = Arguments::parse_with_env(["clip.mp4"], Some("/opt/ffmpeg".to_string()));
        assert_eq!(from_env.unwrap().ffmpeg, "/opt/ffmpeg");

        let empty_env = Arguments::parse_with_env(["clip.mp4"], Some(String::new()));
        assert_eq!(empty_env.unwrap().ffmpeg, "ffmpeg");
    }

    #[test]
    fn help_short_circuits_validation() {
        assert!(parse(&["--help"]).unwrap().help);
        assert!(parse(&["clip.mp4", "7", "-h"]).unwrap().help);
    }
}
