mod arguments;
mod error;
mod frame;
mod model;
mod pipeline;
mod staging;

use arguments::Arguments;
use error::Error;
use pipeline::Pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

fn run_pipeline() -> Result<Option<PathBuf>, Error> {
    let arguments = Arguments::parse()?;
    if arguments.help {
        Arguments::print_help();
        return Ok(None);
    }
    arguments.print_options();
    Pipeline::execute(&arguments).map(Some)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    match run_pipeline() {
        Ok(Some(output)) => {
            println!("\nSuccess! Upscaled video saved to: {}", output.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{}", error);
            if error.is_usage() {
                Arguments::print_help();
            }
            ExitCode::FAILURE
        }
    }
}
