use crate::arguments::Arguments;
use crate::error::Error;
use crate::frame::{Frame, FrameSet};
use crate::model::Backend;

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{bounded, Receiver};
use image::ImageFormat;

use super::progress::Progress;

pub struct Upscale;

impl Upscale {

    fn process_frame(backend: &Backend, frame: &Frame, output_dir: &Path) -> Result<(), Error> {
        let image = image::open(&frame.path)?;
        let upscaled = backend.process(&image)?;
        upscaled.save_with_format(Frame::new(output_dir, frame.index).path, ImageFormat::Png)?;
        Ok(())
    }

    fn process_incoming_frames(
        receiver: Receiver<&Frame>,
        backend: &Backend,
        output_dir: &Path,
        total: usize,
        progress: &Progress,
        shutdown_flag: &AtomicBool,
    ) -> Result<(), Error> {
        for frame in receiver.iter() {
            if shutdown_flag.load(Ordering::SeqCst) {
                break;
            }
            log::debug!("Processing frame {}/{}: {}", frame.index, total, frame.name());
            if let Err(e) = Self::process_frame(backend, frame, output_dir) {
                shutdown_flag.store(true, Ordering::SeqCst);
                return Err(e);
            }
            progress.frame_done();
        }
        Ok(())
    }

    /// Upscales every frame of `input` into `output_dir` under the same file
    /// name. Frames are handed out in index order to `arguments.jobs`
    /// workers; the first failure stops the stage.
    pub fn execute(
        arguments: &Arguments,
        backend: &Backend,
        input: &FrameSet,
        output_dir: &Path,
    ) -> Result<FrameSet, Error> {
        log::info!("Upscaling frames (scale={}x, model={})...", arguments.scale, backend.model());
        fs::create_dir_all(output_dir)?;

        let total = input.len();
        let jobs = arguments.jobs.max(1);
        let progress = Progress::new(arguments, total);
        let shutdown_flag = AtomicBool::new(false);

        let results = thread::scope(|scope| {
            let (sender, receiver) = bounded(jobs);
            let workers: Vec<_> = (0..jobs)
                .map(|_| {
                    let receiver = receiver.clone();
                    let progress = &progress;
                    let shutdown_flag = &shutdown_flag;
                    scope.spawn(move || {
                        Self::process_incoming_frames(receiver, backend, output_dir, total, progress, shutdown_flag)
                    })
                })
                .collect();
            drop(receiver);

            for frame in input.frames() {
                if shutdown_flag.load(Ordering::SeqCst) || sender.send(frame).is_err() {
                    break;
                }
            }
            drop(sender);

            workers.into_iter()
                .map(|worker| worker.join().unwrap_or(Err(Error::WorkerPanicked)))
                .collect::<Vec<Result<(), Error>>>()
        });

        if let Some(error) = results.into_iter().find_map(Result::err) {
            progress.abandon();
            return Err(error);
        }
        progress.finish();

        let output = FrameSet::scan(output_dir)?;
        if output.names() != input.names() {
            return Err(Error::FrameCountMismatch { expected: total, found: output.len() });
        }
        log::info!("Upscaled {} frames into {}", progress.position(), output.directory().display());
        Ok(output)
    }

}
