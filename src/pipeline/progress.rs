use crate::arguments::Arguments;

use std::fmt::Write;
use std::time::Instant;
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

pub struct Progress {
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl Progress {

    const TEMPLATE: &'static str = "[{elapsed_precise}] [{eta_precise}] [{wide_bar:.white/green}] {pos}/{len} {percent} {msg}";

    fn create_progress_bar(arguments: &Arguments, total: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(total as u64);
        let options_template = format!(
            "[scale: {}x] [model: {}] [jobs: {}]",
            arguments.scale,
            arguments.model,
            arguments.jobs,
        );
        // The template is a constant; a rejected one only loses the styling.
        if let Ok(style) = ProgressStyle::default_bar().template(&format!("{}\n{}", options_template, Self::TEMPLATE)) {
            let style = style
                .progress_chars("█▓▒░-")
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| { let _ = write!(w, "{:.1}s", state.eta().as_secs_f64()); })
                .with_key("percent", |state: &ProgressState, w: &mut dyn Write| { let _ = write!(w, "({:.0}%)", state.fraction() * 100.0); });
            progress_bar.set_style(style);
        }
        progress_bar
    }

    pub fn new(arguments: &Arguments, total: usize) -> Self {
        let progress = Self {
            progress_bar: Self::create_progress_bar(arguments, total),
            start_time: Instant::now(),
        };
        progress.progress_bar.set_message("[fps: 0]");
        progress
    }

    pub fn frame_done(&self) {
        self.progress_bar.inc(1);
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let frame_rate = self.progress_bar.position() as f64 / elapsed;
            self.progress_bar.set_message(format!("[fps: {:.1}]", frame_rate));
        }
    }

    pub fn position(&self) -> u64 {
        self.progress_bar.position()
    }

    pub fn finish(&self) {
        self.progress_bar.finish();
    }

    pub fn abandon(&self) {
        self.progress_bar.abandon();
    }

}
