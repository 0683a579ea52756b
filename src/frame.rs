use crate::error::Error;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: usize,
    pub path: PathBuf,
}

impl Frame {
    const PREFIX: &'static str = "frame_";
    const EXTENSION: &'static str = "png";
    const DIGITS: usize = 6;

    /// printf-style pattern handed to ffmpeg for both decoding and encoding.
    pub const PATTERN: &'static str = "frame_%06d.png";

    pub fn new(directory: &Path, index: usize) -> Self {
        Self { index, path: directory.join(Self::file_name(index)) }
    }

    pub fn file_name(index: usize) -> String {
        format!("{}{:0width$}.{}", Self::PREFIX, index, Self::EXTENSION, width = Self::DIGITS)
    }

    /// Inverse of `file_name`. Indices past 999999 grow beyond six digits,
    /// the same way `%06d` does, but never carry extra leading zeros.
    pub fn parse_index(file_name: &str) -> Option<usize> {
        let digits = file_name
            .strip_prefix(Self::PREFIX)?
            .strip_suffix(Self::EXTENSION)?
            .strip_suffix('.')?;
        if digits.len() < Self::DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if digits.len() > Self::DIGITS && digits.starts_with('0') {
            return None;
        }
        digits.parse().ok()
    }

    pub fn name(&self) -> String {
        Self::file_name(self.index)
    }

    pub fn pattern(directory: &Path) -> PathBuf {
        directory.join(Self::PATTERN)
    }
}

#[derive(Debug)]
pub struct FrameSet {
    directory: PathBuf,
    frames: Vec<Frame>,
}

impl FrameSet {
    pub fn scan(directory: &Path) -> Result<Self, Error> {
        let mut frames = fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|kind| kind.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                entry.file_name().to_str()
                    .and_then(Frame::parse_index)
                    .map(|index| Frame { index, path: entry.path() })
            })
            .collect::<Vec<Frame>>();
        frames.sort_by_key(|frame| frame.index);
        Ok(Self { directory: directory.to_path_buf(), frames })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn pattern(&self) -> PathBuf {
        Frame::pattern(&self.directory)
    }

    pub fn names(&self) -> Vec<String> {
        self.frames.iter().map(Frame::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(directory: &Path, name: &str) {
        fs::write(directory.join(name), b"").unwrap();
    }

    #[test]
    fn file_name_is_zero_padded_to_six_digits() {
        assert_eq!(Frame::file_name(1), "frame_000001.png");
        assert_eq!(Frame::file_name(123456), "frame_123456.png");
        assert_eq!(Frame::file_name(1000000), "frame_1000000.png");
    }

    #[test]
    fn parse_index_accepts_only_the_naming_convention() {
        assert_eq!(Frame::parse_index("frame_000042.png"), Some(42));
        assert_eq!(Frame::parse_index("frame_42.png"), None);
        assert_eq!(Frame::parse_index("frame_000042.jpg"), None);
        assert_eq!(Frame::parse_index("frame_00004a.png"), None);
        assert_eq!(Frame::parse_index("thumb_000042.png"), None);
        assert_eq!(Frame::parse_index("frame_000042png"), None);
        assert_eq!(Frame::parse_index("frame_1000000.png"), Some(1000000));
        assert_eq!(Frame::parse_index("frame_0000042.png"), None);
    }

    #[test]
    fn scan_keeps_frames_past_six_digits() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &Frame::file_name(1000000));
        touch(dir.path(), &Frame::file_name(999999));

        let set = FrameSet::scan(dir.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["frame_999999.png", "frame_1000000.png"]);
    }

    #[test]
    fn scan_orders_frames_by_index_and_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        for index in [3, 1, 10, 2] {
            touch(dir.path(), &Frame::file_name(index));
        }
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "frame_7.png");
        fs::create_dir(dir.path().join("frame_000099.png")).unwrap();

        let set = FrameSet::scan(dir.path()).unwrap();
        let indices: Vec<usize> = set.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 10]);
        assert_eq!(set.frames()[0].path, dir.path().join("frame_000001.png"));
    }

    #[test]
    fn pattern_resolves_ten_frames_in_ascending_order() {
        let dir = tempfile::tempdir().unwrap();
        for index in (1..=10).rev() {
            touch(dir.path(), &Frame::file_name(index));
        }
        let set = FrameSet::scan(dir.path()).unwrap();
        assert_eq!(set.pattern(), dir.path().join("frame_%06d.png"));

        // Expand the printf pattern the way the encoder does: 1, 2, ... until a gap.
        let resolved: Vec<String> = (1..)
            .map(|index| Frame::new(dir.path(), index))
            .take_while(|frame| frame.path.is_file())
            .map(|frame| frame.name())
            .collect();
        assert_eq!(resolved.len(), 10);
        assert_eq!(resolved, set.names());
        assert_eq!(resolved.first().map(String::as_str), Some("frame_000001.png"));
        assert_eq!(resolved.last().map(String::as_str), Some("frame_000010.png"));
    }

    #[test]
    fn scan_of_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FrameSet::scan(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
