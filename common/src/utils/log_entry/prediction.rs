use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictionEntry {
    #[error("Processing video: frame {0}/{1}")]
    VideoProgress(usize, usize),
    #[error("Video processing finished after {0} frames")]
    VideoComplete(usize),
    #[error("Video stream produced no frames, nothing to encode")]
    EmptyVideo,
    #[error("Saved prediction to {}", .0.display())]
    SavedImage(PathBuf),
    #[error("Saved video to {}", .0.display())]
    SavedVideo(PathBuf),
    #[error("Font {0} is unavailable, text will not be drawn")]
    FontUnavailable(String),
    #[error("Display window {0} closed")]
    WindowClosed(String),
}

impl From<PredictionEntry> for String {
    #[inline(always)]
    fn from(value: PredictionEntry) -> Self {
        value.to_string()
    }
}
