use crate::utils::logging::*;
use thiserror::Error;

/// Errors returned by draw, show and save operations.
///
/// `Argument` is the only variant caused by caller input; it is raised before any output
/// is produced. The remaining variants wrap failures of the image, filesystem and
/// GStreamer collaborators.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Argument Error: {0}")]
    Argument(#[from] ArgumentEntry),

    #[error("IO Error: {0}")]
    Io(#[from] IOEntry),

    #[error("GStreamer Error: {0}")]
    GStreamer(#[from] GStreamerEntry),

    #[error("Image Error: {0}")]
    Image(#[from] image::ImageError),
}

impl PredictionError {
    pub fn as_argument(&self) -> Option<&ArgumentEntry> {
        match self {
            PredictionError::Argument(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn to_log_entry(&self) -> LogEntry {
        match self {
            PredictionError::Argument(_) => warning_entry!(self.to_string()),
            _ => error_entry!(self.to_string()),
        }
    }
}

impl From<PredictionError> for String {
    #[inline(always)]
    fn from(value: PredictionError) -> Self {
        value.to_string()
    }
}
