use crate::error::PredictionError;
use crate::utils::config::Config;
use crate::visualization::media::{GStreamerMedia, MediaOutput};
use crate::visualization::painter::{ImageprocPainter, Painter};
use image::Rgb;

/// Collaborators used by every `draw`, `show` and `save` call.
pub struct Visualizer {
    painter: Box<dyn Painter>,
    media: Box<dyn MediaOutput>,
    caption_color: Rgb<u8>,
    progress_interval: usize,
}

impl Visualizer {
    pub fn new(painter: Box<dyn Painter>, media: Box<dyn MediaOutput>) -> Self {
        let config = Config::now();
        Self {
            painter,
            media,
            caption_color: Rgb(config.caption_color),
            progress_interval: config.progress_interval,
        }
    }

    /// Builds the imageproc painter and the GStreamer media output from the current configuration.
    pub fn from_config() -> Result<Self, PredictionError> {
        let config = Config::now();
        let painter = ImageprocPainter::from_config(&config);
        let media = GStreamerMedia::new(&config)?;
        Ok(Self::new(Box::new(painter), Box::new(media)))
    }

    pub fn painter(&self) -> &dyn Painter {
        self.painter.as_ref()
    }

    pub fn media(&self) -> &dyn MediaOutput {
        self.media.as_ref()
    }

    pub fn caption_color(&self) -> Rgb<u8> {
        self.caption_color
    }

    pub fn progress_interval(&self) -> usize {
        self.progress_interval.max(1)
    }
}
