use crate::error::PredictionError;
use crate::results::single::{
    resolve_class_ids_to_show, DetectionDrawOptions, ImageDetectionPrediction, ImagePrediction,
    ImageSegmentationPrediction, SegmentationDrawOptions,
};
use crate::utils::logging::*;
use crate::visualization::media::FrameResult;
use crate::visualization::visualizer::Visualizer;
use image::{Rgb, RgbImage};
use std::iter::Peekable;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct VideoDetectionOptions {
    pub box_thickness: Option<u32>,
    pub show_confidence: bool,
    pub color_mapping: Option<Vec<Rgb<u8>>>,
    pub class_names: Option<Vec<String>>,
}

impl Default for VideoDetectionOptions {
    fn default() -> Self {
        Self {
            box_thickness: None,
            show_confidence: true,
            color_mapping: None,
            class_names: None,
        }
    }
}

impl From<&VideoDetectionOptions> for DetectionDrawOptions {
    fn from(options: &VideoDetectionOptions) -> Self {
        DetectionDrawOptions {
            box_thickness: options.box_thickness,
            show_confidence: options.show_confidence,
            color_mapping: options.color_mapping.clone(),
            class_names: options.class_names.clone(),
            ..DetectionDrawOptions::default()
        }
    }
}

/// Detection results streamed frame by frame.
///
/// The frame source is consumed as it is drawn: once a `draw`, `show` or `save` has run to
/// the end, later calls see no frames. `n_frames` is the expected frame count and is only
/// used for progress reporting.
pub struct VideoDetectionPrediction {
    frames: Peekable<Box<dyn Iterator<Item = Result<ImageDetectionPrediction, PredictionError>>>>,
    pub fps: f64,
    pub n_frames: usize,
}

impl VideoDetectionPrediction {
    pub fn new<I>(frames: I, fps: f64, n_frames: usize) -> Self
    where
        I: IntoIterator<Item = ImageDetectionPrediction>,
        I::IntoIter: 'static,
    {
        Self::from_results(frames.into_iter().map(Ok), fps, n_frames)
    }

    /// Builds a stream whose frames may fail to load. A failed frame stops `show` and
    /// `save` with its error.
    pub fn from_results<I>(frames: I, fps: f64, n_frames: usize) -> Self
    where
        I: IntoIterator<Item = Result<ImageDetectionPrediction, PredictionError>>,
        I::IntoIter: 'static,
    {
        let frames: Box<dyn Iterator<Item = Result<ImageDetectionPrediction, PredictionError>>> = Box::new(frames.into_iter());
        Self {
            frames: frames.peekable(),
            fps,
            n_frames,
        }
    }

    /// Validates the requested classes against the first frame, then returns the frames
    /// drawn lazily in source order.
    pub fn draw<'a>(&'a mut self, visualizer: &'a Visualizer, options: &VideoDetectionOptions)
                    -> Result<impl Iterator<Item = FrameResult> + 'a, PredictionError>
    {
        if let Some(Ok(first_frame)) = self.frames.peek() {
            resolve_class_ids_to_show(&first_frame.class_names, options.class_names.as_deref())?;
        }
        let draw_options = DetectionDrawOptions::from(options);
        let n_frames = self.n_frames;
        let progress_interval = visualizer.progress_interval();
        Ok(self.frames.by_ref().enumerate().map(move |(index, frame)| {
            let drawn = frame.and_then(|frame| frame.draw(visualizer, &draw_options));
            let position = index + 1;
            if position % progress_interval == 0 || position == n_frames {
                logging_information!(PredictionEntry::VideoProgress(position, n_frames));
            }
            drawn
        }))
    }

    pub fn show(&mut self, visualizer: &Visualizer, options: &VideoDetectionOptions) -> Result<(), PredictionError> {
        let fps = self.fps;
        let frames = self.draw(visualizer, options)?;
        play_frames(frames, |frames| visualizer.media().show_video("Detection", frames, fps))
    }

    pub fn save(&mut self, visualizer: &Visualizer, output_path: &Path, options: &VideoDetectionOptions) -> Result<(), PredictionError> {
        let fps = self.fps;
        let frames = self.draw(visualizer, options)?;
        play_frames(frames, |frames| visualizer.media().save_video(output_path, frames, fps))
    }
}

/// Segmentation results for every frame of a video, held in memory.
pub struct VideoSegmentationPrediction {
    pub frames: Vec<ImageSegmentationPrediction>,
    pub fps: f64,
}

impl VideoSegmentationPrediction {
    pub fn new(frames: Vec<ImageSegmentationPrediction>, fps: f64) -> Self {
        Self { frames, fps }
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn draw(&self, visualizer: &Visualizer, options: &SegmentationDrawOptions) -> Result<Vec<RgbImage>, PredictionError> {
        self.frames.iter()
            .map(|frame| frame.draw(visualizer, options))
            .collect()
    }

    pub fn show(&self, visualizer: &Visualizer, options: &SegmentationDrawOptions) -> Result<(), PredictionError> {
        let frames = self.draw(visualizer, options)?;
        play_frames(frames.into_iter().map(Ok), |frames| visualizer.media().show_video("Segmentation", frames, self.fps))
    }

    pub fn save(&self, visualizer: &Visualizer, output_path: &Path, options: &SegmentationDrawOptions) -> Result<(), PredictionError> {
        let frames = self.draw(visualizer, options)?;
        play_frames(frames.into_iter().map(Ok), |frames| visualizer.media().save_video(output_path, frames, self.fps))
    }
}

fn play_frames<I, F>(frames: I, output: F) -> Result<(), PredictionError>
where
    I: Iterator<Item = FrameResult>,
    F: FnOnce(&mut dyn Iterator<Item = FrameResult>) -> Result<(), PredictionError>,
{
    let mut count = 0;
    let mut frames = frames.inspect(|frame| {
        if frame.is_ok() {
            count += 1;
        }
    });
    output(&mut frames)?;
    drop(frames);
    logging_information!(PredictionEntry::VideoComplete(count));
    Ok(())
}
