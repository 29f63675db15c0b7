use crate::error::PredictionError;
use crate::results::single::{
    ClassificationDrawOptions, DetectionDrawOptions, ImageClassificationPrediction, ImageDetectionPrediction,
    ImagePrediction, ImageSegmentationPrediction, SegmentationDrawOptions,
};
use crate::utils::logging::*;
use crate::visualization::visualizer::Visualizer;
use image::Rgb;
use std::fs;
use std::ops::Index;
use std::path::{Path, PathBuf};

/// Ordered predictions over a list of images. Can be iterated any number of times.
pub struct ImagesPredictions<P> {
    predictions: Vec<P>,
}

impl<P> ImagesPredictions<P> {
    pub fn new(predictions: Vec<P>) -> Self {
        Self { predictions }
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&P> {
        self.predictions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, P> {
        self.predictions.iter()
    }
}

impl<P> From<Vec<P>> for ImagesPredictions<P> {
    fn from(predictions: Vec<P>) -> Self {
        Self::new(predictions)
    }
}

impl<P> Index<usize> for ImagesPredictions<P> {
    type Output = P;

    fn index(&self, index: usize) -> &Self::Output {
        &self.predictions[index]
    }
}

impl<P> IntoIterator for ImagesPredictions<P> {
    type Item = P;
    type IntoIter = std::vec::IntoIter<P>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.into_iter()
    }
}

impl<'a, P> IntoIterator for &'a ImagesPredictions<P> {
    type Item = &'a P;
    type IntoIter = std::slice::Iter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.predictions.iter()
    }
}

pub trait ImagesVisualization {
    type Options;

    /// Shows every image in order.
    fn show(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<(), PredictionError>;

    /// Writes `pred_<index>.jpg` for every image into `output_folder`, creating it first.
    fn save(&self, visualizer: &Visualizer, output_folder: &Path, options: &Self::Options) -> Result<(), PredictionError>;
}

fn create_output_folder(output_folder: &Path) -> Result<(), PredictionError> {
    fs::create_dir_all(output_folder)
        .map_err(|err| IOEntry::CreateDirectoryError(output_folder.to_path_buf(), err))?;
    Ok(())
}

fn prediction_path(output_folder: &Path, index: usize) -> PathBuf {
    output_folder.join(format!("pred_{index}.jpg"))
}

impl ImagesVisualization for ImagesPredictions<ImageClassificationPrediction> {
    type Options = ClassificationDrawOptions;

    fn show(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<(), PredictionError> {
        self.iter().try_for_each(|prediction| prediction.show(visualizer, options))
    }

    fn save(&self, visualizer: &Visualizer, output_folder: &Path, options: &Self::Options) -> Result<(), PredictionError> {
        create_output_folder(output_folder)?;
        for (index, prediction) in self.iter().enumerate() {
            prediction.save(visualizer, &prediction_path(output_folder, index), options)?;
        }
        Ok(())
    }
}

impl ImagesVisualization for ImagesPredictions<ImageSegmentationPrediction> {
    type Options = SegmentationDrawOptions;

    fn show(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<(), PredictionError> {
        self.iter().try_for_each(|prediction| prediction.show(visualizer, options))
    }

    fn save(&self, visualizer: &Visualizer, output_folder: &Path, options: &Self::Options) -> Result<(), PredictionError> {
        create_output_folder(output_folder)?;
        for (index, prediction) in self.iter().enumerate() {
            prediction.save(visualizer, &prediction_path(output_folder, index), options)?;
        }
        Ok(())
    }
}

/// Ground truth for one image, or one entry per image.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets<T> {
    Single(Vec<T>),
    Batch(Vec<Vec<T>>),
}

impl<T> Targets<T> {
    fn into_batch(self) -> Vec<Vec<T>> {
        match self {
            Targets::Single(targets) => vec![targets],
            Targets::Batch(targets) => targets,
        }
    }
}

pub type PerImageTargets = (Vec<Option<Vec<[f32; 4]>>>, Vec<Option<Vec<usize>>>);

#[derive(Debug, Clone, PartialEq)]
pub struct ImagesDetectionOptions {
    pub box_thickness: Option<u32>,
    pub show_confidence: bool,
    pub color_mapping: Option<Vec<Rgb<u8>>>,
    pub class_names: Option<Vec<String>>,
    pub target_bboxes: Option<Targets<[f32; 4]>>,
    pub target_bboxes_format: Option<String>,
    pub target_class_ids: Option<Targets<usize>>,
}

impl Default for ImagesDetectionOptions {
    fn default() -> Self {
        Self {
            box_thickness: None,
            show_confidence: true,
            color_mapping: None,
            class_names: None,
            target_bboxes: None,
            target_bboxes_format: None,
            target_class_ids: None,
        }
    }
}

impl ImagesDetectionOptions {
    fn image_options(&self, target_bboxes: Option<Vec<[f32; 4]>>, target_class_ids: Option<Vec<usize>>) -> DetectionDrawOptions {
        DetectionDrawOptions {
            box_thickness: self.box_thickness,
            show_confidence: self.show_confidence,
            color_mapping: self.color_mapping.clone(),
            class_names: self.class_names.clone(),
            target_bboxes,
            target_bboxes_format: self.target_bboxes_format.clone(),
            target_class_ids,
        }
    }
}

impl ImagesPredictions<ImageDetectionPrediction> {
    /// Splits ground truth into one entry per image.
    ///
    /// The three arguments are either all set or all unset. When unset, every image gets a
    /// `None` placeholder. A single target list is treated as a batch of one.
    pub fn check_target_args(&self, target_bboxes: Option<Targets<[f32; 4]>>, target_bboxes_format: Option<&str>,
                             target_class_ids: Option<Targets<usize>>) -> Result<PerImageTargets, ArgumentEntry>
    {
        let (target_bboxes, target_class_ids) = match (target_bboxes, target_bboxes_format, target_class_ids) {
            (None, None, None) => return Ok((vec![None; self.len()], vec![None; self.len()])),
            (Some(target_bboxes), Some(_), Some(target_class_ids)) => (target_bboxes.into_batch(), target_class_ids.into_batch()),
            _ => return Err(ArgumentEntry::PartialTargetArguments),
        };
        if target_bboxes.len() != target_class_ids.len() {
            return Err(ArgumentEntry::TargetLengthMismatch(target_bboxes.len(), target_class_ids.len()));
        }
        if target_bboxes.len() != self.len() {
            return Err(ArgumentEntry::TargetImageCountMismatch(target_bboxes.len(), self.len()));
        }
        Ok((
            target_bboxes.into_iter().map(Some).collect(),
            target_class_ids.into_iter().map(Some).collect(),
        ))
    }

    fn image_options(&self, options: &ImagesDetectionOptions) -> Result<Vec<DetectionDrawOptions>, ArgumentEntry> {
        let (target_bboxes, target_class_ids) = self.check_target_args(
            options.target_bboxes.clone(),
            options.target_bboxes_format.as_deref(),
            options.target_class_ids.clone(),
        )?;
        Ok(target_bboxes.into_iter()
            .zip(target_class_ids)
            .map(|(target_bboxes, target_class_ids)| options.image_options(target_bboxes, target_class_ids))
            .collect())
    }
}

impl ImagesVisualization for ImagesPredictions<ImageDetectionPrediction> {
    type Options = ImagesDetectionOptions;

    fn show(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<(), PredictionError> {
        let image_options = self.image_options(options)?;
        for (prediction, options) in self.iter().zip(&image_options) {
            prediction.show(visualizer, options)?;
        }
        Ok(())
    }

    fn save(&self, visualizer: &Visualizer, output_folder: &Path, options: &Self::Options) -> Result<(), PredictionError> {
        let image_options = self.image_options(options)?;
        create_output_folder(output_folder)?;
        for (index, (prediction, options)) in self.iter().zip(&image_options).enumerate() {
            prediction.save(visualizer, &prediction_path(output_folder, index), options)?;
        }
        Ok(())
    }
}
