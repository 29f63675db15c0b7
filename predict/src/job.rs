use image::{DynamicImage, Luma, Rgb, RgbImage};
use prediction::utils::logging::*;
use prediction::visualization::BoxFormat;
use prediction::*;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One visualization request read from a JSON job file.
///
/// A job with `fps` describes the frames of a video and writes a single video file to
/// `output`. Otherwise `output` is a folder receiving `pred_<index>.jpg`, or a file path
/// when the job holds exactly one image and `output` carries an extension.
#[derive(Debug, Deserialize)]
pub struct Job {
    #[serde(flatten)]
    pub task: Task,
    pub class_names: Vec<String>,
    pub output: PathBuf,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub options: JobOptions,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "task", content = "items", rename_all = "lowercase")]
pub enum Task {
    Classification(Vec<ClassificationItem>),
    Detection(Vec<DetectionItem>),
    Segmentation(Vec<SegmentationItem>),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobOptions {
    pub show_confidence: Option<bool>,
    pub box_thickness: Option<u32>,
    pub class_names: Option<Vec<String>>,
    pub color_mapping: Option<Vec<[u8; 3]>>,
    pub alpha: Option<f32>,
    pub target_bboxes_format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassificationItem {
    pub image: PathBuf,
    pub label: usize,
    pub confidence: f32,
}

#[derive(Debug, Deserialize)]
pub struct DetectionItem {
    pub image: PathBuf,
    pub bboxes: Vec<[f32; 4]>,
    #[serde(default = "default_bbox_format")]
    pub bbox_format: String,
    pub labels: Vec<usize>,
    pub confidence: Vec<f32>,
    #[serde(default)]
    pub target_bboxes: Option<Vec<[f32; 4]>>,
    #[serde(default)]
    pub target_class_ids: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
pub struct SegmentationItem {
    pub image: PathBuf,
    /// Single-channel image whose pixel values are class ids.
    pub mask: PathBuf,
}

fn default_bbox_format() -> String {
    BoxFormat::Xyxy.to_string()
}

impl Job {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let json_string = fs::read_to_string(path)
            .map_err(|err| String::from(IOEntry::ReadFileError(path.to_path_buf(), err)))?;
        serde_json::from_str(&json_string)
            .map_err(|err| format!("Invalid job file {}: {err}", path.display()))
    }

    pub fn item_count(&self) -> usize {
        match &self.task {
            Task::Classification(items) => items.len(),
            Task::Detection(items) => items.len(),
            Task::Segmentation(items) => items.len(),
        }
    }

    fn single_output(&self) -> bool {
        self.item_count() == 1 && self.output.extension().is_some()
    }

    pub fn execute(self, visualizer: &Visualizer, show: bool) -> Result<(), PredictionError> {
        let single_output = self.single_output();
        let Job { task, class_names, output, fps, options } = self;
        match (task, fps) {
            (Task::Classification(items), _) => {
                let options = options.classification();
                let predictions = items.into_iter()
                    .map(|item| item.into_prediction(&class_names))
                    .collect::<Result<Vec<_>, _>>()?;
                let images = ImagesPredictions::new(predictions);
                if single_output && !show {
                    return images[0].save(visualizer, &output, &options);
                }
                run_images(visualizer, &images, &output, &options, show)
            }
            (Task::Detection(items), Some(fps)) => {
                let options = options.video_detection();
                let n_frames = items.len();
                let frames = items.into_iter().map(move |item| item.into_prediction(&class_names));
                let mut video = VideoDetectionPrediction::from_results(frames, fps, n_frames);
                if show {
                    video.show(visualizer, &options)
                } else {
                    video.save(visualizer, &output, &options)
                }
            }
            (Task::Detection(items), None) => {
                let options = options.images_detection(&items);
                let predictions = items.into_iter()
                    .map(|item| item.into_prediction(&class_names))
                    .collect::<Result<Vec<_>, _>>()?;
                let images = ImagesPredictions::new(predictions);
                if single_output && !show {
                    let image_options = DetectionDrawOptions {
                        box_thickness: options.box_thickness,
                        show_confidence: options.show_confidence,
                        color_mapping: options.color_mapping.clone(),
                        class_names: options.class_names.clone(),
                        target_bboxes: first_batch(&options.target_bboxes),
                        target_bboxes_format: options.target_bboxes_format.clone(),
                        target_class_ids: first_batch(&options.target_class_ids),
                    };
                    return images[0].save(visualizer, &output, &image_options);
                }
                run_images(visualizer, &images, &output, &options, show)
            }
            (Task::Segmentation(items), fps) => {
                let options = options.segmentation();
                let predictions = items.into_iter()
                    .map(|item| item.into_prediction(&class_names))
                    .collect::<Result<Vec<_>, _>>()?;
                match fps {
                    Some(fps) => {
                        let video = VideoSegmentationPrediction::new(predictions, fps);
                        if show {
                            video.show(visualizer, &options)
                        } else {
                            video.save(visualizer, &output, &options)
                        }
                    }
                    None => {
                        let images = ImagesPredictions::new(predictions);
                        if single_output && !show {
                            return images[0].save(visualizer, &output, &options);
                        }
                        run_images(visualizer, &images, &output, &options, show)
                    }
                }
            }
        }
    }
}

fn run_images<I: ImagesVisualization>(visualizer: &Visualizer, images: &I, output: &Path, options: &I::Options, show: bool) -> Result<(), PredictionError> {
    if show {
        images.show(visualizer, options)
    } else {
        images.save(visualizer, output, options)
    }
}

fn first_batch<T: Clone>(targets: &Option<Targets<T>>) -> Option<Vec<T>> {
    match targets {
        Some(Targets::Single(targets)) => Some(targets.clone()),
        Some(Targets::Batch(batch)) => batch.first().cloned(),
        None => None,
    }
}

fn load_image(path: &Path) -> Result<RgbImage, PredictionError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Reads class ids from a single-channel mask. 16-bit masks are taken as-is; anything else
/// is reduced to 8-bit luma and widened without rescaling.
fn load_mask(path: &Path) -> Result<SegmentationMap, PredictionError> {
    match image::open(path)? {
        DynamicImage::ImageLuma16(mask) => Ok(mask),
        other => {
            let mask = other.to_luma8();
            Ok(SegmentationMap::from_fn(mask.width(), mask.height(), |x, y| Luma([mask.get_pixel(x, y).0[0] as u16])))
        }
    }
}

impl ClassificationItem {
    fn into_prediction(self, class_names: &[String]) -> Result<ImageClassificationPrediction, PredictionError> {
        let image = load_image(&self.image)?;
        let prediction = ClassificationPrediction::new(self.label, self.confidence);
        Ok(ImageClassificationPrediction::new(image, prediction, class_names.to_vec()))
    }
}

impl DetectionItem {
    fn into_prediction(self, class_names: &[String]) -> Result<ImageDetectionPrediction, PredictionError> {
        let image = load_image(&self.image)?;
        let bbox_format = self.bbox_format.parse::<BoxFormat>()?;
        let image_shape = (image.height(), image.width());
        let prediction = DetectionPrediction::new(self.bboxes, bbox_format, self.labels, self.confidence, image_shape)?;
        Ok(ImageDetectionPrediction::new(image, prediction, class_names.to_vec()))
    }
}

impl SegmentationItem {
    fn into_prediction(self, class_names: &[String]) -> Result<ImageSegmentationPrediction, PredictionError> {
        let image = load_image(&self.image)?;
        let segmentation_map = load_mask(&self.mask)?;
        let prediction = SegmentationPrediction::new(segmentation_map);
        Ok(ImageSegmentationPrediction::new(image, prediction, class_names.to_vec()))
    }
}

impl JobOptions {
    fn color_mapping(&self) -> Option<Vec<Rgb<u8>>> {
        self.color_mapping.as_ref().map(|colors| colors.iter().map(|color| Rgb(*color)).collect())
    }

    fn classification(&self) -> ClassificationDrawOptions {
        ClassificationDrawOptions {
            show_confidence: self.show_confidence.unwrap_or(true),
        }
    }

    fn segmentation(&self) -> SegmentationDrawOptions {
        let defaults = SegmentationDrawOptions::default();
        SegmentationDrawOptions {
            alpha: self.alpha.unwrap_or(defaults.alpha),
            color_mapping: self.color_mapping(),
            class_names: self.class_names.clone(),
        }
    }

    fn video_detection(&self) -> VideoDetectionOptions {
        VideoDetectionOptions {
            box_thickness: self.box_thickness,
            show_confidence: self.show_confidence.unwrap_or(true),
            color_mapping: self.color_mapping(),
            class_names: self.class_names.clone(),
        }
    }

    /// Ground truth is read per item; it is forwarded only when some item carries targets.
    fn images_detection(&self, items: &[DetectionItem]) -> ImagesDetectionOptions {
        let has_targets = items.iter().any(|item| item.target_bboxes.is_some() || item.target_class_ids.is_some());
        let (target_bboxes, target_class_ids, target_bboxes_format) = if has_targets {
            (
                Some(Targets::Batch(items.iter().map(|item| item.target_bboxes.clone().unwrap_or_default()).collect())),
                Some(Targets::Batch(items.iter().map(|item| item.target_class_ids.clone().unwrap_or_default()).collect())),
                self.target_bboxes_format.clone(),
            )
        } else {
            (None, None, None)
        };
        ImagesDetectionOptions {
            box_thickness: self.box_thickness,
            show_confidence: self.show_confidence.unwrap_or(true),
            color_mapping: self.color_mapping(),
            class_names: self.class_names.clone(),
            target_bboxes,
            target_bboxes_format,
            target_class_ids,
        }
    }
}
