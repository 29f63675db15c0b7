use crate::error::PredictionError;
use crate::results::prediction::{ClassificationPrediction, DetectionPrediction, SegmentationPrediction};
use crate::utils::logging::*;
use crate::visualization::bbox_format::{convert_bboxes, BoxFormat};
use crate::visualization::color::generate_color_mapping;
use crate::visualization::painter::{PaintedBox, Painter};
use crate::visualization::visualizer::Visualizer;
use image::{imageops, Rgb, RgbImage};
use std::path::Path;

/// A single image paired with its prediction and class vocabulary.
///
/// Implementors only provide `draw`; `show` and `save` hand the drawn copy to the
/// visualizer's media output. The wrapped image is never modified.
pub trait ImagePrediction {
    type Options: Default;

    fn draw(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<RgbImage, PredictionError>;

    fn show(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<(), PredictionError> {
        let image = self.draw(visualizer, options)?;
        visualizer.media().show_image(&image)
    }

    fn save(&self, visualizer: &Visualizer, output_path: &Path, options: &Self::Options) -> Result<(), PredictionError> {
        let image = self.draw(visualizer, options)?;
        visualizer.media().save_image(&image, output_path)?;
        logging_information!(PredictionEntry::SavedImage(output_path.to_path_buf()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationDrawOptions {
    pub show_confidence: bool,
}

impl Default for ClassificationDrawOptions {
    fn default() -> Self {
        Self { show_confidence: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionDrawOptions {
    /// Outline width in pixels; derived from each box size when unset.
    pub box_thickness: Option<u32>,
    pub show_confidence: bool,
    pub color_mapping: Option<Vec<Rgb<u8>>>,
    /// Subset of the vocabulary to draw; every class when unset.
    pub class_names: Option<Vec<String>>,
    pub target_bboxes: Option<Vec<[f32; 4]>>,
    pub target_bboxes_format: Option<String>,
    pub target_class_ids: Option<Vec<usize>>,
}

impl Default for DetectionDrawOptions {
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

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationDrawOptions {
    pub alpha: f32,
    pub color_mapping: Option<Vec<Rgb<u8>>>,
    pub class_names: Option<Vec<String>>,
}

impl Default for SegmentationDrawOptions {
    fn default() -> Self {
        Self {
            alpha: 0.6,
            color_mapping: None,
            class_names: None,
        }
    }
}

pub struct ImageClassificationPrediction {
    pub image: RgbImage,
    pub prediction: ClassificationPrediction,
    pub class_names: Vec<String>,
}

impl ImageClassificationPrediction {
    pub fn new(image: RgbImage, prediction: ClassificationPrediction, class_names: Vec<String>) -> Self {
        Self { image, prediction, class_names }
    }
}

impl ImagePrediction for ImageClassificationPrediction {
    type Options = ClassificationDrawOptions;

    fn draw(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<RgbImage, PredictionError> {
        let label = self.prediction.label;
        let class_name = self.class_names.get(label)
            .ok_or(ArgumentEntry::UnknownClassId(label, self.class_names.len()))?;
        let confidence = options.show_confidence.then_some(self.prediction.confidence);
        Ok(visualizer.painter().draw_label(self.image.clone(), class_name, confidence))
    }
}

pub struct ImageDetectionPrediction {
    pub image: RgbImage,
    pub prediction: DetectionPrediction,
    pub class_names: Vec<String>,
}

impl ImageDetectionPrediction {
    pub fn new(image: RgbImage, prediction: DetectionPrediction, class_names: Vec<String>) -> Self {
        Self { image, prediction, class_names }
    }

    /// Converts non-empty ground truth to absolute xyxy. Absent or empty targets yield `None`.
    fn resolve_targets(&self, options: &DetectionDrawOptions) -> Result<Option<(Vec<[f32; 4]>, Vec<usize>)>, ArgumentEntry> {
        if let (Some(bboxes), Some(class_ids)) = (&options.target_bboxes, &options.target_class_ids) {
            if bboxes.len() != class_ids.len() {
                return Err(ArgumentEntry::TargetLengthMismatch(bboxes.len(), class_ids.len()));
            }
        }
        let bboxes = match &options.target_bboxes {
            Some(bboxes) if !bboxes.is_empty() => bboxes,
            _ => return Ok(None),
        };
        let format = options.target_bboxes_format.as_deref()
            .ok_or(ArgumentEntry::MissingTargetFormat)?
            .parse::<BoxFormat>()?;
        let class_ids = options.target_class_ids.clone().unwrap_or_default();
        if class_ids.len() != bboxes.len() {
            return Err(ArgumentEntry::TargetLengthMismatch(bboxes.len(), class_ids.len()));
        }
        check_class_ids(&class_ids, self.class_names.len())?;
        let bboxes_xyxy = convert_bboxes(bboxes, self.prediction.image_shape, format, BoxFormat::Xyxy);
        Ok(Some((bboxes_xyxy, class_ids)))
    }

    /// Draws the boxes onto a copy of the image. When `confidence` is given the boxes are
    /// drawn from least to most confident, so the strongest detection ends up on top.
    fn draw_boxes(&self, painter: &dyn Painter, bboxes: &[[f32; 4]], labels: &[usize], confidence: Option<&[f32]>,
                  class_ids_to_show: &[bool], colors: &[Rgb<u8>], options: &DetectionDrawOptions) -> RgbImage
    {
        let mut order: Vec<usize> = (0..labels.len()).collect();
        if let Some(confidence) = confidence {
            order.sort_by(|&a, &b| confidence[a].total_cmp(&confidence[b]));
        }
        let mut image = self.image.clone();
        for index in order {
            let class_id = labels[index];
            if !class_ids_to_show.get(class_id).copied().unwrap_or(false) {
                continue;
            }
            let class_name = &self.class_names[class_id];
            let title = match confidence {
                Some(confidence) if options.show_confidence => format!("{} {:.2}", class_name, confidence[index]),
                Some(_) => format!("{} ", class_name),
                None => class_name.clone(),
            };
            let [x1, y1, x2, y2] = bboxes[index];
            let painted_box = PaintedBox {
                title,
                color: colors[class_id],
                box_thickness: options.box_thickness,
                x1: x1 as i32,
                y1: y1 as i32,
                x2: x2 as i32,
                y2: y2 as i32,
            };
            image = painter.draw_bbox(image, &painted_box);
        }
        image
    }
}

impl ImagePrediction for ImageDetectionPrediction {
    type Options = DetectionDrawOptions;

    fn draw(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<RgbImage, PredictionError> {
        let class_ids_to_show = resolve_class_ids_to_show(&self.class_names, options.class_names.as_deref())?;
        let colors = resolve_color_mapping(options.color_mapping.as_deref(), self.class_names.len())?;
        let prediction = &self.prediction;
        if prediction.bboxes_xyxy.len() != prediction.labels.len() || prediction.labels.len() != prediction.confidence.len() {
            let entry = ArgumentEntry::DetectionLengthMismatch(prediction.bboxes_xyxy.len(), prediction.labels.len(), prediction.confidence.len());
            return Err(entry.into());
        }
        check_class_ids(&prediction.labels, self.class_names.len())?;
        let targets = self.resolve_targets(options)?;

        let painter = visualizer.painter();
        let predictions_image = self.draw_boxes(painter, &prediction.bboxes_xyxy, &prediction.labels,
                                                Some(&prediction.confidence), &class_ids_to_show, &colors, options);
        let Some((target_bboxes, target_class_ids)) = targets else {
            return Ok(predictions_image);
        };
        let target_image = self.draw_boxes(painter, &target_bboxes, &target_class_ids, None,
                                           &class_ids_to_show, &colors, options);
        let caption_color = visualizer.caption_color();
        let predictions_canvas = captioned_canvas(painter, &predictions_image, "Predictions", caption_color);
        let target_canvas = captioned_canvas(painter, &target_image, "Ground Truth", caption_color);
        Ok(concat_horizontal(&predictions_canvas, &target_canvas))
    }
}

pub struct ImageSegmentationPrediction {
    pub image: RgbImage,
    pub prediction: SegmentationPrediction,
    pub class_names: Vec<String>,
}

impl ImageSegmentationPrediction {
    pub fn new(image: RgbImage, prediction: SegmentationPrediction, class_names: Vec<String>) -> Self {
        Self { image, prediction, class_names }
    }
}

impl ImagePrediction for ImageSegmentationPrediction {
    type Options = SegmentationDrawOptions;

    fn draw(&self, visualizer: &Visualizer, options: &Self::Options) -> Result<RgbImage, PredictionError> {
        if !(0.0..=1.0).contains(&options.alpha) {
            return Err(ArgumentEntry::InvalidAlpha(options.alpha).into());
        }
        let segmentation_map = &self.prediction.segmentation_map;
        if segmentation_map.dimensions() != self.image.dimensions() {
            let (map_width, map_height) = segmentation_map.dimensions();
            let (width, height) = self.image.dimensions();
            return Err(ArgumentEntry::MaskShapeMismatch(map_width, map_height, width, height).into());
        }
        let mut class_names = match &options.class_names {
            Some(class_names) if !class_names.is_empty() => class_names.clone(),
            _ => self.class_names.clone(),
        };
        if class_names.len() == 1 {
            class_names.insert(0, "background".to_string());
        }
        let colors = resolve_color_mapping(options.color_mapping.as_deref(), class_names.len())?;
        Ok(visualizer.painter().overlay_segmentation(self.image.clone(), segmentation_map, class_names.len(),
                                                     options.alpha, &colors, &class_names))
    }
}

/// Marks which class ids of `class_names` should be drawn.
///
/// An absent or empty request selects every class. Every requested name must belong to
/// the vocabulary; otherwise the error lists the unknown names together with the available ones.
pub(crate) fn resolve_class_ids_to_show(class_names: &[String], requested: Option<&[String]>) -> Result<Vec<bool>, ArgumentEntry> {
    let requested = match requested {
        Some(requested) if !requested.is_empty() => requested,
        _ => return Ok(vec![true; class_names.len()]),
    };
    let invalid: Vec<String> = requested.iter()
        .filter(|name| !class_names.contains(*name))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ArgumentEntry::InvalidClassNames(invalid, class_names.to_vec()));
    }
    Ok(class_names.iter().map(|name| requested.contains(name)).collect())
}

pub(crate) fn resolve_color_mapping(color_mapping: Option<&[Rgb<u8>]>, num_classes: usize) -> Result<Vec<Rgb<u8>>, ArgumentEntry> {
    match color_mapping {
        Some(colors) if colors.len() < num_classes => Err(ArgumentEntry::ColorMappingTooShort(colors.len(), num_classes)),
        Some(colors) => Ok(colors.to_vec()),
        None => Ok(generate_color_mapping(num_classes)),
    }
}

fn check_class_ids(class_ids: &[usize], num_classes: usize) -> Result<(), ArgumentEntry> {
    match class_ids.iter().find(|&&class_id| class_id >= num_classes) {
        Some(&class_id) => Err(ArgumentEntry::UnknownClassId(class_id, num_classes)),
        None => Ok(()),
    }
}

/// White canvas with `image` pasted at (10, 60) and `caption` written above it.
fn captioned_canvas(painter: &dyn Painter, image: &RgbImage, caption: &str, caption_color: Rgb<u8>) -> RgbImage {
    let (width, height) = image.dimensions();
    let canvas_width = (width as f32 + width as f32 / 20.0) as u32;
    let canvas_height = (height as f32 + height as f32 / 8.0) as u32;
    let mut canvas = RgbImage::from_pixel(canvas_width, canvas_height, Rgb([255, 255, 255]));
    imageops::overlay(&mut canvas, image, 10, 60);
    painter.put_text(&mut canvas, caption, (0.25 * width as f32) as i32, 10, caption_color);
    canvas
}

fn concat_horizontal(left: &RgbImage, right: &RgbImage) -> RgbImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());
    let mut combined = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    imageops::overlay(&mut combined, left, 0, 0);
    imageops::overlay(&mut combined, right, left.width() as i64, 0);
    combined
}
