use crate::utils::logging::*;
use crate::visualization::bbox_format::{convert_bboxes, BoxFormat};
use image::{ImageBuffer, Luma};

/// Per-pixel class indices, aligned with the image they were predicted on.
pub type SegmentationMap = ImageBuffer<Luma<u16>, Vec<u16>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationPrediction {
    pub label: usize,
    pub confidence: f32,
}

impl ClassificationPrediction {
    pub fn new(label: usize, confidence: f32) -> Self {
        Self { label, confidence }
    }
}

/// Detected boxes with their class ids and scores, stored as absolute `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionPrediction {
    pub bboxes_xyxy: Vec<[f32; 4]>,
    pub labels: Vec<usize>,
    pub confidence: Vec<f32>,
    /// `(height, width)` of the image the boxes belong to.
    pub image_shape: (u32, u32),
}

impl DetectionPrediction {
    /// Converts `bboxes` from `bbox_format` to absolute xyxy.
    pub fn new(bboxes: Vec<[f32; 4]>, bbox_format: BoxFormat, labels: Vec<usize>, confidence: Vec<f32>,
               image_shape: (u32, u32)) -> Result<Self, ArgumentEntry>
    {
        if bboxes.len() != labels.len() || labels.len() != confidence.len() {
            return Err(ArgumentEntry::DetectionLengthMismatch(bboxes.len(), labels.len(), confidence.len()));
        }
        let bboxes_xyxy = convert_bboxes(&bboxes, image_shape, bbox_format, BoxFormat::Xyxy);
        Ok(Self {
            bboxes_xyxy,
            labels,
            confidence,
            image_shape,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationPrediction {
    pub segmentation_map: SegmentationMap,
    pub image_shape: (u32, u32),
}

impl SegmentationPrediction {
    pub fn new(segmentation_map: SegmentationMap) -> Self {
        let image_shape = (segmentation_map.height(), segmentation_map.width());
        Self {
            segmentation_map,
            image_shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_converts_to_xyxy() {
        let prediction = DetectionPrediction::new(
            vec![[0.25, 0.125, 0.5, 0.75]],
            BoxFormat::NormalizedXyxy,
            vec![0],
            vec![0.9],
            (200, 400),
        ).unwrap();
        assert_eq!(prediction.bboxes_xyxy, vec![[100.0, 25.0, 200.0, 150.0]]);
        assert_eq!(prediction.len(), 1);
    }

    #[test]
    fn detection_rejects_mismatched_lengths() {
        let result = DetectionPrediction::new(vec![[0.0; 4]; 2], BoxFormat::Xyxy, vec![0], vec![0.5, 0.6], (10, 10));
        assert_eq!(result, Err(ArgumentEntry::DetectionLengthMismatch(2, 1, 2)));
    }

    #[test]
    fn segmentation_shape_follows_map() {
        let prediction = SegmentationPrediction::new(ImageBuffer::new(7, 3));
        assert_eq!(prediction.image_shape, (3, 7));
    }
}
