mod images;
mod prediction;
mod single;
mod video;

pub use single::{
    ClassificationDrawOptions, DetectionDrawOptions, ImageClassificationPrediction, ImageDetectionPrediction,
    ImagePrediction, ImageSegmentationPrediction, SegmentationDrawOptions,
};
pub use images::{ImagesDetectionOptions, ImagesPredictions, ImagesVisualization, PerImageTargets, Targets};
pub use prediction::{ClassificationPrediction, DetectionPrediction, SegmentationMap, SegmentationPrediction};
pub use video::{VideoDetectionOptions, VideoDetectionPrediction, VideoSegmentationPrediction};
