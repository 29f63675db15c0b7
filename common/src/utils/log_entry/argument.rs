use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArgumentEntry {
    #[error("`class_names` includes class names that the model was not trained on. Invalid class names: {0:?}, available class names: {1:?}")]
    InvalidClassNames(Vec<String>, Vec<String>),
    #[error("Class id {0} is outside the {1} known class names")]
    UnknownClassId(usize, usize),
    #[error("Color mapping has {0} colors but {1} classes need one")]
    ColorMappingTooShort(usize, usize),
    #[error("target_bboxes, target_bboxes_format and target_class_ids should either all be set or all be unset")]
    PartialTargetArguments,
    #[error("target_bboxes and target_class_ids lengths should be equal, got: {0} and {1}")]
    TargetLengthMismatch(usize, usize),
    #[error("target_bboxes and target_class_ids lengths should be equal to the amount of images, got: {0} and {1}")]
    TargetImageCountMismatch(usize, usize),
    #[error("target_bboxes_format is required when target_bboxes is not empty")]
    MissingTargetFormat,
    #[error("Unknown bounding box format {0:?}")]
    UnknownBoxFormat(String),
    #[error("Detection fields should share one length, got {0} boxes, {1} labels and {2} confidences")]
    DetectionLengthMismatch(usize, usize, usize),
    #[error("Alpha should be within [0, 1], got {0}")]
    InvalidAlpha(f32),
    #[error("Segmentation map is {0}x{1} but the image is {2}x{3}")]
    MaskShapeMismatch(u32, u32, u32, u32),
}

impl From<ArgumentEntry> for String {
    #[inline(always)]
    fn from(value: ArgumentEntry) -> Self {
        value.to_string()
    }
}
