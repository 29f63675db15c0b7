use crate::utils::logging::*;
use std::fmt::Display;
use std::str::FromStr;

/// Layout of the four numbers describing a bounding box.
///
/// Normalized formats express coordinates as fractions of the image width and height.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoxFormat {
    Xyxy,
    Xywh,
    Yxyx,
    Cxcywh,
    NormalizedXyxy,
    NormalizedXywh,
    NormalizedYxyx,
    NormalizedCxcywh,
}

impl FromStr for BoxFormat {
    type Err = ArgumentEntry;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xyxy" => Ok(BoxFormat::Xyxy),
            "xywh" => Ok(BoxFormat::Xywh),
            "yxyx" => Ok(BoxFormat::Yxyx),
            "cxcywh" => Ok(BoxFormat::Cxcywh),
            "normalized_xyxy" => Ok(BoxFormat::NormalizedXyxy),
            "normalized_xywh" => Ok(BoxFormat::NormalizedXywh),
            "normalized_yxyx" => Ok(BoxFormat::NormalizedYxyx),
            "normalized_cxcywh" => Ok(BoxFormat::NormalizedCxcywh),
            _ => Err(ArgumentEntry::UnknownBoxFormat(s.to_string())),
        }
    }
}

impl Display for BoxFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            BoxFormat::Xyxy => "xyxy",
            BoxFormat::Xywh => "xywh",
            BoxFormat::Yxyx => "yxyx",
            BoxFormat::Cxcywh => "cxcywh",
            BoxFormat::NormalizedXyxy => "normalized_xyxy",
            BoxFormat::NormalizedXywh => "normalized_xywh",
            BoxFormat::NormalizedYxyx => "normalized_yxyx",
            BoxFormat::NormalizedCxcywh => "normalized_cxcywh",
        })
    }
}

impl BoxFormat {
    pub fn is_normalized(&self) -> bool {
        matches!(self, BoxFormat::NormalizedXyxy | BoxFormat::NormalizedXywh | BoxFormat::NormalizedYxyx | BoxFormat::NormalizedCxcywh)
    }

    fn denormalized(&self) -> BoxFormat {
        match self {
            BoxFormat::NormalizedXyxy => BoxFormat::Xyxy,
            BoxFormat::NormalizedXywh => BoxFormat::Xywh,
            BoxFormat::NormalizedYxyx => BoxFormat::Yxyx,
            BoxFormat::NormalizedCxcywh => BoxFormat::Cxcywh,
            absolute => *absolute,
        }
    }

    /// Converts one box of this format into absolute `[x1, y1, x2, y2]`.
    pub fn to_xyxy(&self, bbox: [f32; 4], image_shape: (u32, u32)) -> [f32; 4] {
        let bbox = if self.is_normalized() {
            let (height, width) = (image_shape.0 as f32, image_shape.1 as f32);
            match self.denormalized() {
                BoxFormat::Yxyx => [bbox[0] * height, bbox[1] * width, bbox[2] * height, bbox[3] * width],
                _ => [bbox[0] * width, bbox[1] * height, bbox[2] * width, bbox[3] * height],
            }
        } else {
            bbox
        };
        match self.denormalized() {
            BoxFormat::Xywh => [bbox[0], bbox[1], bbox[0] + bbox[2], bbox[1] + bbox[3]],
            BoxFormat::Yxyx => [bbox[1], bbox[0], bbox[3], bbox[2]],
            BoxFormat::Cxcywh => {
                let (half_width, half_height) = (bbox[2] / 2.0, bbox[3] / 2.0);
                [bbox[0] - half_width, bbox[1] - half_height, bbox[0] + half_width, bbox[1] + half_height]
            }
            _ => bbox,
        }
    }

    /// Converts one absolute `[x1, y1, x2, y2]` box into this format.
    pub fn from_xyxy(&self, bbox: [f32; 4], image_shape: (u32, u32)) -> [f32; 4] {
        let converted = match self.denormalized() {
            BoxFormat::Xywh => [bbox[0], bbox[1], bbox[2] - bbox[0], bbox[3] - bbox[1]],
            BoxFormat::Yxyx => [bbox[1], bbox[0], bbox[3], bbox[2]],
            BoxFormat::Cxcywh => [
                (bbox[0] + bbox[2]) / 2.0,
                (bbox[1] + bbox[3]) / 2.0,
                bbox[2] - bbox[0],
                bbox[3] - bbox[1],
            ],
            _ => bbox,
        };
        if !self.is_normalized() {
            return converted;
        }
        let (height, width) = (image_shape.0 as f32, image_shape.1 as f32);
        match self.denormalized() {
            BoxFormat::Yxyx => [converted[0] / height, converted[1] / width, converted[2] / height, converted[3] / width],
            _ => [converted[0] / width, converted[1] / height, converted[2] / width, converted[3] / height],
        }
    }
}

/// Converts boxes between formats. `image_shape` is `(height, width)` and is only used
/// when one side of the conversion is normalized.
pub fn convert_bboxes(bboxes: &[[f32; 4]], image_shape: (u32, u32), source: BoxFormat, target: BoxFormat) -> Vec<[f32; 4]> {
    if source == target {
        return bboxes.to_vec();
    }
    bboxes
        .iter()
        .map(|bbox| target.from_xyxy(source.to_xyxy(*bbox, image_shape), image_shape))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: (u32, u32) = (200, 400);

    fn assert_close(actual: [f32; 4], expected: [f32; 4]) {
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-3, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn parses_every_known_format() {
        for name in ["xyxy", "xywh", "yxyx", "cxcywh", "normalized_xyxy", "normalized_xywh", "normalized_yxyx", "normalized_cxcywh"] {
            let format = BoxFormat::from_str(name).unwrap();
            assert_eq!(format.to_string(), name);
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert_eq!(BoxFormat::from_str("xyz"), Err(ArgumentEntry::UnknownBoxFormat("xyz".to_string())));
    }

    #[test]
    fn every_format_describes_the_same_box() {
        let xyxy = [40.0, 20.0, 120.0, 100.0];
        let cases = [
            (BoxFormat::Xywh, [40.0, 20.0, 80.0, 80.0]),
            (BoxFormat::Yxyx, [20.0, 40.0, 100.0, 120.0]),
            (BoxFormat::Cxcywh, [80.0, 60.0, 80.0, 80.0]),
            (BoxFormat::NormalizedXyxy, [0.1, 0.1, 0.3, 0.5]),
            (BoxFormat::NormalizedXywh, [0.1, 0.1, 0.2, 0.4]),
            (BoxFormat::NormalizedYxyx, [0.1, 0.1, 0.5, 0.3]),
            (BoxFormat::NormalizedCxcywh, [0.2, 0.3, 0.2, 0.4]),
        ];
        for (format, bbox) in cases {
            assert_close(convert_bboxes(&[bbox], SHAPE, format, BoxFormat::Xyxy)[0], xyxy);
            assert_close(convert_bboxes(&[xyxy], SHAPE, BoxFormat::Xyxy, format)[0], bbox);
        }
    }

    #[test]
    fn identical_formats_pass_through() {
        let bboxes = vec![[1.0, 2.0, 3.0, 4.0]];
        assert_eq!(convert_bboxes(&bboxes, SHAPE, BoxFormat::Xyxy, BoxFormat::Xyxy), bboxes);
    }
}
