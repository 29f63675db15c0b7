use crate::results::SegmentationMap;
use crate::utils::config::Config;
use crate::utils::logging::*;
use crate::visualization::color::best_text_color;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::collections::BTreeSet;
use std::fs;

/// One box to be painted, in absolute pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintedBox {
    pub title: String,
    pub color: Rgb<u8>,
    pub box_thickness: Option<u32>,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Drawing primitives used by the prediction wrappers.
///
/// Every method receives an image the caller already owns (a copy of the source image),
/// so implementations are free to modify it.
pub trait Painter {
    fn draw_bbox(&self, image: RgbImage, bbox: &PaintedBox) -> RgbImage;

    fn draw_label(&self, image: RgbImage, label: &str, confidence: Option<f32>) -> RgbImage;

    fn overlay_segmentation(&self, image: RgbImage, segmentation_map: &SegmentationMap, num_classes: usize,
                            alpha: f32, colors: &[Rgb<u8>], class_names: &[String]) -> RgbImage;

    fn put_text(&self, image: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>);
}

pub struct ImageprocPainter {
    font: Option<FontVec>,
    font_size: f32,
    caption_font_size: f32,
    text_color: Rgb<u8>,
}

impl ImageprocPainter {
    pub fn new(font: Option<FontVec>, config: &Config) -> Self {
        Self {
            font,
            font_size: config.font_size,
            caption_font_size: config.caption_font_size,
            text_color: Rgb(config.text_color),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let font = match fs::read(&config.font_path) {
            Ok(font_data) => FontVec::try_from_vec(font_data).ok(),
            Err(_) => None,
        };
        if font.is_none() {
            logging_warning!(PredictionEntry::FontUnavailable(config.font_path.clone()));
        }
        Self::new(font, config)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Thickness used when the caller leaves it unset: thin for small boxes, up to 8px for large ones.
    pub fn recommended_box_thickness(width: u32, height: u32) -> u32 {
        (width.min(height) / 50).clamp(1, 8)
    }

    fn draw_text_box(&self, image: &mut RgbImage, text: &str, x: i32, y: i32, background: Rgb<u8>, foreground: Rgb<u8>) -> u32 {
        let Some(font) = &self.font else {
            return 0;
        };
        let scale = PxScale::from(self.font_size);
        let (text_width, text_height) = text_size(scale, font, text);
        let y = if y - text_height as i32 - 4 >= 0 { y - text_height as i32 - 4 } else { y.max(0) };
        let background_rect = Rect::at(x, y).of_size(text_width + 4, text_height + 4);
        draw_filled_rect_mut(image, background_rect, background);
        draw_text_mut(image, foreground, x + 2, y + 2, scale, font, text);
        text_height + 4
    }
}

impl Painter for ImageprocPainter {
    fn draw_bbox(&self, mut image: RgbImage, bbox: &PaintedBox) -> RgbImage {
        let (x1, x2) = (bbox.x1.min(bbox.x2), bbox.x1.max(bbox.x2));
        let (y1, y2) = (bbox.y1.min(bbox.y2), bbox.y1.max(bbox.y2));
        let width = (x2 - x1).max(1) as u32;
        let height = (y2 - y1).max(1) as u32;
        let thickness = bbox.box_thickness
            .unwrap_or_else(|| Self::recommended_box_thickness(width, height))
            .max(1);
        for i in 0..thickness {
            let offset = i as i32;
            let rect = Rect::at(x1 - offset, y1 - offset).of_size(width + 2 * i, height + 2 * i);
            draw_hollow_rect_mut(&mut image, rect, bbox.color);
        }
        let title = bbox.title.trim();
        if !title.is_empty() {
            let left = x1 - thickness as i32 + 1;
            let top = y1 - thickness as i32 + 1;
            self.draw_text_box(&mut image, title, left, top, bbox.color, best_text_color(bbox.color));
        }
        image
    }

    fn draw_label(&self, mut image: RgbImage, label: &str, confidence: Option<f32>) -> RgbImage {
        let text = match confidence {
            Some(confidence) => format!("{label} {confidence:.2}"),
            None => label.to_string(),
        };
        let (x, y) = (10, 10 + self.font_size as i32 + 4);
        self.draw_text_box(&mut image, &text, x, y, Rgb([0, 0, 0]), self.text_color);
        image
    }

    fn overlay_segmentation(&self, mut image: RgbImage, segmentation_map: &SegmentationMap, num_classes: usize,
                            alpha: f32, colors: &[Rgb<u8>], class_names: &[String]) -> RgbImage
    {
        let mut present = BTreeSet::new();
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let Some(class_id) = segmentation_map.get_pixel_checked(x, y).map(|value| value.0[0] as usize) else {
                continue;
            };
            if class_id >= num_classes {
                continue;
            }
            let Some(color) = colors.get(class_id) else {
                continue;
            };
            present.insert(class_id);
            for channel in 0..3 {
                let blended = (1.0 - alpha) * pixel.0[channel] as f32 + alpha * color.0[channel] as f32;
                pixel.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
        let mut y = 10 + self.font_size as i32 + 4;
        for class_id in present {
            if let (Some(name), Some(color)) = (class_names.get(class_id), colors.get(class_id)) {
                let height = self.draw_text_box(&mut image, name, 10, y, *color, best_text_color(*color));
                y += height as i32 + 4;
            }
        }
        image
    }

    fn put_text(&self, image: &mut RgbImage, text: &str, x: i32, y: i32, color: Rgb<u8>) {
        if let Some(font) = &self.font {
            draw_text_mut(image, color, x, y, PxScale::from(self.caption_font_size), font, text);
        }
    }
}
