#![allow(dead_code)]

use image::{Rgb, RgbImage};
use prediction::results::SegmentationMap;
use prediction::visualization::{FrameResult, MediaOutput, PaintedBox, Painter, Visualizer};
use prediction::PredictionError;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCall {
    Bbox(PaintedBox),
    Label(String, Option<f32>),
    Overlay { num_classes: usize, alpha: f32, colors: usize, class_names: Vec<String> },
    Text(String, i32, i32),
}

/// Painter that records every call and marks box corners so drawn output differs from the source.
#[derive(Clone, Default)]
pub struct RecordingPainter {
    pub calls: Rc<RefCell<Vec<PaintCall>>>,
}

impl RecordingPainter {
    pub fn titles(&self) -> Vec<String> {
        self.calls.borrow().iter()
            .filter_map(|call| match call {
                PaintCall::Bbox(painted_box) => Some(painted_box.title.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<String> {
        self.calls.borrow().iter()
            .filter_map(|call| match call {
                PaintCall::Text(text, _, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Painter for RecordingPainter {
    fn draw_bbox(&self, mut image: RgbImage, bbox: &PaintedBox) -> RgbImage {
        self.calls.borrow_mut().push(PaintCall::Bbox(bbox.clone()));
        if let Some(pixel) = image.get_pixel_mut_checked(bbox.x1.max(0) as u32, bbox.y1.max(0) as u32) {
            *pixel = bbox.color;
        }
        image
    }

    fn draw_label(&self, image: RgbImage, label: &str, confidence: Option<f32>) -> RgbImage {
        self.calls.borrow_mut().push(PaintCall::Label(label.to_string(), confidence));
        image
    }

    fn overlay_segmentation(&self, image: RgbImage, _segmentation_map: &SegmentationMap, num_classes: usize,
                            alpha: f32, colors: &[Rgb<u8>], class_names: &[String]) -> RgbImage
    {
        self.calls.borrow_mut().push(PaintCall::Overlay {
            num_classes,
            alpha,
            colors: colors.len(),
            class_names: class_names.to_vec(),
        });
        image
    }

    fn put_text(&self, _image: &mut RgbImage, text: &str, x: i32, y: i32, _color: Rgb<u8>) {
        self.calls.borrow_mut().push(PaintCall::Text(text.to_string(), x, y));
    }
}

/// Media output that writes images to disk and counts streamed frames.
#[derive(Clone, Default)]
pub struct RecordingMedia {
    pub shown_images: Rc<RefCell<usize>>,
    pub saved_images: Rc<RefCell<Vec<PathBuf>>>,
    pub videos: Rc<RefCell<Vec<(String, usize, f64)>>>,
}

impl RecordingMedia {
    fn consume(frames: &mut dyn Iterator<Item = FrameResult>) -> Result<usize, PredictionError> {
        let mut count = 0;
        for frame in frames {
            frame?;
            count += 1;
        }
        Ok(count)
    }
}

impl MediaOutput for RecordingMedia {
    fn show_image(&self, _image: &RgbImage) -> Result<(), PredictionError> {
        *self.shown_images.borrow_mut() += 1;
        Ok(())
    }

    fn save_image(&self, image: &RgbImage, path: &Path) -> Result<(), PredictionError> {
        image.save(path)?;
        self.saved_images.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn show_video(&self, window_name: &str, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError> {
        let count = Self::consume(frames)?;
        self.videos.borrow_mut().push((window_name.to_string(), count, fps));
        Ok(())
    }

    fn save_video(&self, output_path: &Path, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError> {
        let count = Self::consume(frames)?;
        self.videos.borrow_mut().push((output_path.display().to_string(), count, fps));
        Ok(())
    }
}

pub fn recording_visualizer() -> (Visualizer, RecordingPainter, RecordingMedia) {
    let painter = RecordingPainter::default();
    let media = RecordingMedia::default();
    let visualizer = Visualizer::new(Box::new(painter.clone()), Box::new(media.clone()));
    (visualizer, painter, media)
}

pub fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
}
