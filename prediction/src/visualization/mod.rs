pub mod bbox_format;
pub mod color;
pub mod media;
pub mod painter;
pub mod visualizer;

pub use bbox_format::{convert_bboxes, BoxFormat};
pub use color::generate_color_mapping;
pub use media::{FrameResult, GStreamerMedia, MediaOutput};
pub use painter::{ImageprocPainter, PaintedBox, Painter};
pub use visualizer::Visualizer;
