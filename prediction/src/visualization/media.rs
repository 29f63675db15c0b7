use crate::error::PredictionError;
use crate::utils::config::Config;
use crate::utils::logging::*;
use gstreamer::prelude::*;
use image::RgbImage;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub type FrameResult = Result<RgbImage, PredictionError>;

/// Display and persistence of rendered images and frame sequences.
///
/// Video methods pull frames one at a time; a frame error stops the operation and is
/// returned unchanged.
pub trait MediaOutput {
    fn show_image(&self, image: &RgbImage) -> Result<(), PredictionError>;

    fn save_image(&self, image: &RgbImage, path: &Path) -> Result<(), PredictionError>;

    fn show_video(&self, window_name: &str, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError>;

    fn save_video(&self, output_path: &Path, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError>;
}

pub struct GStreamerMedia {
    staging_folder: PathBuf,
    display_duration: u64,
}

impl GStreamerMedia {
    pub fn new(config: &Config) -> Result<Self, PredictionError> {
        gstreamer::init().map_err(GStreamerEntry::InitializeError)?;
        Ok(Self {
            staging_folder: PathBuf::from(&config.staging_folder),
            display_duration: config.display_duration,
        })
    }

    fn create_staging_folder(&self) -> Result<PathBuf, PredictionError> {
        let folder = self.staging_folder.join(Uuid::new_v4().to_string());
        fs::create_dir_all(&folder)
            .map_err(|err| IOEntry::CreateDirectoryError(folder.clone(), err))?;
        Ok(folder)
    }

    fn cleanup(folder: &Path) {
        if let Err(err) = fs::remove_dir_all(folder) {
            logging_error!(IOEntry::DeleteDirectoryError(folder.to_path_buf(), err));
        }
    }

    /// Writes frames as `Frame_1.png`, `Frame_2.png`, ... and returns how many were written.
    fn stage_frames(folder: &Path, frames: &mut dyn Iterator<Item = FrameResult>) -> Result<usize, PredictionError> {
        let mut count = 0;
        for frame in frames {
            let frame = frame?;
            count += 1;
            frame.save(folder.join(format!("Frame_{count}.png")))?;
        }
        Ok(count)
    }

    fn with_staged_frames<F>(&self, frames: &mut dyn Iterator<Item = FrameResult>, run: F) -> Result<usize, PredictionError>
    where
        F: FnOnce(&Path) -> Result<(), PredictionError>,
    {
        let folder = self.create_staging_folder()?;
        let result = Self::stage_frames(&folder, frames).and_then(|count| {
            if count == 0 {
                logging_warning!(PredictionEntry::EmptyVideo);
                return Ok(0);
            }
            run(&folder).map(|_| count)
        });
        Self::cleanup(&folder);
        result
    }

    fn framerate(fps: f64) -> String {
        if fps.is_finite() && fps > 0.0 {
            format!("{}/1000", (fps * 1000.0).round() as i64)
        } else {
            "30/1".to_string()
        }
    }

    fn muxer(output_path: &Path) -> &'static str {
        match output_path.extension().and_then(OsStr::to_str) {
            Some("avi") => "avimux",
            Some("mkv") => "matroskamux",
            _ => "mp4mux",
        }
    }

    fn create_parent_folder(path: &Path) -> Result<(), PredictionError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| IOEntry::CreateDirectoryError(parent.to_path_buf(), err))?;
        }
        Ok(())
    }

    /// Plays a pipeline until end of stream. When `closable` is set, closing the display
    /// window ends playback without an error.
    fn run_pipeline(pipeline_string: &str, closable: bool) -> Result<(), GStreamerEntry> {
        let pipeline = gstreamer::parse::launch(pipeline_string)
            .map_err(GStreamerEntry::CreatePipelineError)?;
        let bus = pipeline.bus().ok_or(GStreamerEntry::GetBusError)?;
        pipeline.set_state(gstreamer::State::Playing)
            .map_err(GStreamerEntry::PipelineSetStateError)?;
        let mut result = Ok(());
        for message in bus.iter_timed(gstreamer::ClockTime::NONE) {
            match message.view() {
                gstreamer::MessageView::Eos(..) => break,
                gstreamer::MessageView::Error(err) => {
                    let error = err.error();
                    if closable && error.matches(gstreamer::ResourceError::NotFound) {
                        logging_information!(PredictionEntry::WindowClosed(error.to_string()));
                    } else {
                        result = Err(GStreamerEntry::InternalError(error));
                    }
                    break;
                }
                _ => {}
            }
        }
        pipeline.set_state(gstreamer::State::Null)
            .map_err(GStreamerEntry::PipelineSetStateError)?;
        result
    }
}

impl MediaOutput for GStreamerMedia {
    fn show_image(&self, image: &RgbImage) -> Result<(), PredictionError> {
        let mut frames = std::iter::once(Ok::<_, PredictionError>(image.clone()));
        let buffers = self.display_duration.max(1) * 25;
        self.with_staged_frames(&mut frames, |folder| {
            let pipeline_string = format!(
                "filesrc location={:?} ! pngdec ! imagefreeze num-buffers={} ! videoconvert ! autovideosink",
                folder.join("Frame_1.png"), buffers
            );
            Ok(Self::run_pipeline(&pipeline_string, true)?)
        })?;
        Ok(())
    }

    fn save_image(&self, image: &RgbImage, path: &Path) -> Result<(), PredictionError> {
        Self::create_parent_folder(path)?;
        image.save(path)?;
        Ok(())
    }

    fn show_video(&self, window_name: &str, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError> {
        let framerate = Self::framerate(fps);
        self.with_staged_frames(frames, |folder| {
            logging_information!(format!("Displaying {window_name} at {framerate} fps"));
            let pipeline_string = format!(
                "multifilesrc location={:?} index=1 caps=image/png,framerate=(fraction){} ! \
                pngdec ! videoconvert ! autovideosink",
                folder.join("Frame_%d.png"), framerate
            );
            Ok(Self::run_pipeline(&pipeline_string, true)?)
        })?;
        Ok(())
    }

    fn save_video(&self, output_path: &Path, frames: &mut dyn Iterator<Item = FrameResult>, fps: f64) -> Result<(), PredictionError> {
        Self::create_parent_folder(output_path)?;
        let framerate = Self::framerate(fps);
        let muxer = Self::muxer(output_path);
        let count = self.with_staged_frames(frames, |folder| {
            let pipeline_string = format!(
                "multifilesrc location={:?} index=1 caps=image/png,framerate=(fraction){} ! \
                pngdec ! videoconvert ! x264enc ! {} ! filesink location={:?}",
                folder.join("Frame_%d.png"), framerate, muxer, output_path
            );
            Ok(Self::run_pipeline(&pipeline_string, false)?)
        })?;
        if count > 0 {
            logging_information!(PredictionEntry::SavedVideo(output_path.to_path_buf()));
        }
        Ok(())
    }
}
