use crate::utils::logging::*;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::RwLock;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub font_path: String, //path
    pub font_size: f32, //pixels
    pub caption_font_size: f32, //pixels
    pub text_color: [u8; 3], //RGB
    pub caption_color: [u8; 3], //RGB
    pub display_duration: u64, //seconds
    pub progress_interval: usize, //frames
    pub staging_folder: String, //path
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font_path: "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
            font_size: 16.0,
            caption_font_size: 28.0,
            text_color: [255, 255, 255],
            caption_color: [0, 0, 0],
            display_duration: 5,
            progress_interval: 25,
            staging_folder: std::env::temp_dir().join("prediction").to_string_lossy().to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        match Self::load("./prediction.toml") {
            Ok(config) => config,
            Err(IOEntry::ReadFileError(_, err)) if err.kind() == ErrorKind::NotFound => {
                logging_warning!(SystemEntry::ConfigNotFound, "Using default configuration");
                Self::default()
            }
            Err(err) => {
                logging_error!(SystemEntry::InvalidConfig, format!("Err: {err}"));
                Self::default()
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, IOEntry> {
        let path = path.as_ref();
        let toml_string = fs::read_to_string(path)
            .map_err(|err| IOEntry::ReadFileError(path.to_path_buf(), err))?;
        let config = Self::parse(&toml_string)
            .map_err(|err| IOEntry::TomlDeserializeError(path.to_path_buf(), err))?;
        if !Self::validate(&config) {
            logging_error!(SystemEntry::InvalidConfig, format!("{} rejected, using default configuration", path.display()));
            return Ok(Self::default());
        }
        Ok(config)
    }

    fn parse(toml_string: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<ConfigTable>(toml_string).map(|table| table.config)
    }

    pub fn now() -> Config {
        match CONFIG.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(config: Config) {
        match CONFIG.write() {
            Ok(mut guard) => *guard = config,
            Err(poisoned) => *poisoned.into_inner() = config,
        }
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_font_size(config.font_size)
            && Config::validate_font_size(config.caption_font_size)
            && Config::validate_second(config.display_duration)
            && Config::validate_interval(config.progress_interval)
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }

    fn validate_second(second: u64) -> bool {
        second <= 3600
    }

    fn validate_interval(frames: usize) -> bool {
        frames > 0_usize
    }
}
