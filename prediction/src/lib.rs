pub mod error;
pub mod results;
pub mod utils;
pub mod visualization;

pub use error::PredictionError;
pub use results::*;
pub use visualization::*;
