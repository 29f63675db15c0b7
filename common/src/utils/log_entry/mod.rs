pub mod argument;
pub mod gstreamer;
pub mod io;
pub mod prediction;
pub mod system;
