pub mod config;
pub mod error;
pub mod speech;
pub mod status;

pub use config::NeonConfig;
pub use error::{NeonError, Result};
pub use speech::{CaptureWindow, Recognition, Speaker, SpeechRecognizer};
pub use status::{StatusBoard, StatusMessage, StatusReporter};
