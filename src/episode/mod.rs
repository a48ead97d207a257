mod download;
mod filename;

pub use download::{download_audio, fetch_image};
pub use filename::{audio_extension, sanitize_component};
