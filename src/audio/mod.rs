pub mod chunk;
pub mod file;
pub mod source;

pub use chunk::AudioChunk;
pub use file::AudioFile;
pub use source::{AudioInput, CaptureDevice, STREAM_CHUNK_SIZE};
