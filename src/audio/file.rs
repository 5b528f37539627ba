use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hound::WavReader;
use tracing::info;

use crate::error::SessionError;

/// A WAV file opened as a recognition audio source.
///
/// The format is probed once at open so callers get early, synchronous
/// feedback on a bad path or a non-WAV file — before a session ever
/// activates. After the probe the file is streamed verbatim, header
/// included; the service expects the untouched byte stream.
pub struct AudioFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    reader: BufReader<File>,
}

impl AudioFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref();
        info!("Opening audio file: {}", path.display());

        let probe = WavReader::open(path)
            .map_err(|e| match e {
                hound::Error::IoError(io) => SessionError::LocalIo(io),
                other => SessionError::Configuration(format!(
                    "{} is not a usable WAV file: {}",
                    path.display(),
                    other
                )),
            })?;

        let spec = probe.spec();
        let sample_count = probe.len() as f64;
        let duration_seconds = sample_count / (spec.sample_rate as f64 * spec.channels as f64);
        drop(probe);

        info!(
            "Audio file loaded: {:.1}s, {}Hz, {} channels",
            duration_seconds, spec.sample_rate, spec.channels
        );

        // Reopen for raw streaming; the probe consumed the header.
        let reader = BufReader::new(File::open(path)?);

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            reader,
        })
    }
}

impl Read for AudioFile {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}
