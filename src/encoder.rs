//! Encoder module
//!
//! This module wraps the external `ffmpeg` binary: checking that it can be
//! found and running it to turn a video file into an MP3.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

/// Audio codec used for MP3 output (LAME)
pub const MP3_CODEC: &str = "libmp3lame";

/// Target audio bitrate of the MP3 output
pub const AUDIO_BITRATE: &str = "192k";

/// Errors that can occur while talking to the encoder
#[derive(Debug, Error)]
pub enum EncoderError {
    /// The encoder executable could not be found
    #[error("FFmpeg is not installed. Please install it using 'brew install ffmpeg'")]
    NotInstalled,

    /// Running the version query failed for a reason other than a missing binary
    #[error("Failed to check for ffmpeg: {0}")]
    AvailabilityCheckFailed(#[source] io::Error),

    /// The encoder process could not be run to completion
    #[error("Failed to run ffmpeg: {0}")]
    SpawnFailed(#[source] io::Error),

    /// The encoder ran but reported a failure
    #[error("An error occurred: {diagnostics}")]
    EncodingFailed {
        status: ExitStatus,
        diagnostics: String,
    },
}

/// Handle to the external encoder executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoder {
    program: PathBuf,
}

impl Default for Encoder {
    /// Uses `ffmpeg` from next to the current executable if present,
    /// otherwise from `PATH`
    fn default() -> Self {
        Self::new(ffmpeg_sidecar::paths::ffmpeg_path())
    }
}

impl Encoder {
    /// Creates an encoder handle for the given executable
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// The executable this encoder invokes
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Checks that the encoder executable can be found
    ///
    /// Runs `<program> -version` with all output discarded. Only a missing
    /// executable counts as unavailable; a version query exiting with a
    /// failure status is still treated as an installed encoder.
    pub fn ensure_available(&self) -> Result<(), EncoderError> {
        let result = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(status) => {
                tracing::debug!(program = %self.program.display(), %status, "encoder version query finished");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(EncoderError::NotInstalled),
            Err(e) => Err(EncoderError::AvailabilityCheckFailed(e)),
        }
    }

    /// Encodes the audio track of `input` into an MP3 file at `output`
    ///
    /// The video stream is discarded and the audio is encoded with LAME at
    /// 192 kbit/s. An existing file at `output` is overwritten. Blocks
    /// until the encoder exits; there is no timeout.
    ///
    /// # Arguments
    ///
    /// * `input` - The video file to read
    /// * `output` - Where to write the MP3 file
    ///
    /// # Returns
    ///
    /// `Ok(())` once the encoder exited successfully, or
    /// `EncoderError::EncodingFailed` carrying the encoder's diagnostic
    /// output verbatim.
    pub fn encode_mp3(&self, input: &Path, output: &Path) -> Result<(), EncoderError> {
        let mut command = Command::new(&self.program);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-vn")
            .args(["-acodec", MP3_CODEC, "-b:a", AUDIO_BITRATE])
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        tracing::debug!(?command, "running encoder");

        let result = command.output().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                EncoderError::NotInstalled
            } else {
                EncoderError::SpawnFailed(e)
            }
        })?;

        if !result.status.success() {
            tracing::debug!(status = %result.status, input = %input.display(), "encoder failed");
            return Err(EncoderError::EncodingFailed {
                status: result.status,
                diagnostics: String::from_utf8_lossy(&result.stderr).into_owned(),
            });
        }

        Ok(())
    }
}
