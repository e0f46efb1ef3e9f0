//! video_to_mp3 - Convert a video file to an MP3 next to it
//!
//! This library checks that `ffmpeg` is available, resolves the input path
//! the way a shell user would expect (including `~`), and runs the encoder
//! to write an MP3 file alongside the video.

mod encoder;
mod path_resolver;
#[cfg(all(test, unix))]
mod test_support;

pub use encoder::{AUDIO_BITRATE, Encoder, EncoderError, MP3_CODEC};
pub use path_resolver::{
    PathResolverError, ResolvedInput, absolutize, derive_output_path, expand_home, resolve_input,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Progress event emitted during a conversion
///
/// These events allow library users to report what is happening, or stay
/// silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Checking that the encoder can be found
    CheckingEncoder { program: PathBuf },

    /// The input path was resolved to an existing file
    InputResolved { input: PathBuf },

    /// The encoder is being run
    Converting { input: PathBuf, output: PathBuf },

    /// The encoder finished successfully
    Converted { input: PathBuf, output: PathBuf },
}

/// A finished conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The resolved input video file
    pub input: PathBuf,

    /// The MP3 file that was written
    pub output: PathBuf,
}

impl Conversion {
    /// Final path segment of the input file
    pub fn input_file_name(&self) -> String {
        file_name_lossy(&self.input)
    }

    /// Final path segment of the output file
    pub fn output_file_name(&self) -> String {
        file_name_lossy(&self.output)
    }
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Top-level error type for conversions
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Error while checking for or running the encoder
    #[error(transparent)]
    Encoder(#[from] EncoderError),

    /// Error while resolving the input path
    #[error(transparent)]
    PathResolver(#[from] PathResolverError),
}

/// Converts a video file to an MP3 file in the same directory
///
/// The encoder's availability is checked first, before the input path is
/// even looked at. The input is then resolved (expanding `~`, making it
/// absolute) and must exist. The output path is the input path with its
/// extension replaced by `.mp3`; an existing file there is overwritten.
///
/// Progress events are emitted through the provided callback.
///
/// # Arguments
///
/// * `input` - The video file path as given by the caller
/// * `encoder` - The encoder to run
/// * `progress_callback` - Closure called with progress events (can be empty for silent operation)
///
/// # Returns
///
/// The `Conversion` naming input and output, or the first error hit.
///
/// # Examples
///
/// ```no_run
/// use video_to_mp3::{convert_to_mp3, Encoder};
/// use std::path::Path;
///
/// let conversion = convert_to_mp3(Path::new("~/Movies/talk.mov"), &Encoder::default(), |_| {})
///     .unwrap();
/// println!("Wrote {}", conversion.output.display());
/// ```
pub fn convert_to_mp3<F>(
    input: &Path,
    encoder: &Encoder,
    mut progress_callback: F,
) -> Result<Conversion, ConversionError>
where
    F: FnMut(ProgressEvent),
{
    progress_callback(ProgressEvent::CheckingEncoder {
        program: encoder.program().to_path_buf(),
    });
    encoder.ensure_available()?;

    let resolved = resolve_input(input)?;
    progress_callback(ProgressEvent::InputResolved {
        input: resolved.path.clone(),
    });

    let output = resolved.output_path();
    progress_callback(ProgressEvent::Converting {
        input: resolved.path.clone(),
        output: output.clone(),
    });

    encoder.encode_mp3(&resolved.path, &output)?;

    progress_callback(ProgressEvent::Converted {
        input: resolved.path.clone(),
        output: output.clone(),
    });

    Ok(Conversion {
        input: resolved.path,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_encoder_reported_before_input_is_checked() {
        let encoder = Encoder::new("video-to-mp3-test-encoder-that-does-not-exist");
        let mut events = Vec::new();

        let err = convert_to_mp3(Path::new("/tmp/does-not-exist.mov"), &encoder, |event| {
            events.push(event)
        })
        .unwrap_err();

        assert!(matches!(err, ConversionError::Encoder(EncoderError::NotInstalled)));
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::CheckingEncoder { .. }));
    }

    #[test]
    fn test_file_names() {
        let conversion = Conversion {
            input: PathBuf::from("/videos/sample.mov"),
            output: PathBuf::from("/videos/sample.mp3"),
        };
        assert_eq!(conversion.input_file_name(), "sample.mov");
        assert_eq!(conversion.output_file_name(), "sample.mp3");
    }

    #[cfg(unix)]
    mod with_fake_encoder {
        use super::super::*;
        use crate::test_support::{ARGUMENT_RECORDING_ENCODER, FAILING_ENCODER, fake_encoder};
        use std::fs;

        #[test]
        fn test_convert_writes_mp3_next_to_input() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = Encoder::new(fake_encoder(dir.path(), ARGUMENT_RECORDING_ENCODER));
            let input = dir.path().join("sample.mov");
            fs::write(&input, b"not really a video").unwrap();
            let expected_output = dir.path().join("sample.mp3");

            let mut events = Vec::new();
            let conversion = convert_to_mp3(&input, &encoder, |event| events.push(event)).unwrap();

            assert_eq!(conversion.input, input);
            assert_eq!(conversion.output, expected_output);
            assert!(expected_output.exists());
            assert_eq!(
                events,
                vec![
                    ProgressEvent::CheckingEncoder {
                        program: encoder.program().to_path_buf(),
                    },
                    ProgressEvent::InputResolved {
                        input: input.clone(),
                    },
                    ProgressEvent::Converting {
                        input: input.clone(),
                        output: expected_output.clone(),
                    },
                    ProgressEvent::Converted {
                        input: input.clone(),
                        output: expected_output.clone(),
                    },
                ]
            );
        }

        #[test]
        fn test_convert_overwrites_existing_output() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = Encoder::new(fake_encoder(dir.path(), ARGUMENT_RECORDING_ENCODER));
            let input = dir.path().join("clip.mkv");
            let output = dir.path().join("clip.mp3");
            fs::write(&input, b"video").unwrap();
            fs::write(&output, b"previous contents").unwrap();

            convert_to_mp3(&input, &encoder, |_| {}).unwrap();

            assert_eq!(fs::read(&output).unwrap(), b"ID3");
        }

        #[test]
        fn test_convert_nonexistent_input() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = Encoder::new(fake_encoder(dir.path(), ARGUMENT_RECORDING_ENCODER));
            let missing = dir.path().join("does-not-exist.mov");

            let err = convert_to_mp3(&missing, &encoder, |_| {}).unwrap_err();

            assert!(matches!(
                err,
                ConversionError::PathResolver(PathResolverError::InputNotFound(_))
            ));
            assert!(err.to_string().contains(&missing.display().to_string()));
            assert!(!dir.path().join("args.txt").exists());
        }

        #[test]
        fn test_convert_relays_encoder_diagnostics() {
            let dir = tempfile::tempdir().unwrap();
            let encoder = Encoder::new(fake_encoder(dir.path(), FAILING_ENCODER));
            let input = dir.path().join("corrupt.mov");
            fs::write(&input, b"garbage").unwrap();

            let mut events = Vec::new();
            let err = convert_to_mp3(&input, &encoder, |event| events.push(event)).unwrap_err();

            assert!(matches!(
                err,
                ConversionError::Encoder(EncoderError::EncodingFailed { .. })
            ));
            assert!(err.to_string().contains("Invalid data found when processing input"));
            assert!(
                !events
                    .iter()
                    .any(|event| matches!(event, ProgressEvent::Converted { .. }))
            );
        }
    }
}
