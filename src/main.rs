use clap::Parser;
use clap::error::ErrorKind;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;
use video_to_mp3::{
    ConversionError, Encoder, EncoderError, PathResolverError, ProgressEvent, convert_to_mp3,
};

#[cfg(all(test, unix))]
#[path = "test_support.rs"]
mod test_support;

/// Convert a video file to an MP3 audio file next to it
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Video file path (may start with `~`)
    #[arg(allow_hyphen_values = true)]
    input: PathBuf,
}

/// Routes progress events to the log
fn handle_progress_event(event: ProgressEvent) {
    match event {
        ProgressEvent::CheckingEncoder { program } => {
            tracing::debug!("Checking for encoder {}", program.display());
        }
        ProgressEvent::InputResolved { input } => {
            tracing::debug!("Resolved input to {}", input.display());
        }
        ProgressEvent::Converting { input, output } => {
            tracing::info!("Converting {} to {}", input.display(), output.display());
        }
        ProgressEvent::Converted { output, .. } => {
            tracing::info!("Wrote {}", output.display());
        }
    }
}

/// Prints a conversion error the way the user should see it
///
/// Raycast's silent mode shows the last line of stdout in its HUD, so the
/// messages a user can act on go there. The encoder's own diagnostics go to
/// stderr.
fn report_error(
    error: &ConversionError,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<()> {
    match error {
        ConversionError::Encoder(EncoderError::NotInstalled) => writeln!(stdout, "{}", error),
        ConversionError::PathResolver(PathResolverError::InputNotFound(_)) => {
            writeln!(stdout, "Error: {}", error)
        }
        ConversionError::Encoder(EncoderError::EncodingFailed { .. }) => {
            writeln!(stderr, "{}", error)
        }
        _ => writeln!(stderr, "Error during conversion: {}", error),
    }
}

/// Parses `args` and runs the conversion, returning the process exit code
fn run<I, T>(
    args: I,
    encoder: &Encoder,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            // Wrong argument count: clap's message ends with the usage line
            write!(stdout, "{}", e.render())?;
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            return Ok(code);
        }
    };

    match convert_to_mp3(&cli.input, encoder, handle_progress_event) {
        Ok(conversion) => {
            writeln!(
                stdout,
                "Successfully converted {} to {}",
                conversion.input_file_name(),
                conversion.output_file_name()
            )?;
            Ok(0)
        }
        Err(e) => {
            report_error(&e, stdout, stderr)?;
            Ok(1)
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let code = run(
        std::env::args_os(),
        &Encoder::default(),
        &mut io::stdout(),
        &mut io::stderr(),
    )
    .unwrap_or(1);

    process::exit(code);
}
