//! Path resolution module
//!
//! This module turns the path handed to us on the command line into an
//! absolute path of an existing file, and derives where the converted MP3
//! should be written.

use directories::BaseDirs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while resolving the input path
#[derive(Debug, Error)]
pub enum PathResolverError {
    /// The path uses `~` but no home directory could be determined
    #[error("Unable to determine the home directory to expand '~'")]
    HomeDirectoryNotFound,

    /// A relative path was given but the working directory is unavailable
    #[error("Unable to determine the current working directory: {0}")]
    CurrentDirUnavailable(#[source] io::Error),

    /// The resolved input path does not exist
    #[error("The file '{}' does not exist.", .0.display())]
    InputNotFound(PathBuf),
}

/// An input file that has been resolved and found to exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    /// Absolute, normalized path to the input file
    pub path: PathBuf,
}

impl ResolvedInput {
    /// Path of the MP3 file this input is converted to
    pub fn output_path(&self) -> PathBuf {
        derive_output_path(&self.path)
    }
}

/// Resolves a user supplied path to an existing input file
///
/// A leading `~` is expanded to the caller's home directory, the result is
/// made absolute against the current working directory and normalized.
/// Only then is the existence of the path checked, so shorthand, relative
/// and absolute spellings of the same file all behave identically.
///
/// No check is made that the path is a regular file or a media file. That
/// is left to the encoder.
///
/// # Arguments
///
/// * `raw` - The path as given by the caller
///
/// # Returns
///
/// The `ResolvedInput`, or `PathResolverError::InputNotFound` naming the
/// resolved path if nothing exists there.
pub fn resolve_input(raw: &Path) -> Result<ResolvedInput, PathResolverError> {
    let base_dirs = BaseDirs::new();
    resolve_input_in(raw, base_dirs.as_ref().map(BaseDirs::home_dir))
}

fn resolve_input_in(raw: &Path, home: Option<&Path>) -> Result<ResolvedInput, PathResolverError> {
    let expanded = expand_home_in(raw, home)?;
    let path = absolutize(&expanded)?;

    tracing::debug!(raw = %raw.display(), resolved = %path.display(), "resolved input path");

    if !path.exists() {
        return Err(PathResolverError::InputNotFound(path));
    }

    Ok(ResolvedInput { path })
}

/// Expands a leading `~` component to the caller's home directory
///
/// Only `~` on its own or followed by a separator is expanded. Paths like
/// `~other/file` are returned unchanged.
pub fn expand_home(path: &Path) -> Result<PathBuf, PathResolverError> {
    let base_dirs = BaseDirs::new();
    expand_home_in(path, base_dirs.as_ref().map(BaseDirs::home_dir))
}

fn expand_home_in(path: &Path, home: Option<&Path>) -> Result<PathBuf, PathResolverError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };

    let home = home.ok_or(PathResolverError::HomeDirectoryNotFound)?;

    if rest.as_os_str().is_empty() {
        Ok(home.to_path_buf())
    } else {
        Ok(home.join(rest))
    }
}

/// Makes a path absolute against the current working directory
///
/// The result is normalized lexically. Symlinks are not followed, so this
/// works for paths that do not exist.
pub fn absolutize(path: &Path) -> Result<PathBuf, PathResolverError> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }

    let cwd = std::env::current_dir().map_err(PathResolverError::CurrentDirUnavailable)?;
    Ok(normalize(&cwd.join(path)))
}

/// Removes `.` components and folds `..` into the preceding component
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }

    normalized
}

/// Derives the MP3 output path for an input file
///
/// The extension of the final path segment is replaced with `mp3`. Leading
/// dots never start an extension, so a file without one (including dot
/// files like `.hidden` or `..hidden`) gets `.mp3` appended. The output
/// lives in the same directory as the input.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use video_to_mp3::derive_output_path;
///
/// assert_eq!(
///     derive_output_path(Path::new("/videos/holiday.mov")),
///     PathBuf::from("/videos/holiday.mp3")
/// );
/// ```
pub fn derive_output_path(input: &Path) -> PathBuf {
    // `Path::file_stem` only skips a single leading dot: `..hidden` splits
    // into stem `.` and extension `hidden`
    let stem_is_only_dots = input
        .file_stem()
        .is_some_and(|stem| stem.as_encoded_bytes().iter().all(|&b| b == b'.'));

    if input.file_name().is_none() || stem_is_only_dots {
        let mut output = input.as_os_str().to_os_string();
        output.push(".mp3");
        return PathBuf::from(output);
    }

    input.with_extension("mp3")
}
