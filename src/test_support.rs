//! Stand-in encoder executables for tests

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Records its arguments to `args.txt` next to itself and creates the output file
pub(crate) const ARGUMENT_RECORDING_ENCODER: &str = r#"
if [ "$1" = "-version" ]; then exit 0; fi
printf '%s\n' "$@" > "$(dirname "$0")/args.txt"
for last in "$@"; do :; done
printf 'ID3' > "$last"
"#;

/// Fails like ffmpeg does on a corrupt input
pub(crate) const FAILING_ENCODER: &str = r#"
if [ "$1" = "-version" ]; then exit 0; fi
echo "corrupt.mov: Invalid data found when processing input" >&2
exit 1
"#;

/// Writes an executable shell script named `ffmpeg` into `dir`
///
/// Returns once the script can be executed. A process forked by a parallel
/// test may still hold the write handle for a moment, which makes `exec`
/// fail with `ETXTBSY` until it has exec'd itself.
pub(crate) fn fake_encoder(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("ffmpeg");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

    for _ in 0..100 {
        let result = Command::new(&path)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Err(e) if e.kind() == io::ErrorKind::ExecutableFileBusy => {
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("fake encoder {} is not executable: {e}", path.display()),
            Ok(_) => return path,
        }
    }

    panic!("fake encoder {} stayed busy", path.display());
}
