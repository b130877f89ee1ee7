//! Video frame counting through the `ffprobe` executable.

use crate::error::DescriptorError;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Longest a single probe may run
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(60);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Counts the packets of the first video stream, which equals the frame count
/// for all common containers without decoding the video.
#[derive(Debug, Clone)]
pub struct FfprobeFrameCounter {
    program: String,
    timeout: Duration,
}

impl FfprobeFrameCounter {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Kill probes running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn count(&self, path: &Path) -> Result<u64, DescriptorError> {
        let probe_error = |reason: String| DescriptorError::Probe {
            path: path.to_path_buf(),
            reason,
        };

        let mut child = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-count_packets",
                "-show_entries",
                "stream=nb_read_packets",
                "-of",
                "csv=p=0",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| probe_error(format!("failed to run {}: {}", self.program, e)))?;

        // ffprobe prints a single line, so the pipes cannot fill up while polling
        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    child.kill().ok();
                    child.wait().ok();
                    return Err(probe_error(format!("timed out after {:?}", self.timeout)));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => return Err(probe_error(format!("failed to wait for {}: {}", self.program, e))),
            }
        };

        let mut stdout = String::new();
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout).ok();
        }
        if let Some(mut pipe) = child.stderr.take() {
            pipe.read_to_string(&mut stderr).ok();
        }

        if !status.success() {
            return Err(probe_error(format!("{} ({})", status, stderr.trim())));
        }

        parse_frame_count(&stdout).ok_or_else(|| probe_error("no video stream".to_string()))
    }
}

impl Default for FfprobeFrameCounter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

/// First non-empty line as a number; trailing commas appear for some muxers
fn parse_frame_count(stdout: &str) -> Option<u64> {
    stdout
        .lines()
        .map(|line| line.trim().trim_end_matches(','))
        .find(|line| !line.is_empty())
        .and_then(|line| line.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_count() {
        assert_eq!(parse_frame_count("1234\n"), Some(1234));
    }

    #[test]
    fn parses_count_with_trailing_comma() {
        assert_eq!(parse_frame_count("\n250,\n"), Some(250));
    }

    #[test]
    fn empty_output_has_no_count() {
        assert_eq!(parse_frame_count(""), None);
        assert_eq!(parse_frame_count("N/A"), None);
    }

    #[cfg(unix)]
    #[test]
    fn hanging_probe_times_out() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("slow-probe");
        std::fs::write(&script, "#!/bin/sh\nexec sleep 10\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let counter = FfprobeFrameCounter::new(script.to_string_lossy())
            .with_timeout(Duration::from_millis(200));
        let start = Instant::now();
        let result = counter.count(Path::new("clip.mp4"));

        assert!(start.elapsed() < Duration::from_secs(5));
        match result {
            Err(DescriptorError::Probe { reason, .. }) => assert!(reason.contains("timed out")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn probe_output_is_read_after_exit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let script = dir.path().join("fake-probe");
        std::fs::write(&script, "#!/bin/sh\necho 321\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let counter = FfprobeFrameCounter::new(script.to_string_lossy());
        assert_eq!(counter.count(Path::new("clip.mp4")).unwrap(), 321);
    }

    #[test]
    fn missing_program_is_probe_error() {
        let counter = FfprobeFrameCounter::new("/nonexistent/ffprobe-binary");
        let result = counter.count(Path::new("clip.mp4"));
        assert!(matches!(result, Err(DescriptorError::Probe { .. })));
    }
}
