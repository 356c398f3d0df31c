use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// What an external process left behind: exit code and both output streams.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandOutcome {
    /// `None` when the process was killed by a signal or never started.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutcome {
    pub fn new(exit_code: Option<i32>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// A command that ran (or tried to) and did not succeed.
///
/// Displays as the full command line followed by both captured streams
/// verbatim, since the tool's own output is the best diagnostic available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub argv: Vec<String>,
    pub outcome: CommandOutcome,
}

impl CommandFailure {
    pub fn new(argv: Vec<String>, outcome: CommandOutcome) -> Self {
        Self { argv, outcome }
    }

    pub fn from_invocation(program: &Path, args: &[OsString], outcome: CommandOutcome) -> Self {
        let argv = std::iter::once(program.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        Self::new(argv, outcome)
    }

    /// The process never started; the OS error stands in for stderr.
    pub fn spawn_error(program: &Path, args: &[OsString], err: &std::io::Error) -> Self {
        Self::from_invocation(program, args, CommandOutcome::new(None, "", err.to_string()))
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command failed:\n{}\n\nSTDOUT:\n{}\n\nSTDERR:\n{}",
            self.argv.join(" "),
            self.outcome.stdout,
            self.outcome.stderr
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_exit_is_success() {
        assert!(CommandOutcome::new(Some(0), "", "").success());
        assert!(!CommandOutcome::new(Some(2), "", "").success());
        assert!(!CommandOutcome::new(None, "", "").success());
    }

    #[test]
    fn spawn_error_uses_os_message() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        let failure = CommandFailure::spawn_error(
            Path::new("ffmpeg"),
            &[OsString::from("-y")],
            &err,
        );
        assert_eq!(failure.argv, vec!["ffmpeg", "-y"]);
        assert_eq!(failure.outcome.exit_code, None);
        assert_eq!(failure.outcome.stderr, "No such file or directory");
    }

    #[test]
    fn failure_layout() {
        let failure = CommandFailure::new(
            vec!["engine".into(), "in.mp3".into()],
            CommandOutcome::new(Some(3), "loading model", "CUDA out of memory"),
        );
        assert_eq!(
            failure.to_string(),
            "Command failed:\nengine in.mp3\n\nSTDOUT:\nloading model\n\nSTDERR:\nCUDA out of memory"
        );
    }
}
