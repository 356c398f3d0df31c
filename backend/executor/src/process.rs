use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use runscribe_core::{CommandOutcome, CommandRunner};
use tokio::process::Command;
use tracing::debug;

/// Spawns real processes with tokio and waits for them without a timeout.
///
/// stdin is closed; stdout and stderr are captured in full and decoded
/// lossily as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> std::io::Result<CommandOutcome> {
        debug!(program = %program.display(), args = ?args, "Spawning process");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        let outcome = CommandOutcome::new(
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        debug!(program = %program.display(), exit_code = ?outcome.exit_code, "Process finished");
        Ok(outcome)
    }
}
