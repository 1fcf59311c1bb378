use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, UpmError};
use crate::util::output;

/// Runs `command` in `dir` with inherited stdio; a non-zero exit is an error.
pub fn run_cmd(dir: &Path, command: &[String]) -> Result<()> {
    let (program, args) = split_program(command)?;
    output::command(command);
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .map_err(|err| command_error(command, err.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(command_error(command, format!("exited with {}", status)))
    }
}

/// Runs `command` in `dir` and returns its captured stdout.
pub fn cmd_output(dir: &Path, command: &[String]) -> Result<Vec<u8>> {
    let (program, args) = split_program(command)?;
    debug!(command = %command.join(" "), "capturing command output");
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|err| command_error(command, err.to_string()))?;
    if output.status.success() {
        Ok(output.stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(command_error(
            command,
            format!("exited with {}: {}", output.status, stderr.trim()),
        ))
    }
}

fn split_program(command: &[String]) -> Result<(&String, &[String])> {
    command
        .split_first()
        .ok_or_else(|| UpmError::Other(anyhow::anyhow!("missing command")))
}

fn command_error(command: &[String], message: String) -> UpmError {
    UpmError::Command {
        command: command.first().cloned().unwrap_or_default(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use crate::error::UpmError;
    use crate::util::command::{cmd_output, run_cmd};

    #[test]
    fn empty_command_is_rejected() {
        let dir = std::env::temp_dir();
        assert!(run_cmd(&dir, &[]).is_err());
        assert!(cmd_output(&dir, &[]).is_err());
    }

    #[test]
    fn missing_binary_reports_program_name() {
        let dir = std::env::temp_dir();
        let err = cmd_output(&dir, &["upm-definitely-not-a-binary".to_string()])
            .expect_err("expected spawn failure");
        match err {
            UpmError::Command { command, .. } => assert_eq!(command, "upm-definitely-not-a-binary"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        let dir = std::env::temp_dir();
        let out = cmd_output(
            &dir,
            &["sh".to_string(), "-c".to_string(), "echo fs; echo path".to_string()],
        )
        .expect("run sh");
        assert_eq!(String::from_utf8_lossy(&out), "fs\npath\n");
    }
}
