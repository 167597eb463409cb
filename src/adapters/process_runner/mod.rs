//! Process runner adapter
//!
//! Launches external tools with `std::process::Command`, blocking until
//! they exit and capturing both output streams.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::{MixtapeError, MixtapeResult};
use crate::ports::{ToolOutput, ToolRunner};
use crate::utils::argv::format_argv;

/// Runs tools as child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, tool: &str, program: &Path, args: &[OsString]) -> MixtapeResult<ToolOutput> {
        info!("{} {}", tool, format_argv(args));

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MixtapeError::launch_failure(tool, &e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(MixtapeError::ExternalToolFailure {
                tool: tool.to_string(),
                status: output.status.to_string(),
                output: if stderr.trim().is_empty() { stdout } else { stderr },
            });
        }

        debug!("{} finished: {} bytes of output", tool, stdout.len());
        Ok(ToolOutput {
            stdout,
            stderr,
            exit_code: output.status.code(),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_captures_stdout() {
        let output = ProcessRunner::new()
            .run("sh", Path::new("sh"), &args(&["-c", "printf hello"]))
            .unwrap();
        assert_eq!(output.stdout, "hello");
        assert_eq!(output.exit_code, Some(0));
    }

    #[test]
    fn test_non_zero_exit_is_tool_failure() {
        let err = ProcessRunner::new()
            .run("sh", Path::new("sh"), &args(&["-c", "echo broken >&2; exit 3"]))
            .unwrap_err();
        match err {
            MixtapeError::ExternalToolFailure { tool, status, output } => {
                assert_eq!(tool, "sh");
                assert!(status.contains('3'));
                assert_eq!(output.trim(), "broken");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_tool_failure() {
        let err = ProcessRunner::new()
            .run("nope", Path::new("/nonexistent/mixtape-tool"), &[])
            .unwrap_err();
        assert!(matches!(err, MixtapeError::ExternalToolFailure { status, .. } if status == "not started"));
    }
}
