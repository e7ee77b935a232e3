//! Blocking subprocess execution

use std::ffi::OsStr;
use std::process::Command;
use tracing::{debug, info};

use crate::error::{CoreError, Result};

/// Runs external commands to completion, capturing stdout
///
/// There is no timeout. Under dry-run the command line is only echoed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner {
    dry_run: bool,
}

impl ProcessRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Run `program` with `args`, returning stdout
    ///
    /// Returns `Ok(None)` under dry-run. A non-zero exit becomes
    /// [`CoreError::CommandFailed`] carrying the command's stderr.
    pub fn run<I, S>(&self, program: &str, args: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = render_command(program, &args);

        if self.dry_run {
            info!("Dryrun: {}", command);
            return Ok(None);
        }

        debug!(%command, "running");
        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|source| CoreError::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(CoreError::CommandFailed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

fn render_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_suppresses() {
        let runner = ProcessRunner::new(true);
        let out = runner.run("definitely-not-a-real-binary", ["--flag"]).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_render_command() {
        assert_eq!(render_command("git", &["diff", "--", "a.yaml"]), "git diff -- a.yaml");
    }

    #[test]
    fn test_spawn_failure() {
        let runner = ProcessRunner::new(false);
        let err = runner.run("definitely-not-a-real-binary", ["x"]).unwrap_err();
        assert!(matches!(err, CoreError::CommandSpawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout() {
        let runner = ProcessRunner::new(false);
        let out = runner.run("echo", ["hello"]).unwrap();
        assert_eq!(out.as_deref(), Some("hello\n"));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let runner = ProcessRunner::new(false);
        let err = runner.run("sh", ["-c", "echo broken >&2; exit 3"]).unwrap_err();
        match err {
            CoreError::CommandFailed { command, stderr } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
