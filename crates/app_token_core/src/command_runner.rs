//! Execution of external commands.
//!
//! The secret store and the environment publisher both shell out to the CI
//! agent. They do so through [`CommandRunner`] so tests can substitute an
//! in-memory implementation.

use std::io;
use std::process::Command;

use tracing::debug;

#[cfg(test)]
#[path = "command_runner_tests.rs"]
mod tests;

/// The captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `true` if the command exited with status 0.
    pub success: bool,
    /// The exit code, if the command was not terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Standard output followed by standard error.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        if !self.stdout.is_empty() && !self.stderr.is_empty() && !self.stdout.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&self.stderr);
        combined
    }
}

/// Runs a program with arguments and waits for it to finish.
pub trait CommandRunner: Send + Sync {
    /// # Errors
    ///
    /// Returns an I/O error if the program could not be started. A program
    /// that starts and exits with a non-zero status is not an error here;
    /// check [`CommandOutput::success`].
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runs commands as child processes of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        debug!(program = program, arg_count = args.len(), "Running command");

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
