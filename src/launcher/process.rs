//! Starting the application process and holding the terminal afterwards.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

/// Prompt shown while the launcher holds the terminal open.
pub const PAUSE_PROMPT: &str = "Press Enter to close...";

/// A process invocation the launcher blocks on.
#[derive(Debug, Clone)]
pub struct AppCommand {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl AppCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// `<this executable> serve`
    pub fn current_exe_serve() -> io::Result<Self> {
        let mut cmd = Self::new(std::env::current_exe()?);
        cmd.arg("serve");
        Ok(cmd)
    }

    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Set a variable in the child's environment, replacing an earlier value.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        self.envs.retain(|(k, _)| *k != key);
        self.envs.push((key, value.into()));
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    /// Run to completion with inherited stdio.
    pub fn run(&self) -> io::Result<ExitStatus> {
        Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)))
            .status()
    }
}

/// Exit code to report for a finished child. Signal deaths map to 1.
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Print the prompt and wait for a line (or end of input).
pub fn pause<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<()> {
    write!(output, "{}", PAUSE_PROMPT)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_env_replaces_previous_value() {
        let mut cmd = AppCommand::new("true");
        cmd.env("ADMIN_PASSWORD", "one").env("ADMIN_PASSWORD", "two");
        assert_eq!(cmd.env_value("ADMIN_PASSWORD"), Some("two"));
        assert_eq!(cmd.env_value("SECRET_KEY"), None);
    }

    #[test]
    fn test_pause_prints_prompt_and_consumes_line() {
        let mut input = Cursor::new(b"\nrest".to_vec());
        let mut output = Vec::new();
        pause(&mut input, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), PAUSE_PROMPT);
        assert_eq!(input.position(), 1);
    }

    #[test]
    fn test_pause_returns_on_eof() {
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        pause(&mut input, &mut output).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code() {
        let mut cmd = AppCommand::new("sh");
        cmd.arg("-c").arg("exit 7");
        assert_eq!(exit_code(cmd.run().unwrap()), 7);
    }

    #[test]
    fn test_run_missing_program() {
        let cmd = AppCommand::new("/nonexistent/toolcrib-test-binary");
        assert!(cmd.run().is_err());
    }
}
